pub mod command;
pub mod invite;

pub use command::*;
pub use invite::*;
