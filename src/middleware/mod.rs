pub mod auth;

pub use auth::{AccessLevel, Caller, MaybeCaller};
