pub mod invite;
pub mod user;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::invite::{self, Entity as Invite};
    pub use super::user::{self, Entity as User};
}
