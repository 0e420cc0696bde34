pub mod campaign;
pub mod invites;
pub mod mailer;
pub mod security;
pub mod segmentation;
pub mod templates;
pub mod token;
