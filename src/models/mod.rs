pub mod account;
pub mod email;

pub use account::GmailAccount;
pub use email::{Email, NewEmail};
