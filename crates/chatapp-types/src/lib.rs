pub mod codec;
pub mod error;
pub mod models;

pub use error::FileError;
pub use models::{Message, Messages, User, Users};
