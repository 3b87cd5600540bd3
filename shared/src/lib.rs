pub mod error;
pub mod filter;
pub mod models;
pub mod user;
pub mod validator;

pub use error::*;
pub use filter::*;
pub use models::*;
pub use user::*;
pub use validator::*;
