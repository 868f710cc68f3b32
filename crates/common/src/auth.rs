mod config;
mod jwt;
mod sign_in_code;
mod traits;

pub use config::*;
pub use jwt::*;
pub use sign_in_code::*;
pub use traits::*;
