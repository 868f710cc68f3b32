mod auth;
mod handlers;
mod server;

pub use auth::*;
pub use handlers::*;
pub use server::*;
