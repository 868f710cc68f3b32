pub mod domain;
pub mod http;
pub mod slm_api;

pub use domain::*;
pub use http::*;
pub use slm_api::*;
