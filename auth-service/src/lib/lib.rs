pub mod config;
pub mod domain;
pub mod outbound;

pub use domain::code;
pub use domain::token;
