pub mod code;
pub mod token;
