pub mod code;

pub use code::PostgresCodeRepository;
