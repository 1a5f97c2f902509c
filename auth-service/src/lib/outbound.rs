pub mod cache;
pub mod repositories;

pub use cache::RedisSessionStore;
pub use repositories::PostgresCodeRepository;
