pub mod redis;

pub use redis::RedisSessionStore;
