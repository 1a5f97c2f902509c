//! Signed credential codec
//!
//! Encodes and decodes claims structures into tamper-evident signed strings
//! (JWT, HS256) using a symmetric secret. One `Signer` is built per secret;
//! services that issue paired access/refresh credentials hold two.
//!
//! The codec is generic over the claims type so that each service defines
//! its own token payload without coupling through a shared claims struct.
//!
//! # Examples
//!
//! ```
//! use credential::Signer;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize, PartialEq)]
//! struct Claims {
//!     sub: String,
//!     exp: i64,
//! }
//!
//! let signer = Signer::new(b"secret_key_at_least_32_bytes_long!!");
//! let claims = Claims { sub: "42".to_string(), exp: i64::MAX };
//! let token = signer.encode(&claims).unwrap();
//! let decoded: Claims = signer.decode(&token).unwrap();
//! assert_eq!(decoded, claims);
//! ```

pub mod errors;
pub mod signer;

pub use errors::SignerError;
pub use signer::Signer;
