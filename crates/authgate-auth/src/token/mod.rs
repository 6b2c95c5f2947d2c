//! Token claim decoding and expiry policy.

pub mod claims;
pub mod expiry;

pub use claims::{DecodedClaims, decode};
pub use expiry::{is_token_expired, is_token_expired_at};
