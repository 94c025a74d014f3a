//! # vidshare-auth
//!
//! Verification of the HS256 access tokens issued by the VidShare account
//! service. Every REST request and every realtime handshake carrying a token
//! goes through [`JwtDecoder`].

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
