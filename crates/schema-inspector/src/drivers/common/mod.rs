//! Utilities shared by the driver bridges.
//!
//! - [`tls`]: SSL modes and the rustls connector for Postgres-family bridges

pub mod tls;

pub use tls::SslMode;
#[cfg(feature = "postgres")]
pub use tls::TlsBuilder;
