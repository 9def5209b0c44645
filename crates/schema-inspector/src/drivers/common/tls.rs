//! TLS settings for Postgres-family bridges.
//!
//! [`SslMode`] is always available so configuration can be validated without
//! the driver; [`TlsBuilder`] needs the `postgres` feature.

use crate::error::{InspectError, Result};

/// SSL verification modes, spelled like libpq's `sslmode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// Plain TCP.
    Disable,
    /// Encrypt, but accept any server certificate.
    #[default]
    Require,
    /// Verify the certificate chain.
    VerifyCa,
    /// Verify the certificate chain and the host name.
    VerifyFull,
}

impl SslMode {
    /// Parse an SSL mode from a string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "require" | "" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(InspectError::Config(format!(
                "Invalid ssl_mode '{}'. Valid values: disable, require, verify-ca, verify-full",
                other
            ))),
        }
    }

    /// Check if this mode requires TLS.
    pub fn requires_tls(&self) -> bool {
        !matches!(self, SslMode::Disable)
    }
}

#[cfg(feature = "postgres")]
pub use builder::TlsBuilder;

#[cfg(feature = "postgres")]
mod builder {
    use std::sync::Arc;

    use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
    use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
    use tokio_postgres_rustls::MakeRustlsConnect;
    use tracing::{info, warn};

    use super::SslMode;
    use crate::error::{InspectError, Result};

    /// Builds the rustls connector handed to `tokio_postgres::Config::connect`.
    pub struct TlsBuilder {
        ssl_mode: SslMode,
    }

    impl TlsBuilder {
        pub fn new(ssl_mode: SslMode) -> Self {
            Self { ssl_mode }
        }

        /// Create a TLS builder from an ssl_mode string.
        pub fn parse(ssl_mode: &str) -> Result<Self> {
            Ok(Self::new(SslMode::parse(ssl_mode)?))
        }

        /// Connector for the configured mode, or None when TLS is disabled.
        pub fn build(&self) -> Result<Option<MakeRustlsConnect>> {
            if !self.ssl_mode.requires_tls() {
                return Ok(None);
            }
            Ok(Some(MakeRustlsConnect::new(self.client_config()?)))
        }

        fn client_config(&self) -> Result<ClientConfig> {
            let provider = Arc::new(rustls::crypto::ring::default_provider());
            let builder = ClientConfig::builder_with_provider(provider.clone())
                .with_safe_default_protocol_versions()
                .map_err(|e| InspectError::Config(format!("TLS setup failed: {}", e)))?;

            let config = match self.ssl_mode {
                SslMode::Disable => {
                    return Err(InspectError::Config(
                        "Cannot build TLS config for ssl_mode=disable".into(),
                    ));
                }
                SslMode::Require => {
                    warn!(
                        "ssl_mode=require encrypts the connection but does NOT verify the \
                         server certificate; use verify-full to guard against \
                         man-in-the-middle attacks"
                    );
                    builder
                        .dangerous()
                        .with_custom_certificate_verifier(Arc::new(AcceptAnyCert(provider)))
                        .with_no_client_auth()
                }
                SslMode::VerifyCa | SslMode::VerifyFull => {
                    // rustls always checks the host name, so verify-ca behaves like verify-full
                    info!("ssl_mode={:?}: certificate and hostname verification enabled", self.ssl_mode);
                    let mut roots = rustls::RootCertStore::empty();
                    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
                    builder.with_root_certificates(roots).with_no_client_auth()
                }
            };
            Ok(config)
        }
    }

    /// Accepts any server certificate while still checking handshake signatures.
    #[derive(Debug)]
    struct AcceptAnyCert(Arc<CryptoProvider>);

    impl ServerCertVerifier for AcceptAnyCert {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> std::result::Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
            verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
            verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.0.signature_verification_algorithms.supported_schemes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_mode_parsing() {
        assert_eq!(SslMode::parse("disable").unwrap(), SslMode::Disable);
        assert_eq!(SslMode::parse("REQUIRE").unwrap(), SslMode::Require);
        assert_eq!(SslMode::parse("verify-ca").unwrap(), SslMode::VerifyCa);
        assert_eq!(SslMode::parse("verify-full").unwrap(), SslMode::VerifyFull);
        assert_eq!(SslMode::parse("").unwrap(), SslMode::Require);
        assert!(matches!(SslMode::parse("prefer"), Err(InspectError::Config(_))));
    }

    #[test]
    fn test_ssl_mode_requires_tls() {
        assert!(!SslMode::Disable.requires_tls());
        assert!(SslMode::Require.requires_tls());
        assert!(SslMode::VerifyFull.requires_tls());
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_tls_builder() {
        assert!(TlsBuilder::new(SslMode::Disable).build().unwrap().is_none());
        assert!(TlsBuilder::new(SslMode::Require).build().unwrap().is_some());
        assert!(TlsBuilder::parse("verify-full").unwrap().build().unwrap().is_some());
    }
}
