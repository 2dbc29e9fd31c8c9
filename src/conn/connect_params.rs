use crate::{
    conn::{tcp_client, ConnectParamsBuilder},
    protocol::Compression,
    CqlResult,
};

/// The TLS mode of a connection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Tls {
    /// Plain TCP.
    #[default]
    Off,
    /// TLS without certificate validation.
    ///
    /// The driver performs the handshake but accepts any server
    /// certificate; validation is the responsibility of the deployment.
    Insecure,
    /// TLS with the server certificate validated against the
    /// webpki root certificates.
    RootCertificates,
}

/// An immutable set of all information necessary to open a connection.
///
/// Instances are built with a [`ConnectParamsBuilder`].
#[derive(Clone, Debug)]
pub struct ConnectParams {
    host: String,
    port: u16,
    tls: Tls,
    no_compress: bool,
    preferred_compression: Compression,
}

impl Default for ConnectParams {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            tls: Tls::Off,
            no_compress: false,
            preferred_compression: Compression::Lz4,
        }
    }
}

impl ConnectParams {
    /// The default endpoint host.
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    /// The default endpoint port.
    pub const DEFAULT_PORT: u16 = 9042;

    pub(crate) fn new(
        host: String,
        port: u16,
        tls: Tls,
        no_compress: bool,
        preferred_compression: Compression,
    ) -> Self {
        Self {
            host,
            port,
            tls,
            no_compress,
            preferred_compression,
        }
    }

    /// Returns a builder for `ConnectParams`.
    #[must_use]
    pub fn builder() -> ConnectParamsBuilder {
        ConnectParamsBuilder::default()
    }

    /// The host name or address of the endpoint.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port of the endpoint.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The connect address, `host:port`.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The TLS mode.
    #[must_use]
    pub fn tls(&self) -> Tls {
        self.tls
    }

    /// Whether body compression is disabled even if the server supports it.
    #[must_use]
    pub fn is_compression_disabled(&self) -> bool {
        self.no_compress
    }

    /// The compression algorithm preferred during negotiation.
    #[must_use]
    pub fn preferred_compression(&self) -> Compression {
        self.preferred_compression
    }

    pub(crate) fn rustls_clientconfig(&self) -> CqlResult<rustls::ClientConfig> {
        match self.tls {
            Tls::Off => Err(crate::CqlError::Impl(
                "rustls_clientconfig must not be called for plain connections",
            )),
            Tls::Insecure => Ok(tcp_client::tls_tcp_client::insecure_clientconfig()),
            Tls::RootCertificates => Ok(tcp_client::tls_tcp_client::webpki_clientconfig()),
        }
    }
}

impl std::fmt::Display for ConnectParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}:{} (TLS: {:?})",
            self.host, self.port, self.tls
        )
    }
}
