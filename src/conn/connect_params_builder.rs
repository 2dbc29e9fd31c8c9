use crate::{
    conn::{ConnectParams, Tls},
    protocol::Compression,
};

/// A builder for [`ConnectParams`].
///
/// ```rust,no_run
/// use cqlconnect::{ConnectParams, Tls};
///
/// let params = ConnectParams::builder()
///     .hostname("cassandra.example.com")
///     .port(9142)
///     .tls(Tls::Insecure)
///     .build();
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConnectParamsBuilder {
    hostname: Option<String>,
    port: Option<u16>,
    tls: Tls,
    no_compress: bool,
    preferred_compression: Option<Compression>,
}

impl ConnectParamsBuilder {
    /// Sets the endpoint host name or address.
    pub fn hostname<H: AsRef<str>>(&mut self, hostname: H) -> &mut Self {
        self.hostname = Some(hostname.as_ref().to_owned());
        self
    }

    /// Sets the endpoint port.
    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    /// Sets the TLS mode.
    pub fn tls(&mut self, tls: Tls) -> &mut Self {
        self.tls = tls;
        self
    }

    /// Disables body compression, even if the server supports it.
    pub fn no_compress(&mut self) -> &mut Self {
        self.no_compress = true;
        self
    }

    /// Sets the compression algorithm preferred during negotiation.
    pub fn preferred_compression(&mut self, compression: Compression) -> &mut Self {
        self.preferred_compression = Some(compression);
        self
    }

    /// Constructs the `ConnectParams`.
    #[must_use]
    pub fn build(&self) -> ConnectParams {
        ConnectParams::new(
            self.hostname
                .clone()
                .unwrap_or_else(|| ConnectParams::DEFAULT_HOST.to_string()),
            self.port.unwrap_or(ConnectParams::DEFAULT_PORT),
            self.tls,
            self.no_compress,
            self.preferred_compression.unwrap_or(Compression::Lz4),
        )
    }
}
