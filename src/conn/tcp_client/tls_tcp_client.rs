use crate::{
    conn::{
        tcp_client::{TcpReader, TcpWriter},
        ConnectParams,
    },
    CqlResult,
};
use rustls::{client::ServerCertVerified, ClientConfig, ServerName};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::{client::TlsStream, TlsConnector};

// A TLS tcp connection
#[derive(Debug)]
pub(crate) struct TlsTcpClient {
    tls_stream: TlsStream<TcpStream>,
}

impl TlsTcpClient {
    pub(crate) async fn try_new(params: &ConnectParams) -> CqlResult<Self> {
        let a_client_config = Arc::new(params.rustls_clientconfig()?);
        let server_name = ServerName::try_from(params.host())?;

        let tls_connector = TlsConnector::from(a_client_config);

        trace!("connecting to {} with TLS", params.addr());
        let tcp_stream = TcpStream::connect(params.addr()).await?;
        let tls_stream = tls_connector.connect(server_name, tcp_stream).await?;
        Ok(Self { tls_stream })
    }

    pub(crate) fn split(self) -> (TcpReader, TcpWriter) {
        let (reader, writer) = tokio::io::split(self.tls_stream);
        (Box::new(reader), Box::new(writer))
    }
}

// Certificate validation is deferred to the caller's TLS setup; this
// verifier waves every certificate through.
pub(crate) struct NoCertificateVerification;

impl rustls::client::ServerCertVerifier for NoCertificateVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::Certificate,
        _intermediates: &[rustls::Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: std::time::SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

pub(crate) fn insecure_clientconfig() -> ClientConfig {
    ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(NoCertificateVerification))
        .with_no_client_auth()
}

pub(crate) fn webpki_clientconfig() -> ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
        rustls::OwnedTrustAnchor::from_subject_spki_name_constraints(
            ta.subject,
            ta.spki,
            ta.name_constraints,
        )
    }));
    ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}
