mod plain_tcp_client;
pub(crate) mod tls_tcp_client;

use crate::{
    conn::{ConnectParams, Tls},
    CqlResult,
};
pub(crate) use plain_tcp_client::PlainTcpClient;
pub(crate) use tls_tcp_client::TlsTcpClient;

// The dispatcher reads and writes concurrently, so every transport is
// handed out as a split pair of halves.
pub(crate) type TcpReader = Box<dyn tokio::io::AsyncRead + Send + Unpin>;
pub(crate) type TcpWriter = Box<dyn tokio::io::AsyncWrite + Send + Unpin>;

// A plain or TLS connection to the endpoint.
pub(crate) enum TcpClient {
    Plain(PlainTcpClient),
    Tls(TlsTcpClient),
}

impl TcpClient {
    pub(crate) async fn try_new(params: &ConnectParams) -> CqlResult<Self> {
        Ok(match params.tls() {
            Tls::Off => Self::Plain(PlainTcpClient::try_new(params).await?),
            Tls::Insecure | Tls::RootCertificates => {
                Self::Tls(TlsTcpClient::try_new(params).await?)
            }
        })
    }

    pub(crate) fn split(self) -> (TcpReader, TcpWriter) {
        match self {
            Self::Plain(client) => client.split(),
            Self::Tls(client) => client.split(),
        }
    }
}
