use crate::{
    conn::{
        tcp_client::{TcpReader, TcpWriter},
        ConnectParams,
    },
    CqlResult,
};
use tokio::net::TcpStream;

// A plain tcp connection
#[derive(Debug)]
pub(crate) struct PlainTcpClient {
    tcp_stream: TcpStream,
}

impl PlainTcpClient {
    pub(crate) async fn try_new(params: &ConnectParams) -> CqlResult<Self> {
        trace!("connecting to {}", params.addr());
        let tcp_stream = TcpStream::connect(params.addr()).await?;
        Ok(Self { tcp_stream })
    }

    pub(crate) fn split(self) -> (TcpReader, TcpWriter) {
        let (reader, writer) = self.tcp_stream.into_split();
        (Box::new(reader), Box::new(writer))
    }
}
