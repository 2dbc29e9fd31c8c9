use crate::{
    conn::{
        dispatcher::{run_read_loop, Dispatcher},
        events::EventSubscription,
        tcp_client::TcpClient,
        ConnectParams, ConnectionConfiguration,
    },
    cql_response::CqlResponse,
    protocol::{
        parts::{EventKind, PreparedStatement, QueryParameters, ResultSetMetadata, StatementId},
        Compression, Opcode, Reply, Request, ResultBody, CQL_VERSION,
    },
    statement::{ExecuteOptions, QueryValues, Statement},
    CqlError, CqlResult,
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, Mutex};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Disconnected,
    Negotiating,
    Ready,
    Failed,
    Closed,
}

#[derive(Debug)]
struct ConnectionCore {
    phase: Phase,
    dispatcher: Option<Arc<Dispatcher>>,
    read_task: Option<tokio::task::JoinHandle<()>>,
    compression: Option<Compression>,
    supported_options: Option<HashMap<String, Vec<String>>>,
    chosen_options: Vec<(String, String)>,
    prepared_cache: HashMap<StatementId, Arc<PreparedStatement>>,
}

/// A connection to a single server endpoint.
///
/// Many calls can be in flight on one connection at the same time; the
/// requests are multiplexed over the stream ids of the wire protocol, and
/// responses may arrive in any order.
///
/// ```rust,no_run
/// use cqlconnect::{Connection, ConnectParams};
///
/// # async fn example() -> cqlconnect::CqlResult<()> {
/// let connection = Connection::new(ConnectParams::default());
/// let response = connection
///     .query("SELECT release_version FROM system.local")
///     .await?;
/// for row in response.into_rows()? {
///     println!("{row}");
/// }
/// connection.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection {
    params: ConnectParams,
    config: ConnectionConfiguration,
    core: Mutex<ConnectionCore>,
}

impl Connection {
    /// Creates a connection object for the given endpoint, with the default
    /// configuration. No I/O happens before [`connect`](Connection::connect)
    /// or the first call.
    #[must_use]
    pub fn new(params: ConnectParams) -> Self {
        Self::with_configuration(params, ConnectionConfiguration::default())
    }

    /// Creates a connection object with an explicit configuration.
    #[must_use]
    pub fn with_configuration(params: ConnectParams, config: ConnectionConfiguration) -> Self {
        Self {
            params,
            config,
            core: Mutex::new(ConnectionCore {
                phase: Phase::Disconnected,
                dispatcher: None,
                read_task: None,
                compression: None,
                supported_options: None,
                chosen_options: Vec::new(),
                prepared_cache: HashMap::new(),
            }),
        }
    }

    /// The parameters the connection was created with.
    #[must_use]
    pub fn connect_params(&self) -> &ConnectParams {
        &self.params
    }

    /// The configuration the connection was created with.
    #[must_use]
    pub fn configuration(&self) -> &ConnectionConfiguration {
        &self.config
    }

    /// Returns true once negotiation completed and the connection accepts
    /// calls.
    pub async fn is_ready(&self) -> bool {
        self.core.lock().await.phase == Phase::Ready
    }

    /// The options the server announced in SUPPORTED, once connected.
    pub async fn supported_options(&self) -> Option<HashMap<String, Vec<String>>> {
        self.core.lock().await.supported_options.clone()
    }

    /// The compression negotiated for this connection, if any.
    pub async fn compression(&self) -> Option<Compression> {
        self.core.lock().await.compression
    }

    /// The options announced to the server in STARTUP, once connected.
    pub async fn chosen_options(&self) -> Vec<(String, String)> {
        self.core.lock().await.chosen_options.clone()
    }

    /// Opens the connection and runs the startup negotiation:
    /// OPTIONS → SUPPORTED, compression choice, STARTUP → READY.
    ///
    /// Idempotent: returns immediately when the connection is ready.
    pub async fn connect(&self) -> CqlResult<()> {
        let mut core = self.core.lock().await;
        match core.phase {
            Phase::Ready => return Ok(()),
            Phase::Failed | Phase::Closed => return Err(CqlError::ConnectionClosed),
            Phase::Disconnected => {}
            Phase::Negotiating => {
                return Err(CqlError::Impl("negotiation reentered"));
            }
        }

        match tokio::time::timeout(self.config.startup_timeout(), self.negotiate(&mut core)).await
        {
            Ok(Ok(())) => {
                core.phase = Phase::Ready;
                debug!(
                    "connected to {} with compression {:?}",
                    self.params,
                    core.compression
                );
                Ok(())
            }
            Ok(Err(e)) => {
                core.phase = Phase::Failed;
                Self::teardown(&mut core).await;
                Err(e)
            }
            Err(_elapsed) => {
                core.phase = Phase::Failed;
                Self::teardown(&mut core).await;
                Err(CqlError::StartupTimeout)
            }
        }
    }

    async fn negotiate(&self, core: &mut ConnectionCore) -> CqlResult<()> {
        core.phase = Phase::Negotiating;
        let tcp_client = TcpClient::try_new(&self.params).await?;
        let (reader, writer) = tcp_client.split();
        let dispatcher = Arc::new(Dispatcher::new(writer));
        core.read_task = Some(tokio::spawn(run_read_loop(Arc::clone(&dispatcher), reader)));
        core.dispatcher = Some(Arc::clone(&dispatcher));

        let reply = self
            .make_call(&dispatcher, Request::Options, None, None)
            .await?;
        let supported = match reply {
            Reply::Supported(supported) => supported,
            Reply::Error(server_error) => return Err(server_error.into()),
            other => return Err(unexpected_reply(Opcode::Options, &other)),
        };

        let mut chosen = vec![("CQL_VERSION".to_string(), CQL_VERSION.to_string())];
        let compression = if self.params.is_compression_disabled() {
            None
        } else {
            supported
                .get("COMPRESSION")
                .and_then(|algos| {
                    Compression::choose(algos, self.params.preferred_compression())
                })
        };
        if let Some(compression) = compression {
            debug!("negotiated compression: {compression}");
            chosen.push(("COMPRESSION".to_string(), compression.name().to_string()));
            // the READY reply may already travel compressed
            dispatcher.set_decompression(compression)?;
        }
        core.supported_options = Some(supported);
        core.compression = compression;
        core.chosen_options = chosen.clone();

        let reply = self
            .make_call(&dispatcher, Request::Startup { options: chosen }, None, None)
            .await?;
        match reply {
            Reply::Ready => Ok(()),
            Reply::Authenticate(authenticator) => {
                Err(CqlError::Authentication { authenticator })
            }
            Reply::Error(server_error) => Err(server_error.into()),
            other => Err(unexpected_reply(Opcode::Startup, &other)),
        }
    }

    /// Executes a CQL query string with default options and no bind values.
    pub async fn query(&self, query: &str) -> CqlResult<CqlResponse> {
        self.execute(query, QueryValues::None).await
    }

    /// Executes a CQL query string or a prepared statement.
    pub async fn execute<S, V>(&self, statement: S, values: V) -> CqlResult<CqlResponse>
    where
        S: Into<Statement>,
        V: Into<QueryValues>,
    {
        self.execute_with(statement, values, &ExecuteOptions::default())
            .await
    }

    /// Executes a CQL query string or a prepared statement, with explicit
    /// per-call options (consistency, paging, metadata).
    pub async fn execute_with<S, V>(
        &self,
        statement: S,
        values: V,
        options: &ExecuteOptions,
    ) -> CqlResult<CqlResponse>
    where
        S: Into<Statement>,
        V: Into<QueryValues>,
    {
        self.connect().await?;
        let statement = statement.into();
        let values = values.into();
        let skip_metadata = !options.send_metadata();

        let reply = match &statement {
            Statement::Simple(query) => {
                let (dispatcher, compression) = self.engine().await?;
                let parameters = QueryParameters {
                    consistency: options.consistency(),
                    values: &values,
                    skip_metadata,
                    page_size: options.page_size(),
                    paging_state: options.paging_state(),
                    bound_specs: None,
                };
                self.make_call(
                    &dispatcher,
                    Request::Query {
                        query: query.as_str(),
                        parameters,
                    },
                    None,
                    compression,
                )
                .await?
            }
            Statement::Prepared(statement_id) => {
                let (dispatcher, compression) = self.engine().await?;
                let prepared = self.prepared(statement_id).await?;
                let parameters = QueryParameters {
                    consistency: options.consistency(),
                    values: &values,
                    skip_metadata,
                    page_size: options.page_size(),
                    paging_state: options.paging_state(),
                    bound_specs: Some(prepared.parameters().as_ref()),
                };
                // inject the cached result specs in case the response skips
                // its metadata
                let rsmd: Arc<ResultSetMetadata> = Arc::clone(prepared.result_metadata());
                self.make_call(
                    &dispatcher,
                    Request::Execute {
                        statement_id,
                        parameters,
                    },
                    Some(rsmd),
                    compression,
                )
                .await?
            }
        };
        evaluate_response(&statement, reply)
    }

    /// Prepares a query on the server.
    ///
    /// The returned statement id can be passed to
    /// [`execute`](Connection::execute); the parameter and result metadata
    /// are cached on this connection until it closes.
    pub async fn prepare(&self, query: &str) -> CqlResult<StatementId> {
        self.connect().await?;
        let (dispatcher, compression) = self.engine().await?;
        let reply = self
            .make_call(&dispatcher, Request::Prepare { query }, None, compression)
            .await?;
        match reply {
            Reply::Result(ResultBody::Prepared(prepared)) => {
                let statement_id = prepared.statement_id().clone();
                debug!("prepared statement {statement_id:?}");
                self.core
                    .lock()
                    .await
                    .prepared_cache
                    .insert(statement_id.clone(), Arc::new(prepared));
                Ok(statement_id)
            }
            Reply::Error(server_error) => Err(server_error.into()),
            other => Err(unexpected_reply(Opcode::Prepare, &other)),
        }
    }

    /// Subscribes to server events.
    ///
    /// At most one subscription exists per connection; its queue is bounded
    /// by the configured capacity.
    pub async fn register(&self, events: &[EventKind]) -> CqlResult<EventSubscription> {
        if events.is_empty() {
            return Err(CqlError::TypeViolation(
                "at least one event kind must be registered".to_string(),
            ));
        }
        self.connect().await?;
        let (dispatcher, compression) = self.engine().await?;
        if dispatcher.has_events_sender()? {
            return Err(CqlError::BadInput(
                "an event subscription already exists on this connection".to_string(),
            ));
        }
        let (sender, receiver) = mpsc::channel(self.config.events_queue_capacity());
        dispatcher.set_events_sender(sender)?;

        let reply = self
            .make_call(&dispatcher, Request::Register { events }, None, compression)
            .await?;
        match reply {
            Reply::Ready => Ok(EventSubscription::new(receiver)),
            Reply::Error(server_error) => {
                dispatcher.clear_events_sender()?;
                Err(server_error.into())
            }
            other => {
                dispatcher.clear_events_sender()?;
                Err(unexpected_reply(Opcode::Register, &other))
            }
        }
    }

    /// Closes the connection.
    ///
    /// Idempotent; every pending call ends with `ConnectionClosed`.
    pub async fn close(&self) -> CqlResult<()> {
        let mut core = self.core.lock().await;
        if core.phase == Phase::Closed {
            return Ok(());
        }
        core.phase = Phase::Closed;
        Self::teardown(&mut core).await;
        core.prepared_cache.clear();
        debug!("connection to {} closed", self.params);
        Ok(())
    }

    async fn teardown(core: &mut ConnectionCore) {
        if let Some(dispatcher) = core.dispatcher.take() {
            dispatcher.end_all(&|| CqlError::ConnectionClosed);
            dispatcher.shutdown_writer().await;
        }
        if let Some(read_task) = core.read_task.take() {
            read_task.abort();
        }
    }

    // Hands out the engine of a ready connection.
    async fn engine(&self) -> CqlResult<(Arc<Dispatcher>, Option<Compression>)> {
        let core = self.core.lock().await;
        if core.phase != Phase::Ready {
            return Err(CqlError::ConnectionClosed);
        }
        let dispatcher = core
            .dispatcher
            .clone()
            .ok_or(CqlError::Impl("ready connection without dispatcher"))?;
        Ok((dispatcher, core.compression))
    }

    async fn prepared(&self, statement_id: &StatementId) -> CqlResult<Arc<PreparedStatement>> {
        self.core
            .lock()
            .await
            .prepared_cache
            .get(statement_id)
            .cloned()
            .ok_or_else(|| {
                CqlError::BadInput(format!(
                    "statement {statement_id:?} was not prepared on this connection"
                ))
            })
    }

    // Sends one request and awaits its response, bounded by the request
    // timeout. On timeout the slot stays registered; it is reclaimed when
    // the response arrives or when the connection tears down.
    async fn make_call(
        &self,
        dispatcher: &Arc<Dispatcher>,
        request: Request<'_>,
        rsmd: Option<Arc<ResultSetMetadata>>,
        compression: Option<Compression>,
    ) -> CqlResult<Reply> {
        let reply_rx = dispatcher.send(&request, rsmd, compression).await?;
        match tokio::time::timeout(self.config.request_timeout(), reply_rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_recv_error)) => Err(CqlError::ConnectionClosed),
            Err(_elapsed) => Err(CqlError::RequestTimeout),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Ok(mut core) = self.core.try_lock() {
            if let Some(dispatcher) = core.dispatcher.take() {
                dispatcher.end_all(&|| CqlError::ConnectionClosed);
            }
            if let Some(read_task) = core.read_task.take() {
                read_task.abort();
            }
        }
    }
}

// The per-opcode correlation contract: which replies a request may yield.
fn evaluate_response(statement: &Statement, reply: Reply) -> CqlResult<CqlResponse> {
    match reply {
        Reply::Result(ResultBody::Void) => Ok(CqlResponse::Void),
        Reply::Result(ResultBody::Rows(mut rows)) => match rows.take_paging_state() {
            Some(paging_state) => Ok(CqlResponse::PagingRows { rows, paging_state }),
            None => Ok(CqlResponse::Rows(rows)),
        },
        Reply::Result(ResultBody::SetKeyspace(keyspace)) => {
            Ok(CqlResponse::SetKeyspace(keyspace))
        }
        Reply::Result(ResultBody::SchemaChange(schema_change)) => {
            Ok(CqlResponse::SchemaChange(schema_change))
        }
        Reply::Error(server_error) => Err(server_error.into()),
        other => Err(CqlError::ImplDetailed(format!(
            "unexpected reply {other:?} for statement {statement:?}"
        ))),
    }
}

fn unexpected_reply(request_opcode: Opcode, reply: &Reply) -> CqlError {
    CqlError::ImplDetailed(format!(
        "unexpected reply {reply:?} for request {request_opcode:?}"
    ))
}
