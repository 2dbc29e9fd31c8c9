// The connection to the server, the parameters for creating one, and the
// dispatcher multiplexing the in-flight requests over it.

mod connect_params;
mod connect_params_builder;
mod connection;
mod connection_configuration;
mod dispatcher;
mod events;
mod streams;
mod tcp_client;

pub use {
    connect_params::{ConnectParams, Tls},
    connect_params_builder::ConnectParamsBuilder,
    connection::Connection,
    connection_configuration::ConnectionConfiguration,
    events::EventSubscription,
};
