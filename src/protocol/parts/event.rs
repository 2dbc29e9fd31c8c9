use crate::{
    protocol::codec::{self, Body},
    CqlError, CqlResult,
};
use std::net::SocketAddr;

/// The event categories a client can subscribe to with `register()`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    /// Nodes joining or leaving the cluster.
    TopologyChange,
    /// Nodes going up or down.
    StatusChange,
    /// Schema objects being created, updated or dropped.
    SchemaChange,
}

impl EventKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::TopologyChange => "TOPOLOGY_CHANGE",
            Self::StatusChange => "STATUS_CHANGE",
            Self::SchemaChange => "SCHEMA_CHANGE",
        }
    }

    fn parse(name: &str) -> CqlResult<Self> {
        match name {
            "TOPOLOGY_CHANGE" => Ok(Self::TopologyChange),
            "STATUS_CHANGE" => Ok(Self::StatusChange),
            "SCHEMA_CHANGE" => Ok(Self::SchemaChange),
            _ => Err(CqlError::UnknownPayload(format!(
                "got unexpected event {name}"
            ))),
        }
    }
}

/// A change of the cluster topology.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum TopologyChangeType {
    NEW_NODE,
    REMOVED_NODE,
}

/// A change of a node's availability.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum NodeStatus {
    UP,
    DOWN,
}

/// The kind of schema modification an event reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum SchemaChangeType {
    CREATED,
    UPDATED,
    DROPPED,
}

/// The kind of schema object an event refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum SchemaChangeTarget {
    KEYSPACE,
    TABLE,
    TYPE,
    FUNCTION,
    AGGREGATE,
}

/// An unsolicited TOPOLOGY_CHANGE notification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopologyChange {
    /// Whether a node appeared or disappeared.
    pub change: TopologyChangeType,
    /// The address of the affected node.
    pub node: SocketAddr,
}

/// An unsolicited STATUS_CHANGE notification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusChange {
    /// The new status of the node.
    pub status: NodeStatus,
    /// The address of the affected node.
    pub node: SocketAddr,
}

/// A SCHEMA_CHANGE notification, sent as an event or as a result kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaChange {
    /// What happened to the schema object.
    pub change_type: SchemaChangeType,
    /// What kind of schema object is affected.
    pub target: SchemaChangeTarget,
    /// The keyspace; for KEYSPACE targets this is the affected object itself.
    pub keyspace: String,
    /// The affected object's name; empty for KEYSPACE targets.
    pub name: String,
    /// The argument types for FUNCTION and AGGREGATE targets.
    pub arg_types: Vec<String>,
}

impl SchemaChange {
    // <change_type><target><options>; the options depend on the target.
    pub(crate) fn parse(rdr: &mut Body) -> CqlResult<Self> {
        let string = codec::decode_string(rdr)?;
        let change_type = match string.as_str() {
            "CREATED" => SchemaChangeType::CREATED,
            "UPDATED" => SchemaChangeType::UPDATED,
            "DROPPED" => SchemaChangeType::DROPPED,
            _ => {
                return Err(CqlError::UnknownPayload(format!(
                    "got unexpected change_type {string}"
                )));
            }
        };
        let string = codec::decode_string(rdr)?;
        let target = match string.as_str() {
            "KEYSPACE" => SchemaChangeTarget::KEYSPACE,
            "TABLE" => SchemaChangeTarget::TABLE,
            "TYPE" => SchemaChangeTarget::TYPE,
            "FUNCTION" => SchemaChangeTarget::FUNCTION,
            "AGGREGATE" => SchemaChangeTarget::AGGREGATE,
            _ => {
                return Err(CqlError::UnknownPayload(format!(
                    "got unexpected target {string}"
                )));
            }
        };

        let keyspace = codec::decode_string(rdr)?;
        let (name, arg_types) = match target {
            SchemaChangeTarget::KEYSPACE => (String::new(), Vec::new()),
            SchemaChangeTarget::TABLE | SchemaChangeTarget::TYPE => {
                (codec::decode_string(rdr)?, Vec::new())
            }
            SchemaChangeTarget::FUNCTION | SchemaChangeTarget::AGGREGATE => {
                (codec::decode_string(rdr)?, codec::decode_strings_list(rdr)?)
            }
        };

        debug!("SchemaChange change_type={change_type:?} target={target:?} keyspace={keyspace}");
        Ok(Self {
            change_type,
            target,
            keyspace,
            name,
            arg_types,
        })
    }
}

/// A server-initiated notification, delivered on the reserved event stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChangeEvent {
    /// A node joined or left the cluster.
    Topology(TopologyChange),
    /// A node went up or down.
    Status(StatusChange),
    /// A schema object changed.
    Schema(SchemaChange),
}

impl ChangeEvent {
    // [string] event_name | <event body>
    pub(crate) fn parse(rdr: &mut Body) -> CqlResult<Self> {
        let kind = EventKind::parse(&codec::decode_string(rdr)?)?;
        Ok(match kind {
            EventKind::TopologyChange => {
                let string = codec::decode_string(rdr)?;
                let change = match string.as_str() {
                    "NEW_NODE" => TopologyChangeType::NEW_NODE,
                    "REMOVED_NODE" => TopologyChangeType::REMOVED_NODE,
                    _ => {
                        return Err(CqlError::UnknownPayload(format!(
                            "got unexpected topology change {string}"
                        )));
                    }
                };
                let node = codec::decode_inet(rdr)?;
                Self::Topology(TopologyChange { change, node })
            }
            EventKind::StatusChange => {
                let string = codec::decode_string(rdr)?;
                let status = match string.as_str() {
                    "UP" => NodeStatus::UP,
                    "DOWN" => NodeStatus::DOWN,
                    _ => {
                        return Err(CqlError::UnknownPayload(format!(
                            "got unexpected status change {string}"
                        )));
                    }
                };
                let node = codec::decode_inet(rdr)?;
                Self::Status(StatusChange { status, node })
            }
            EventKind::SchemaChange => Self::Schema(SchemaChange::parse(rdr)?),
        })
    }
}
