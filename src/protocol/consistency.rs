use crate::{CqlError, CqlResult};

/// The replication consistency level of a request.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Consistency {
    /// Closest replica, no durability guarantee.
    Any = 0x0000,
    /// One replica must respond.
    #[default]
    One = 0x0001,
    /// Two replicas must respond.
    Two = 0x0002,
    /// Three replicas must respond.
    Three = 0x0003,
    /// A majority of replicas must respond.
    Quorum = 0x0004,
    /// All replicas must respond.
    All = 0x0005,
    /// A majority of replicas in the local datacenter must respond.
    LocalQuorum = 0x0006,
    /// A majority of replicas in each datacenter must respond.
    EachQuorum = 0x0007,
    /// Linearizable consistency.
    Serial = 0x0008,
    /// Linearizable consistency within the local datacenter.
    LocalSerial = 0x0009,
    /// One replica in the local datacenter must respond.
    LocalOne = 0x000A,
}

impl Consistency {
    pub(crate) fn try_new(code: u16) -> CqlResult<Self> {
        Ok(match code {
            0x0000 => Self::Any,
            0x0001 => Self::One,
            0x0002 => Self::Two,
            0x0003 => Self::Three,
            0x0004 => Self::Quorum,
            0x0005 => Self::All,
            0x0006 => Self::LocalQuorum,
            0x0007 => Self::EachQuorum,
            0x0008 => Self::Serial,
            0x0009 => Self::LocalSerial,
            0x000A => Self::LocalOne,
            _ => {
                return Err(CqlError::ProtocolError(format!(
                    "unknown consistency {code:#06x}"
                )));
            }
        })
    }

    pub(crate) fn to_u16(self) -> u16 {
        self as u16
    }
}

impl std::fmt::Display for Consistency {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "ANY"),
            Self::One => write!(f, "ONE"),
            Self::Two => write!(f, "TWO"),
            Self::Three => write!(f, "THREE"),
            Self::Quorum => write!(f, "QUORUM"),
            Self::All => write!(f, "ALL"),
            Self::LocalQuorum => write!(f, "LOCAL_QUORUM"),
            Self::EachQuorum => write!(f, "EACH_QUORUM"),
            Self::Serial => write!(f, "SERIAL"),
            Self::LocalSerial => write!(f, "LOCAL_SERIAL"),
            Self::LocalOne => write!(f, "LOCAL_ONE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_levels() {
        for code in 0x0000..=0x000A {
            let consistency = Consistency::try_new(code).unwrap();
            assert_eq!(consistency.to_u16(), code);
        }
        assert!(matches!(
            Consistency::try_new(0x000B),
            Err(CqlError::ProtocolError(_))
        ));
    }

    #[test]
    fn default_is_one() {
        assert_eq!(Consistency::default(), Consistency::One);
    }
}
