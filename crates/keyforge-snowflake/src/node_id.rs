use crate::error::Error;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub(crate) const NODE_ID_BITS: u32 = 10;

/// Largest node id representable in the 10-bit node field.
pub const MAX_NODE_ID: u16 = (1 << NODE_ID_BITS) - 1;

/// Identifies the process that mints IDs. Always in `[0, 1023]`.
///
/// Configured values outside that range are reduced modulo 1024 instead of
/// being rejected, so `1025` and `1` name the same node. Deployments must
/// hand out node ids that stay distinct after the reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u16);

impl NodeId {
    /// Builds a node id from a raw configuration value, reducing it modulo 1024.
    pub fn from_raw(raw: u64) -> Self {
        let reduced = (raw % (u64::from(MAX_NODE_ID) + 1)) as u16;
        if u64::from(reduced) != raw {
            warn!(
                configured = raw,
                effective = reduced,
                "node id out of range, reduced modulo 1024"
            );
        }
        Self(reduced)
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for NodeId {
    type Err = Error;

    /// Parses a non-negative decimal integer. Anything else is a configuration
    /// error and must stop startup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().parse::<u64>().map_err(|_| Error::InvalidNodeId {
            value: s.to_string(),
        })?;
        Ok(Self::from_raw(raw))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
