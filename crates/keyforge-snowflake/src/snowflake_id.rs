use jiff::{SignedDuration, Timestamp};
use modular_bitfield::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Default zero point of the timestamp field: 2022-01-01T00:00:00Z.
pub const DEFAULT_EPOCH: Timestamp = Timestamp::constant(1_640_995_200, 0);

pub(crate) const MAX_TIMESTAMP_DELTA: u64 = (1_u64 << 42) - 1;
pub(crate) const MAX_SEQUENCE: u16 = (1 << 12) - 1;

/// A 64-bit time-sortable identifier.
///
/// ```text
/// | 42 bits: ms since epoch | 10 bits: node | 12 bits: sequence |
/// ```
///
/// Fields are declared least significant first, so the little-endian bytes
/// of the bitfield are exactly the `u64` value
/// `(timestamp_delta << 22) | (node_id << 12) | sequence`.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnowflakeId {
    /// 12 bits for sequence number (resets every millisecond).
    pub sequence: B12,
    /// 10 bits for node ID (allows up to 1024 nodes).
    pub node_id: B10,
    /// 42 bits for timestamp (milliseconds since a custom epoch).
    pub timestamp_delta: B42,
}

impl SnowflakeId {
    pub fn as_u64(self) -> u64 {
        u64::from_le_bytes(self.into_bytes())
    }

    /// Returns the id as a signed integer for `BIGINT` columns, or `None`
    /// once the timestamp has grown into the sign bit.
    pub fn to_i64(self) -> Option<i64> {
        i64::try_from(self.as_u64()).ok()
    }

    /// Absolute creation time of the id, given the epoch it was minted against.
    ///
    /// Saturates at [`Timestamp::MAX`] instead of failing, which can only
    /// happen with an epoch near the end of the representable range.
    pub fn timestamp_at(self, epoch: Timestamp) -> Timestamp {
        // 42 bits of milliseconds always fit in an i64.
        let delta = SignedDuration::from_millis(self.timestamp_delta() as i64);
        epoch.checked_add(delta).unwrap_or(Timestamp::MAX)
    }

    pub fn decode(self, epoch: Timestamp) -> DecodedId {
        DecodedId {
            id: self.as_u64(),
            timestamp: self.timestamp_at(epoch),
            node_id: self.node_id(),
            sequence: self.sequence(),
        }
    }
}

impl From<u64> for SnowflakeId {
    fn from(value: u64) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<SnowflakeId> for u64 {
    fn from(value: SnowflakeId) -> Self {
        value.as_u64()
    }
}

impl PartialOrd for SnowflakeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SnowflakeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_u64().cmp(&other.as_u64())
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("timestamp_delta", &self.timestamp_delta())
            .field("node_id", &self.node_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

impl FromStr for SnowflakeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self::from)
    }
}

impl Serialize for SnowflakeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.as_u64())
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Self::from)
    }
}

/// All components of an id, resolved against an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedId {
    pub id: u64,
    pub timestamp: Timestamp,
    pub node_id: u16,
    pub sequence: u16,
}

/// Creation time of `id`, assuming it was minted against [`DEFAULT_EPOCH`].
pub fn decode_timestamp(id: u64) -> Timestamp {
    SnowflakeId::from(id).timestamp_at(DEFAULT_EPOCH)
}

/// Node that minted `id`: bits 12..22.
pub fn decode_node(id: u64) -> u16 {
    SnowflakeId::from(id).node_id()
}

/// Per-millisecond sequence of `id`: the low 12 bits.
pub fn decode_sequence(id: u64) -> u16 {
    SnowflakeId::from(id).sequence()
}
