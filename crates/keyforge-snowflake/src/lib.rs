//! Snowflake-style 64-bit primary keys.
//!
//! ```text
//! | 42 bits: ms since epoch | 10 bits: node | 12 bits: sequence |
//! ```
//!
//! IDs minted by one [`Snowflake`] are unique and strictly increasing.
//! Distinct node ids keep separate processes from colliding.

mod clock;
pub mod error;
mod node_id;
mod snowflake;
mod snowflake_id;

pub use clock::{Clock, SystemClock};
pub use error::Error;
pub use node_id::{NodeId, MAX_NODE_ID};
pub use snowflake::{BackwardClockPolicy, Snowflake, SnowflakeSettings};
pub use snowflake_id::{
    decode_node, decode_sequence, decode_timestamp, DecodedId, SnowflakeId, DEFAULT_EPOCH,
};
