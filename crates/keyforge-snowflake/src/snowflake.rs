use crate::{
    clock::{Clock, SystemClock},
    error::Error,
    node_id::NodeId,
    snowflake_id::{DecodedId, SnowflakeId, DEFAULT_EPOCH, MAX_SEQUENCE, MAX_TIMESTAMP_DELTA},
};
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// What [`Snowflake::next_id`] does when the clock reads earlier than the
/// last millisecond it handed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackwardClockPolicy {
    /// Block until the clock catches up with the last used millisecond.
    /// IDs stay strictly increasing; the caller stalls for the size of the
    /// regression.
    #[default]
    Wait,
    /// Keep minting in the last used millisecond by advancing the sequence.
    /// Once the sequence wraps the call waits for the clock anyway.
    Reuse,
}

/// Configures a Snowflake generator instance.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct SnowflakeSettings {
    /// Node index embedded in every id.
    pub node_id: NodeId,
    /// Custom epoch used as the zero point for the 42-bit timestamp field.
    #[builder(default = DEFAULT_EPOCH)]
    pub start_epoch: Timestamp,
    #[builder(default)]
    pub backward_clock: BackwardClockPolicy,
}

#[derive(Debug, Default)]
struct GeneratorState {
    /// Milliseconds since the epoch of the last id, `None` before the first.
    last_elapsed_ms: Option<i64>,
    sequence: u16,
}

/// Snowflake ID generator: 42-bit millisecond timestamp, 10-bit node id,
/// 12-bit sequence.
///
/// Build one per process at startup and share it (`Arc<Snowflake>`) with
/// every caller that allocates keys.
pub struct Snowflake<C: Clock> {
    start_epoch: Timestamp,
    node_id: NodeId,
    backward_clock: BackwardClockPolicy,
    clock: C,
    state: Mutex<GeneratorState>,
}

impl Snowflake<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: SnowflakeSettings) -> Result<Self, Error> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> Snowflake<C> {
    /// Creates a generator that reads time from `clock`.
    pub fn with_clock(settings: SnowflakeSettings, clock: C) -> Result<Self, Error> {
        let now = clock.now();
        if settings.start_epoch > now {
            return Err(Error::EpochAhead {
                epoch: settings.start_epoch,
                now,
            });
        }

        Ok(Self {
            start_epoch: settings.start_epoch,
            node_id: settings.node_id,
            backward_clock: settings.backward_clock,
            clock,
            state: Mutex::new(GeneratorState::default()),
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn start_epoch(&self) -> Timestamp {
        self.start_epoch
    }

    /// Generates the next unique id.
    ///
    /// - same millisecond as the previous id: the sequence advances; when all
    ///   4096 values are used, wait for the next millisecond
    /// - new millisecond: the sequence resets to 0
    /// - clock moved backward: handled per [`BackwardClockPolicy`]
    ///
    /// The state lock is held for the whole call, waits included.
    pub fn next_id(&self) -> Result<SnowflakeId, Error> {
        let mut state = self.state.lock();

        let mut elapsed = self.elapsed_ms();
        let mut sequence = 0;

        match state.last_elapsed_ms {
            None => {
                if elapsed < 0 {
                    // Clock fell behind the epoch after construction.
                    elapsed = self.wait_for(0)?;
                }
            }
            Some(last) => {
                if elapsed < last {
                    warn!(
                        last_ms = last,
                        now_ms = elapsed,
                        regression_ms = last - elapsed,
                        policy = ?self.backward_clock,
                        "clock moved backwards"
                    );
                    elapsed = match self.backward_clock {
                        BackwardClockPolicy::Wait => self.wait_for(last)?,
                        BackwardClockPolicy::Reuse => last,
                    };
                }

                if elapsed == last {
                    sequence = (state.sequence + 1) & MAX_SEQUENCE;
                    if sequence == 0 {
                        debug!(
                            elapsed_ms = last,
                            "sequence exhausted, waiting for next millisecond"
                        );
                        elapsed = self.wait_for(last + 1)?;
                    }
                }
            }
        }

        // Non-negative here: every branch above leaves `elapsed >= 0`.
        let delta = elapsed as u64;
        if delta > MAX_TIMESTAMP_DELTA {
            return Err(Error::OverTimeLimit);
        }

        let id = SnowflakeId::new()
            .with_timestamp_delta(delta)
            .with_node_id(self.node_id.get())
            .with_sequence(sequence);

        // State only moves once the id is certain to be handed out.
        state.last_elapsed_ms = Some(elapsed);
        state.sequence = sequence;

        Ok(id)
    }

    /// Creation time of an id minted against this generator's epoch.
    pub fn decode_timestamp(&self, id: u64) -> Timestamp {
        SnowflakeId::from(id).timestamp_at(self.start_epoch)
    }

    pub fn decode_node(&self, id: u64) -> u16 {
        SnowflakeId::from(id).node_id()
    }

    pub fn decode_sequence(&self, id: u64) -> u16 {
        SnowflakeId::from(id).sequence()
    }

    pub fn decode(&self, id: u64) -> DecodedId {
        SnowflakeId::from(id).decode(self.start_epoch)
    }

    fn elapsed_ms(&self) -> i64 {
        self.clock.now().as_millisecond() - self.start_epoch.as_millisecond()
    }

    /// Blocks until at least `target_ms` have elapsed since the epoch and
    /// returns the elapsed time read afterwards.
    fn wait_for(&self, target_ms: i64) -> Result<i64, Error> {
        let target = self
            .start_epoch
            .checked_add(SignedDuration::from_millis(target_ms))
            .map_err(|_| Error::OverTimeLimit)?;
        loop {
            let elapsed = self.elapsed_ms();
            if elapsed >= target_ms {
                return Ok(elapsed);
            }
            self.clock.wait_until(target);
        }
    }
}
