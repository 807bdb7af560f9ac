use jiff::Timestamp;
use std::time::Duration;

pub trait Clock: Send + Sync {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
    /// Block and wait until the clock reaches the target time.
    fn wait_until(&self, target: Timestamp);
}

/// Wall clock backed by [`Timestamp::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn wait_until(&self, target: Timestamp) {
        // Sleep off whole milliseconds, then re-read the clock in a tight loop
        // for the last one so a sequence rollover costs at most ~1 ms.
        loop {
            let now = Timestamp::now();
            if now >= target {
                return;
            }
            let remaining_ms = target.as_millisecond() - now.as_millisecond();
            if remaining_ms > 1 {
                std::thread::sleep(Duration::from_millis((remaining_ms - 1) as u64));
            } else {
                std::hint::spin_loop();
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::{Clock, SystemClock};
    use jiff::{SignedDuration, Timestamp};

    #[test]
    fn system_clock_waits_until_target() {
        let clock = SystemClock;
        let target = clock.now() + SignedDuration::from_millis(3);
        clock.wait_until(target);
        assert!(clock.now() >= target);
    }

    #[test]
    fn system_clock_returns_immediately_for_past_target() {
        let clock = SystemClock;
        let past = Timestamp::from_second(0).unwrap();
        clock.wait_until(past);
        assert!(clock.now() > past);
    }
}
