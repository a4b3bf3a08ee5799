// Refresh timer module
// Each surface owns one of these; the coordinator polls them from the event loop

use crate::error::{Result, SyncError};
use std::fmt;
use std::time::{Duration, Instant};

/// Preset cadences offered by the manager window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RefreshRate {
    /// 1 ms
    #[default]
    Fast,
    /// 100 ms
    Medium,
    /// 2000 ms
    Slow,
}

impl RefreshRate {
    pub const ALL: [RefreshRate; 3] = [RefreshRate::Fast, RefreshRate::Medium, RefreshRate::Slow];

    pub fn interval(&self) -> Duration {
        match self {
            RefreshRate::Fast => Duration::from_millis(1),
            RefreshRate::Medium => Duration::from_millis(100),
            RefreshRate::Slow => Duration::from_millis(2000),
        }
    }
}

impl fmt::Display for RefreshRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshRate::Fast => "fast",
            RefreshRate::Medium => "medium",
            RefreshRate::Slow => "slow",
        };
        write!(f, "{} ({} ms)", name, self.interval().as_millis())
    }
}

/// Repeating timer that fires at most once per poll.
///
/// Missed intervals are coalesced: a poll long after the deadline fires once
/// and schedules the next tick one interval from that poll.
#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RefreshTimer {
    /// Create a stopped timer
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(SyncError::InvalidRefreshInterval);
        }
        Ok(Self {
            interval,
            next_due: None,
        })
    }

    /// Stopped timer at one of the preset cadences
    pub fn stopped(rate: RefreshRate) -> Self {
        Self {
            interval: rate.interval(),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Replace the interval and restart the countdown from `now`
    pub fn restart(&mut self, interval: Duration, now: Instant) -> Result<()> {
        if interval.is_zero() {
            return Err(SyncError::InvalidRefreshInterval);
        }
        self.interval = interval;
        self.start(now);
        Ok(())
    }

    /// Returns true when the timer is due, and re-arms it
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_rejected() {
        assert!(matches!(
            RefreshTimer::new(Duration::ZERO),
            Err(SyncError::InvalidRefreshInterval)
        ));
    }

    #[test]
    fn test_poll_fires_once_per_interval() {
        let t0 = Instant::now();
        let mut timer = RefreshTimer::new(Duration::from_millis(100)).unwrap();
        assert!(!timer.poll(t0 + Duration::from_secs(1)), "stopped timer must not fire");

        timer.start(t0);
        assert!(!timer.poll(t0 + Duration::from_millis(50)));
        assert!(timer.poll(t0 + Duration::from_millis(100)));
        assert!(!timer.poll(t0 + Duration::from_millis(150)));
        // Missed ticks are coalesced into one
        assert!(timer.poll(t0 + Duration::from_millis(900)));
        assert!(!timer.poll(t0 + Duration::from_millis(950)));
    }

    #[test]
    fn test_stop_and_restart() {
        let t0 = Instant::now();
        let mut timer = RefreshTimer::new(RefreshRate::Fast.interval()).unwrap();
        timer.start(t0);
        timer.stop();
        assert!(!timer.is_running());
        assert!(!timer.poll(t0 + Duration::from_secs(5)));

        timer.restart(RefreshRate::Slow.interval(), t0).unwrap();
        assert_eq!(timer.interval(), Duration::from_millis(2000));
        assert!(!timer.poll(t0 + Duration::from_millis(1999)));
        assert!(timer.poll(t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn test_preset_intervals() {
        let millis: Vec<u128> = RefreshRate::ALL
            .iter()
            .map(|r| r.interval().as_millis())
            .collect();
        assert_eq!(millis, vec![1, 100, 2000]);
    }
}
