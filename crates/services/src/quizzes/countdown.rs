use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// One-second heartbeat that drives `QuizService::tick`.
///
/// The first beat fires one period after creation, not immediately. Missed
/// beats are delayed rather than bursted so a stalled terminal never drains
/// several seconds at once.
#[derive(Debug)]
pub struct Countdown {
    interval: Interval,
}

impl Countdown {
    pub const PERIOD: Duration = Duration::from_secs(1);

    #[must_use]
    pub fn new() -> Self {
        Self::with_period(Self::PERIOD)
    }

    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next beat. Cancel-safe, so it can sit in `tokio::select!`.
    pub async fn beat(&mut self) {
        self.interval.tick().await;
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}
