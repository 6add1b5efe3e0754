use std::time::{Duration, Instant};

/// Timer that decouples high-frequency sample ingestion from the lower
/// emission rate. Created when priming completes; between fires only
/// window pushes happen.
#[derive(Debug)]
pub struct UpdateScheduler {
    interval: Duration,
    last_fire: Instant,
}

impl UpdateScheduler {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_fire: now,
        }
    }

    /// True iff a full interval has elapsed since the last fire. Pure:
    /// asking twice for the same `now` gives the same answer. On true the
    /// caller must `mark_fired` before doing estimator work, otherwise the
    /// same tick would fire again.
    pub fn should_fire(&self, now: Instant) -> bool {
        now.duration_since(self.last_fire) >= self.interval
    }

    pub fn mark_fired(&mut self, now: Instant) {
        self.last_fire = now;
    }

    pub fn last_fire(&self) -> Instant {
        self.last_fire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(250);

    #[test]
    fn fires_only_after_full_interval() {
        let t0 = Instant::now();
        let scheduler = UpdateScheduler::new(INTERVAL, t0);

        assert!(!scheduler.should_fire(t0));
        assert!(!scheduler.should_fire(t0 + Duration::from_millis(249)));
        // Boundary is inclusive
        assert!(scheduler.should_fire(t0 + INTERVAL));
        assert!(scheduler.should_fire(t0 + Duration::from_millis(400)));
    }

    #[test]
    fn should_fire_is_idempotent_without_mark_fired() {
        let t0 = Instant::now();
        let scheduler = UpdateScheduler::new(INTERVAL, t0);

        let now = t0 + INTERVAL;
        assert_eq!(scheduler.should_fire(now), scheduler.should_fire(now));

        let early = t0 + Duration::from_millis(100);
        assert_eq!(scheduler.should_fire(early), scheduler.should_fire(early));
    }

    #[test]
    fn mark_fired_restarts_the_interval() {
        let t0 = Instant::now();
        let mut scheduler = UpdateScheduler::new(INTERVAL, t0);

        let fire_at = t0 + Duration::from_millis(300);
        assert!(scheduler.should_fire(fire_at));
        scheduler.mark_fired(fire_at);

        assert!(!scheduler.should_fire(fire_at + Duration::from_millis(249)));
        assert!(scheduler.should_fire(fire_at + INTERVAL));
    }
}
