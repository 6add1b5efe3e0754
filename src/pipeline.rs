use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::estimator::VitalsEstimator;
use crate::reporter::{Collector, Reporter};
use crate::scheduler::UpdateScheduler;
use crate::sensor::SampleSource;
use crate::validation::{self, Rejection};
use crate::window::SampleWindow;
use crate::Sample;

/// What one `tick` did, for diagnostics and tests. Transient failures are
/// outcomes, not errors: the pipeline discards the cycle's output and
/// carries its state unchanged into the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No scheduler fire this tick (or the window is not primed yet).
    Idle,
    /// A validated reading was delivered to the collector.
    Reported,
    /// The estimate did not pass validation; nothing was sent.
    Rejected(Rejection),
    /// Validation passed but the collector did not acknowledge.
    TransportFailed,
}

/// The sliding-window acquisition-and-vitals pipeline.
///
/// Single execution context, tick-driven: every tick drains whatever the
/// source has ready into the window, then at most one scheduled
/// estimate/validate/report pass runs. The window is owned here
/// exclusively; estimator and reporter only ever see snapshots.
pub struct Pipeline<S, E, C> {
    source: S,
    estimator: E,
    reporter: Reporter<C>,
    window: SampleWindow,
    scheduler: Option<UpdateScheduler>,
    update_interval: Duration,
}

impl<S, E, C> Pipeline<S, E, C>
where
    S: SampleSource,
    E: VitalsEstimator,
    C: Collector,
{
    pub fn new(
        source: S,
        estimator: E,
        reporter: Reporter<C>,
        window_size: usize,
        update_interval: Duration,
    ) -> Self {
        Self {
            source,
            estimator,
            reporter,
            window: SampleWindow::new(window_size),
            scheduler: None,
            update_interval,
        }
    }

    /// One-time boot fill: drain the source synchronously until the window
    /// holds a full capacity of real samples, then arm the scheduler.
    ///
    /// Blocks for as long as the source needs to produce them; a source
    /// that stalls here stalls boot, which is the intended behavior.
    /// Padding the window with fabricated samples instead would hand the
    /// estimator partially-fake data on the first fires.
    pub fn prime(&mut self) {
        info!(
            "priming window: collecting first {} samples...",
            self.window.capacity()
        );
        while !self.window.is_primed() {
            while !self.source.available() {
                std::thread::yield_now();
            }
            let sample = Sample::new(self.source.red(), self.source.ir());
            self.source.advance();
            self.window.push(sample);
        }
        self.scheduler = Some(UpdateScheduler::new(self.update_interval, Instant::now()));
        info!("window primed, starting scheduled updates");
    }

    /// One pass of the cooperative loop: drain ready samples, then run the
    /// scheduled emission work if an update interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> CycleOutcome {
        self.drain_available();

        let Some(scheduler) = self.scheduler.as_mut() else {
            debug!("tick before priming, nothing to do");
            return CycleOutcome::Idle;
        };
        if !scheduler.should_fire(now) {
            return CycleOutcome::Idle;
        }
        // Mark before the estimator runs so a slow cycle cannot re-enter
        // itself; the next fire is one interval from here regardless of
        // how this cycle ends.
        scheduler.mark_fired(now);

        let (ir, red) = self.window.channels();
        let estimate = self.estimator.estimate(&ir, &red);
        debug!(
            "HR: {} (valid:{}) | SpO2: {} (valid:{})",
            estimate.heart_rate, estimate.hr_valid, estimate.spo2, estimate.spo2_valid
        );

        match validation::validate(&estimate) {
            Ok(vitals) => match self.reporter.report(&vitals, &ir, &red) {
                Ok(()) => CycleOutcome::Reported,
                Err(e) => {
                    warn!("delivery failed, dropping reading: {:#}", e);
                    CycleOutcome::TransportFailed
                }
            },
            Err(rejection) => {
                debug!("skipping send: {}", rejection);
                CycleOutcome::Rejected(rejection)
            }
        }
    }

    /// Run the loop forever. Reporting shares this single execution
    /// context, so a slow collector call delays the next drain by up to
    /// its timeout; the sensor-side FIFO has to absorb that gap.
    pub fn run(&mut self) {
        loop {
            self.tick(Instant::now());
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn drain_available(&mut self) {
        while self.source.available() {
            let sample = Sample::new(self.source.red(), self.source.ir());
            self.source.advance();
            trace!("sample red={} ir={}", sample.red, sample.ir);
            self.window.push(sample);
        }
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Timestamp of the last scheduler fire; `None` before priming.
    pub fn last_fire(&self) -> Option<Instant> {
        self.scheduler.as_ref().map(|s| s.last_fire())
    }
}
