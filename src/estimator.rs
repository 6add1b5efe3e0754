use log::debug;

use crate::VitalsEstimate;

/// Boundary to the vitals estimation function: a pure, deterministic pass
/// over the full window, both channels oldest first. The pipeline never
/// looks inside; it only supplies a correctly primed window and honors the
/// two validity flags independently.
pub trait VitalsEstimator {
    fn estimate(&self, ir: &[u32], red: &[u32]) -> VitalsEstimate;
}

/// Default estimator provider: ratio-of-ratios SpO2 and autocorrelation
/// heart rate.
///
/// SpO2 uses the empirical calibration `SpO2 = 110 - 25R` where
/// `R = (AC_red/DC_red) / (AC_ir/DC_ir)`. Heart rate is taken from the
/// autocorrelation lag of the infrared channel, which tolerates windows
/// holding barely more than one cardiac cycle.
pub struct RatioEstimator {
    sample_rate: f64,
}

/// Minimum AC/DC ratio for a channel to count as pulsatile. Below this the
/// signal is flat (sensor detached or saturating) and the derived metric
/// is flagged invalid.
const MIN_PERFUSION: f64 = 1e-4;

/// Plausible band for the ratio-of-ratios. Values outside it come from
/// motion artifact or channel imbalance, not physiology.
const MIN_R: f64 = 0.1;
const MAX_R: f64 = 3.0;

/// Heart rate search band in BPM for the autocorrelation lag sweep.
const MIN_BPM: f64 = 30.0;
const MAX_BPM: f64 = 220.0;

/// Minimum normalized autocorrelation at the best lag and minimum number
/// of overlapping samples for the lag estimate to be trusted.
const MIN_AUTOCORR: f64 = 0.5;
const MIN_OVERLAP: usize = 16;

impl RatioEstimator {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate: f64::from(sample_rate_hz.max(1)),
        }
    }

    /// Mean (DC) and RMS of the residual (AC) for one channel.
    fn ac_dc(samples: &[u32]) -> (f64, f64) {
        let n = samples.len() as f64;
        if n == 0.0 {
            return (0.0, 0.0);
        }
        let dc = samples.iter().map(|&x| f64::from(x)).sum::<f64>() / n;
        let ac = (samples
            .iter()
            .map(|&x| {
                let diff = f64::from(x) - dc;
                diff * diff
            })
            .sum::<f64>()
            / n)
            .sqrt();
        (dc, ac)
    }

    fn estimate_spo2(&self, ir: &[u32], red: &[u32]) -> (i32, bool) {
        let (ir_dc, ir_ac) = Self::ac_dc(ir);
        let (red_dc, red_ac) = Self::ac_dc(red);

        if ir_dc < 1.0 || red_dc < 1.0 {
            return (0, false);
        }
        let ir_perfusion = ir_ac / ir_dc;
        let red_perfusion = red_ac / red_dc;
        if ir_perfusion < MIN_PERFUSION || red_perfusion < MIN_PERFUSION {
            return (0, false);
        }

        let r = red_perfusion / ir_perfusion;
        let spo2 = (110.0 - 25.0 * r).round() as i32;
        debug!("estimate: R={:.3} spo2={}", r, spo2);

        (spo2, (MIN_R..=MAX_R).contains(&r))
    }

    /// Heart rate from the lag of the highest normalized autocorrelation
    /// peak of the mean-removed infrared signal.
    fn estimate_heart_rate(&self, ir: &[u32]) -> (i32, bool) {
        let n = ir.len();
        let (dc, ac) = Self::ac_dc(ir);
        if n < 2 * MIN_OVERLAP || ac <= 0.0 {
            return (0, false);
        }

        let centered: Vec<f64> = ir.iter().map(|&x| f64::from(x) - dc).collect();
        let energy: f64 = centered.iter().map(|x| x * x).sum();

        let min_lag = (self.sample_rate * 60.0 / MAX_BPM).floor().max(1.0) as usize;
        let max_lag = (self.sample_rate * 60.0 / MIN_BPM).ceil() as usize;
        let max_lag = max_lag.min(n.saturating_sub(MIN_OVERLAP));
        if min_lag >= max_lag {
            return (0, false);
        }

        let corr_at = |lag: usize| -> f64 {
            let overlap = n - lag;
            let dot: f64 = (0..overlap).map(|i| centered[i] * centered[i + lag]).sum();
            // Normalize by full-signal energy scaled to the overlap length,
            // so shorter lags do not win on sample count alone
            dot / (energy * overlap as f64 / n as f64)
        };

        // Walk the lag axis upward and take the first local maximum above
        // threshold: the fundamental period. A global argmax would happily
        // land on a two-period lag and halve the rate.
        let mut best: Option<(usize, f64)> = None;
        let mut prev = corr_at(min_lag);
        for lag in min_lag + 1..=max_lag {
            let corr = corr_at(lag);
            if prev >= MIN_AUTOCORR && prev >= corr {
                best = Some((lag - 1, prev));
                break;
            }
            prev = corr;
        }
        if best.is_none() && prev >= MIN_AUTOCORR {
            best = Some((max_lag, prev));
        }

        let Some((lag, corr)) = best else {
            debug!("estimate: no credible pulse period in window");
            return (0, false);
        };

        let bpm = 60.0 * self.sample_rate / lag as f64;
        debug!("estimate: lag={} corr={:.2} hr={:.1}bpm", lag, corr, bpm);
        (bpm.round() as i32, true)
    }
}

impl VitalsEstimator for RatioEstimator {
    fn estimate(&self, ir: &[u32], red: &[u32]) -> VitalsEstimate {
        let (spo2, spo2_valid) = self.estimate_spo2(ir, red);
        let (heart_rate, hr_valid) = self.estimate_heart_rate(ir);
        VitalsEstimate {
            spo2,
            spo2_valid,
            heart_rate,
            hr_valid,
        }
    }
}
