use std::fmt;

use crate::VitalsEstimate;

/// Heart rate transmission range in BPM.
pub const HR_MIN: i32 = 30;
pub const HR_MAX: i32 = 220;

/// SpO2 transmission range in percent. The floor is deliberately below the
/// plausibility gate so that sensor-reported extremes survive clamping and
/// reach the collector for debugging.
pub const SPO2_MIN: i32 = 50;
pub const SPO2_MAX: i32 = 100;

/// Plausibility floor: clamped readings below this are more likely sensor
/// detachment or motion artifact than genuine hypoxia and are not
/// forwarded. Distinct from `SPO2_MIN`; the two are never merged.
pub const SPO2_PLAUSIBLE_MIN: i32 = 60;

/// Heart rate and SpO2 after clamping, eligible for one reporter
/// invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedVitals {
    pub heart_rate: i32,
    pub spo2: i32,
}

/// Why a cycle's estimate was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The estimator flagged the heart rate as untrustworthy.
    HeartRateInvalid,
    /// The estimator flagged the SpO2 as untrustworthy.
    Spo2Invalid,
    /// Both flags were good but the clamped SpO2 fell below the
    /// plausibility floor.
    ImplausibleSpo2 { clamped: i32 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::HeartRateInvalid => write!(f, "estimator flagged heart rate invalid"),
            Rejection::Spo2Invalid => write!(f, "estimator flagged SpO2 invalid"),
            Rejection::ImplausibleSpo2 { clamped } => {
                write!(f, "clamped SpO2 {}% below plausibility floor", clamped)
            }
        }
    }
}

/// Apply the validation policy to one estimate.
///
/// The validity flags are checked first and independently; clamping never
/// rescues a reading the estimator itself flagged.
pub fn validate(estimate: &VitalsEstimate) -> Result<ValidatedVitals, Rejection> {
    if !estimate.hr_valid {
        return Err(Rejection::HeartRateInvalid);
    }
    if !estimate.spo2_valid {
        return Err(Rejection::Spo2Invalid);
    }

    let heart_rate = estimate.heart_rate.clamp(HR_MIN, HR_MAX);
    let spo2 = estimate.spo2.clamp(SPO2_MIN, SPO2_MAX);

    if spo2 < SPO2_PLAUSIBLE_MIN {
        return Err(Rejection::ImplausibleSpo2 { clamped: spo2 });
    }

    Ok(ValidatedVitals { heart_rate, spo2 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(heart_rate: i32, spo2: i32) -> VitalsEstimate {
        VitalsEstimate {
            spo2,
            spo2_valid: true,
            heart_rate,
            hr_valid: true,
        }
    }

    #[test]
    fn clamping_is_saturating_and_leaves_in_range_values_alone() {
        assert_eq!(
            validate(&estimate(10, 98)),
            Ok(ValidatedVitals {
                heart_rate: 30,
                spo2: 98
            })
        );
        assert_eq!(
            validate(&estimate(300, 98)),
            Ok(ValidatedVitals {
                heart_rate: 220,
                spo2: 98
            })
        );
        assert_eq!(
            validate(&estimate(100, 98)),
            Ok(ValidatedVitals {
                heart_rate: 100,
                spo2: 98
            })
        );
        assert_eq!(
            validate(&estimate(72, 150)),
            Ok(ValidatedVitals {
                heart_rate: 72,
                spo2: 100
            })
        );
    }

    #[test]
    fn plausibility_gate_rejects_below_sixty_inclusive_boundary() {
        // 55 survives the clamp range but not the gate
        assert_eq!(
            validate(&estimate(72, 55)),
            Err(Rejection::ImplausibleSpo2 { clamped: 55 })
        );
        // A wild low value clamps to 50, then the gate rejects it
        assert_eq!(
            validate(&estimate(72, 20)),
            Err(Rejection::ImplausibleSpo2 { clamped: 50 })
        );
        // Boundary is inclusive
        assert_eq!(
            validate(&estimate(72, 60)),
            Ok(ValidatedVitals {
                heart_rate: 72,
                spo2: 60
            })
        );
    }

    #[test]
    fn invalid_flags_reject_unconditionally_and_independently() {
        let mut hr_bad = estimate(72, 98);
        hr_bad.hr_valid = false;
        assert_eq!(validate(&hr_bad), Err(Rejection::HeartRateInvalid));

        let mut spo2_bad = estimate(72, 98);
        spo2_bad.spo2_valid = false;
        assert_eq!(validate(&spo2_bad), Err(Rejection::Spo2Invalid));

        // Perfectly in-range values do not rescue a flagged reading
        let mut both_bad = estimate(72, 98);
        both_bad.hr_valid = false;
        both_bad.spo2_valid = false;
        assert_eq!(validate(&both_bad), Err(Rejection::HeartRateInvalid));
    }
}
