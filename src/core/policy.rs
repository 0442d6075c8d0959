//! Dispatch policies for the duty-cycle state machine.
//!
//! Three policies share one transition skeleton and differ in when they
//! dispatch and how they debit the energy curve afterwards:
//!
//! - `opportunistic`: transmit as soon as the fixed threshold is reached
//! - `dense`: transmit aggressively, charging only leakage per packet and
//!   penalising storage overflow
//! - `conservative_<fraction>`: hold out for a moving target above the
//!   threshold, with a starvation escape valve

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lower bound for the conservative charge-up fraction.
pub const MIN_FRACTION: f64 = 1.0;
/// Upper bound for the conservative charge-up fraction.
pub const MAX_FRACTION: f64 = 2.0;

/// A dispatch policy, parsed from its string identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Policy {
    Opportunistic,
    Dense,
    Conservative { fraction: f64 },
}

impl Policy {
    /// Build a conservative policy, checking the fraction range.
    pub fn conservative(fraction: f64) -> Result<Self, PolicyError> {
        if !(MIN_FRACTION..=MAX_FRACTION).contains(&fraction) {
            return Err(PolicyError::FractionOutOfRange(fraction));
        }
        Ok(Policy::Conservative { fraction })
    }

    /// Re-check invariants on a policy that was built directly rather than
    /// parsed from its identifier.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if let Policy::Conservative { fraction } = self {
            if !(MIN_FRACTION..=MAX_FRACTION).contains(fraction) {
                return Err(PolicyError::FractionOutOfRange(*fraction));
            }
        }
        Ok(())
    }

    /// Leakage-tick multiple added to the power-on overhead before the
    /// device leaves `OFF`. The conservative policy powers up earlier and
    /// relies on its moving target to delay transmission instead.
    pub fn startup_margin_ticks(&self) -> f64 {
        match self {
            Policy::Opportunistic | Policy::Dense => 5.0,
            Policy::Conservative { .. } => 2.0,
        }
    }

    /// Canonical string identifier.
    pub fn label(&self) -> String {
        match self {
            Policy::Opportunistic => "opportunistic".to_string(),
            Policy::Dense => "dense".to_string(),
            Policy::Conservative { fraction } => format!("conservative_{fraction}"),
        }
    }
}

impl FromStr for Policy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opportunistic" => Ok(Policy::Opportunistic),
            "dense" => Ok(Policy::Dense),
            other => match other.strip_prefix("conservative_") {
                Some(fraction) => {
                    let fraction: f64 = fraction
                        .parse()
                        .map_err(|_| PolicyError::Unrecognized(other.to_string()))?;
                    Policy::conservative(fraction)
                }
                None => Err(PolicyError::Unrecognized(other.to_string())),
            },
        }
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Policy identifier errors.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// Identifier matches none of the recognized forms
    Unrecognized(String),
    /// Conservative fraction outside `[1.0, 2.0]`
    FractionOutOfRange(f64),
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyError::Unrecognized(s) => write!(
                f,
                "unrecognized policy {s:?}, expected opportunistic, dense, or conservative_<fraction>"
            ),
            PolicyError::FractionOutOfRange(v) => write!(
                f,
                "conservative fraction {v} outside [{MIN_FRACTION}, {MAX_FRACTION}]"
            ),
        }
    }
}

impl std::error::Error for PolicyError {}
