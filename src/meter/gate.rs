/// Why a block was or was not published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReason {
    BelowThreshold,
    ThresholdDisabled,
    OverThreshold,
}

impl GateReason {
    pub fn label(self) -> &'static str {
        match self {
            GateReason::BelowThreshold => "below_threshold",
            GateReason::ThresholdDisabled => "threshold_disabled",
            GateReason::OverThreshold => "over_threshold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    pub should_publish: bool,
    pub reason: GateReason,
}

/// A zero threshold keeps metering always on; otherwise the amplitude must
/// strictly exceed it.
pub fn decide(amplitude: f64, threshold: f64) -> GateDecision {
    if threshold == 0.0 {
        return GateDecision {
            should_publish: true,
            reason: GateReason::ThresholdDisabled,
        };
    }
    if amplitude > threshold {
        GateDecision {
            should_publish: true,
            reason: GateReason::OverThreshold,
        }
    } else {
        GateDecision {
            should_publish: false,
            reason: GateReason::BelowThreshold,
        }
    }
}
