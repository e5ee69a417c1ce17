// self
use crate::obs::{FlowOutcome, Phase};

/// Records a phase outcome via the global metrics recorder (when enabled).
pub fn record_phase_outcome(phase: Phase, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_sso_strategy_phase_total",
			"phase" => phase.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (phase, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_phase_outcome_noop_without_metrics() {
		record_phase_outcome(Phase::Callback, FlowOutcome::Failure);
	}
}
