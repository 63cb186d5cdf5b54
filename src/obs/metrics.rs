// self
use crate::{
	error::ErrorKind,
	obs::{OpKind, OpOutcome},
};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"jwt_gate_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a rejection labeled by its error kind (when enabled).
pub fn record_rejection(kind: OpKind, error: ErrorKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"jwt_gate_rejection_total",
			"op" => kind.as_str(),
			"kind" => error.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, error);
	}
}
