//! Optional observability helpers for token operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `jwt_gate.op` with the `op` (operation) and
//!   `stage` (call site) fields, plus `debug` events for every rejection.
//! - Enable `metrics` to increment the `jwt_gate_op_total` counter for every
//!   attempt/success/failure/bypass, labeled by `op` + `outcome`, and the
//!   `jwt_gate_rejection_total` counter labeled by `op` + `kind`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Token creation.
	Create,
	/// Token validation.
	Validate,
	/// Per-request authorization.
	Authorize,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Create => "create",
			OpKind::Validate => "validate",
			OpKind::Authorize => "authorize",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Request forwarded without inspection.
	Bypass,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
			OpOutcome::Bypass => "bypass",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
