// self
use crate::{_prelude::*, error::ErrorKind, obs::OpKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by token operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("jwt_gate.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}

	/// Instruments a future without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Logs a rejected operation with its error kind and the last state it reached.
pub fn log_rejection(kind: OpKind, error: ErrorKind, reached: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = kind.as_str(), kind = error.as_str(), reached, "token rejected");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error, reached);
	}
}
