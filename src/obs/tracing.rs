// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallOutcome},
};

/// Future returned by [`CallSpan::instrument`]; a passthrough when tracing is disabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`CallSpan::instrument`]; a passthrough when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span covering one adapter operation on one subject (a profile id or a form id).
///
/// The final outcome is recorded onto the span itself so log consumers can filter on it
/// without correlating child events.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span for `kind` acting on `subject`.
	pub fn new(kind: CallKind, subject: impl Display) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"payfast_recurring.call",
				operation = kind.as_str(),
				subject = %subject,
				outcome = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, &subject);

			Self {}
		}
	}

	/// Stores the final outcome on the span.
	pub fn record_outcome(&self, outcome: CallOutcome) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());
		#[cfg(not(feature = "tracing"))]
		let _ = outcome;
	}

	/// Runs a synchronous section inside the span.
	pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Attaches the span to an async section without holding a guard across `.await`.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
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
