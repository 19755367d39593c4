// self
use crate::obs::{CallKind, CallOutcome};

/// Increments `payfast_recurring_call_total` for `kind` + `outcome` (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"payfast_recurring_call_total",
		"operation" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Increments `payfast_recurring_provider_status_total`, labeled by the response status
/// class (`2xx`, `4xx`, ...), for every response the provider returned (when enabled).
pub fn record_provider_status(kind: CallKind, status: u16) {
	let class = status_class(status);

	#[cfg(feature = "metrics")]
	metrics::counter!(
		"payfast_recurring_provider_status_total",
		"operation" => kind.as_str(),
		"class" => class
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, class);
}

fn status_class(status: u16) -> &'static str {
	match status {
		100..=199 => "1xx",
		200..=299 => "2xx",
		300..=399 => "3xx",
		400..=499 => "4xx",
		500..=599 => "5xx",
		_ => "other",
	}
}
