//! Cancellation outcomes and provider response decoding.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{error::TransportError, obs::CallOutcome};

/// Provider `code` value that marks a successful call.
pub const SUCCESS_CODE: &str = "200";

/// Result of a cancellation attempt.
///
/// Use [`is_cancelled`](Self::is_cancelled) (or
/// [`CancellationClient::cancel_flag`](crate::client::CancellationClient::cancel_flag)) where
/// only a yes/no answer is needed.
#[derive(Debug)]
pub enum CancellationOutcome {
	/// The subscription belongs to another gateway; nothing was sent.
	Skipped {
		/// Gateway tag found on the record.
		gateway: String,
	},
	/// No response was obtained.
	TransportError(TransportError),
	/// The provider answered without confirming the cancellation.
	Rejected(Rejection),
	/// The provider confirmed the cancellation.
	Cancelled,
}
impl CancellationOutcome {
	/// Returns `true` only for [`CancellationOutcome::Cancelled`].
	pub fn is_cancelled(&self) -> bool {
		matches!(self, CancellationOutcome::Cancelled)
	}

	/// Maps the outcome onto the observability label set.
	pub fn label(&self) -> CallOutcome {
		match self {
			CancellationOutcome::Skipped { .. } => CallOutcome::Skipped,
			CancellationOutcome::TransportError(_) => CallOutcome::Failure,
			CancellationOutcome::Rejected(_) => CallOutcome::Rejected,
			CancellationOutcome::Cancelled => CallOutcome::Success,
		}
	}
}
impl From<&CancellationOutcome> for bool {
	fn from(outcome: &CancellationOutcome) -> Self {
		outcome.is_cancelled()
	}
}

/// Details of a provider response that did not confirm the cancellation.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
	/// HTTP status of the response.
	pub status: u16,
	/// Raw `code` field, when the body decoded and carried one.
	pub code: Option<Value>,
	/// Provider message or decoding failure description.
	pub detail: Option<String>,
}

/// Interprets a provider response.
///
/// The call succeeded only when the body is a JSON object whose `code` is the string
/// `"200"`; the HTTP status alone is not trusted. Sibling fields are read leniently and never
/// turn a confirmed cancellation into a rejection.
pub fn interpret_response(status: u16, body: &[u8]) -> CancellationOutcome {
	let de = &mut serde_json::Deserializer::from_slice(body);
	let mut decoded = match serde_path_to_error::deserialize::<_, Map<String, Value>>(de) {
		Ok(decoded) => decoded,
		Err(e) =>
			return CancellationOutcome::Rejected(Rejection {
				status,
				code: None,
				detail: Some(format!("Response body is not a JSON object: {e}.")),
			}),
	};
	let code = decoded.remove("code");

	if matches!(&code, Some(Value::String(code)) if code == SUCCESS_CODE) {
		return CancellationOutcome::Cancelled;
	}

	let detail = decoded
		.get("data")
		.and_then(|data| data.get("message"))
		.filter(|message| !message.is_null())
		.or_else(|| decoded.get("status").filter(|status| !status.is_null()))
		.map(|value| match value {
			Value::String(text) => text.to_owned(),
			other => other.to_string(),
		});

	CancellationOutcome::Rejected(Rejection { status, code, detail })
}
