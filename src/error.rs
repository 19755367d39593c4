//! Adapter-level error types shared across settings, transports, and the period guard.

// self
use crate::_prelude::*;

/// Adapter-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical adapter error exposed by public APIs.
///
/// The cancellation path never surfaces this type; it folds failures into
/// [`CancellationOutcome`](crate::client::CancellationOutcome) instead.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Gateway settings failed validation.
	#[error(transparent)]
	Settings(#[from] crate::settings::SettingsError),
	/// Identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::id::IdentifierError),
	/// Form save rejected by the recurring-period guard.
	#[error(transparent)]
	PeriodValidation(#[from] crate::period::PeriodValidationError),
}

/// Configuration failures raised while wiring the adapter.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Stored settings document could not be decoded.
	#[error("Gateway settings could not be decoded at `{}`.", .source.path())]
	SettingsDecode {
		/// Structured decoding failure, including validation errors.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// API base URL cannot carry path segments.
	#[error("API base URL `{url}` cannot be used as a base.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
}

/// Transport-level failures (network, TLS, request construction).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the subscriptions API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Outbound request could not be assembled.
	#[error("Subscriptions API request could not be built.")]
	Request {
		/// Configuration failure that prevented the request.
		#[source]
		source: ConfigError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ConfigError> for TransportError {
	fn from(e: ConfigError) -> Self {
		Self::Request { source: e }
	}
}
