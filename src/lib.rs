//! Payfast recurring-donation gateway adapter: canonical request signing, signed subscription
//! cancellation, and recurring-period validation for donation hosts.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod error;
pub mod gateway;
pub mod http;
pub mod id;
pub mod obs;
pub mod period;
pub mod settings;
pub mod signing;
pub mod subscription;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Shared fixtures and a recording transport for tests; enabled via `cfg(test)` or the
	//! `test` crate feature so hosts can drive the adapter without network access.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		http::{ApiHttpClient, ApiRequest, ApiResponse, TransportFuture},
		settings::{GatewaySettings, GatewaySettingsBuilder},
		signing::{FixedClock, Timestamp},
	};

	/// Merchant identifier used by the shared fixtures.
	pub const TEST_MERCHANT_ID: &str = "10000100";
	/// Pass-phrase used by the shared fixtures.
	pub const TEST_PASS_PHRASE: &str = "jt7NOE43FZPn";
	/// Frozen timestamp used by the shared fixtures.
	pub const TEST_TIMESTAMP: &str = "2024-01-02T03:04:05";

	/// Returns a settings builder seeded with the fixture merchant id and pass-phrase.
	pub fn test_settings_builder() -> GatewaySettingsBuilder {
		GatewaySettings::builder().merchant_id(TEST_MERCHANT_ID).pass_phrase(TEST_PASS_PHRASE)
	}

	/// Returns a clock frozen at [`TEST_TIMESTAMP`].
	pub fn test_clock() -> Arc<FixedClock> {
		let timestamp =
			TEST_TIMESTAMP.parse::<Timestamp>().expect("Fixture timestamp should parse.");

		Arc::new(FixedClock::new(timestamp))
	}

	/// Scripted reply returned by [`RecordingHttpClient`].
	#[derive(Debug)]
	pub enum ScriptedReply {
		/// Respond with the provided status and body.
		Respond(u16, String),
		/// Fail at the transport layer.
		Fail(&'static str),
	}

	/// Transport failure emitted by [`RecordingHttpClient`].
	#[derive(Debug, ThisError)]
	#[error("Scripted transport failure: {0}.")]
	pub struct ScriptedTransportError(pub &'static str);

	/// In-process transport that records every request and replays scripted replies.
	///
	/// Once the script runs dry the client repeats its standing reply (see
	/// [`responding`](Self::responding)), or answers `500` with an empty body when none is set.
	#[derive(Debug, Default)]
	pub struct RecordingHttpClient {
		requests: Mutex<Vec<ApiRequest>>,
		replies: Mutex<VecDeque<ScriptedReply>>,
		standing: Option<(u16, String)>,
	}
	impl RecordingHttpClient {
		/// Creates a client that replays `replies` in order.
		pub fn scripted(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
			Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() }
		}

		/// Creates a client that answers every request with `status` and `body`.
		pub fn responding(status: u16, body: impl Into<String>) -> Self {
			Self { standing: Some((status, body.into())), ..Default::default() }
		}

		/// Returns a snapshot of every request dispatched so far.
		pub fn requests(&self) -> Vec<ApiRequest> {
			self.requests.lock().clone()
		}
	}
	impl ApiHttpClient for RecordingHttpClient {
		type TransportError = ScriptedTransportError;

		fn execute(
			&self,
			request: ApiRequest,
		) -> TransportFuture<'_, ApiResponse, Self::TransportError> {
			self.requests.lock().push(request);

			let reply = self.replies.lock().pop_front().or_else(|| {
				self.standing.clone().map(|(status, body)| ScriptedReply::Respond(status, body))
			});

			Box::pin(async move {
				match reply {
					Some(ScriptedReply::Respond(status, body)) =>
						Ok(ApiResponse { status, body: body.into_bytes() }),
					Some(ScriptedReply::Fail(reason)) => Err(ScriptedTransportError(reason)),
					None => Ok(ApiResponse { status: 500, body: Vec::new() }),
				}
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(any(test, feature = "test"))]
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime, PrimitiveDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
