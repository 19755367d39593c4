//! Transport primitives for subscriptions API calls.
//!
//! The module exposes [`ApiHttpClient`] alongside the crate-owned [`ApiRequest`] and
//! [`ApiResponse`] shapes so hosts can integrate custom HTTP stacks without pulling reqwest
//! into the adapter's public contract.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type TransportFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + 'a + Send>>;

/// HTTP verbs used by the subscriptions API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
}
impl HttpMethod {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Patch => "PATCH",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request handed to an [`ApiHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Fully resolved target URL (including any query string).
	pub url: Url,
	/// Header pairs in dispatch order.
	pub headers: Vec<(String, String)>,
	/// Form-encoded body; empty when the call carries no payload.
	pub body: String,
	/// Upper bound for the whole exchange.
	pub timeout: Duration,
}
impl ApiRequest {
	/// Default exchange timeout.
	pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(60);

	/// Creates a body-less request with the default timeout.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self {
			method,
			url,
			headers: Vec::new(),
			body: String::new(),
			timeout: Self::DEFAULT_TIMEOUT,
		}
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Replaces the body.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = body.into();

		self
	}

	/// Overrides the timeout; negative values clamp to zero.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = if timeout.is_negative() { Duration::ZERO } else { timeout };

		self
	}

	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}
}

/// Response surfaced by an [`ApiHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}

/// Abstraction over HTTP transports capable of executing subscriptions API calls.
///
/// The trait is the adapter's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can back many concurrent callers, must verify
/// TLS certificates on every request, and must honor [`ApiRequest::timeout`]. Any HTTP
/// status (including 4xx/5xx) is a successful exchange; only failures to obtain a response
/// belong in [`ApiHttpClient::TransportError`].
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Dispatches `request` and resolves to the provider's response.
	fn execute(
		&self,
		request: ApiRequest,
	) -> TransportFuture<'_, ApiResponse, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client verifies certificates through rustls; configure any custom
/// [`ReqwestClient`] the same way, because certificate checks stay on in sandbox mode too.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(
		&self,
		request: ApiRequest,
	) -> TransportFuture<'_, ApiResponse, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
				HttpMethod::Put => reqwest::Method::PUT,
				HttpMethod::Patch => reqwest::Method::PATCH,
			};
			let mut builder =
				client.request(method, request.url).timeout(request.timeout.unsigned_abs());

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}

			let response = builder.body(request.body).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_defaults_and_header_lookup() {
		let url = Url::parse("https://api.payfast.co.za/ping").expect("Fixture URL should parse.");
		let request = ApiRequest::new(HttpMethod::Put, url)
			.with_header("merchant-id", "10000100")
			.with_timeout(Duration::seconds(-5));

		assert_eq!(request.header("Merchant-Id"), Some("10000100"));
		assert_eq!(request.header("signature"), None);
		assert_eq!(request.timeout, Duration::ZERO);
		assert!(request.body.is_empty());
		assert_eq!(ApiRequest::DEFAULT_TIMEOUT.whole_seconds(), 60);
		assert_eq!(request.method.to_string(), "PUT");
	}
}
