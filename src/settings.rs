//! Merchant settings injected into the adapter.
//!
//! [`GatewaySettings`] is the validated value hosts construct (or deserialize from their own
//! configuration store); [`SettingsProvider`] is the read-only view the cancellation client
//! consumes, so hosts that keep credentials elsewhere can plug in their own source.

/// Builder API for assembling gateway settings.
pub mod builder;
/// Redacted pass-phrase wrapper.
pub mod secret;

pub use builder::*;
pub use secret::*;

// self
use crate::{_prelude::*, error::ConfigError, id::MerchantId};

/// Production API base used when no override is configured.
pub const DEFAULT_API_BASE: &str = "https://api.payfast.co.za";

/// Read-only credentials and mode flags consumed by the cancellation client.
///
/// Values are normalized (trimmed) again at signing time, so implementations may return
/// host-provided strings untouched.
pub trait SettingsProvider
where
	Self: Send + Sync,
{
	/// Merchant identifier sent in the `merchant-id` header and signed field set.
	fn merchant_id(&self) -> &str;

	/// Optional merchant pass-phrase folded into the signature.
	fn pass_phrase(&self) -> Option<&str>;

	/// Whether requests target the provider's sandbox (`?testing=true`).
	fn test_mode(&self) -> bool;

	/// Base URL of the subscriptions API.
	fn api_base(&self) -> &Url;
}

/// Validated merchant settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGatewaySettings")]
pub struct GatewaySettings {
	/// Merchant identifier.
	pub merchant_id: MerchantId,
	/// Optional pass-phrase; blank values are stored as `None`.
	#[serde(skip_serializing)]
	pub pass_phrase: Option<PassPhrase>,
	/// Sandbox flag.
	pub test_mode: bool,
	/// HTTPS base URL of the subscriptions API.
	pub api_base: Url,
}
impl GatewaySettings {
	/// Creates a new builder.
	pub fn builder() -> GatewaySettingsBuilder {
		GatewaySettingsBuilder::new()
	}

	/// Decodes settings from a host JSON document, running the builder's validation.
	///
	/// Failures name the offending field path.
	pub fn from_json(document: &str) -> Result<Self> {
		let de = &mut serde_json::Deserializer::from_str(document);

		serde_path_to_error::deserialize(de)
			.map_err(|source| Error::from(ConfigError::SettingsDecode { source }))
	}
}
impl SettingsProvider for GatewaySettings {
	fn merchant_id(&self) -> &str {
		self.merchant_id.as_str()
	}

	fn pass_phrase(&self) -> Option<&str> {
		self.pass_phrase.as_ref().map(PassPhrase::expose)
	}

	fn test_mode(&self) -> bool {
		self.test_mode
	}

	fn api_base(&self) -> &Url {
		&self.api_base
	}
}
impl Debug for GatewaySettings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GatewaySettings")
			.field("merchant_id", &self.merchant_id)
			.field("pass_phrase_set", &self.pass_phrase.is_some())
			.field("test_mode", &self.test_mode)
			.field("api_base", &self.api_base.as_str())
			.finish()
	}
}

/// Serialized settings shape, accepting the option keys donation hosts store.
#[derive(Deserialize)]
struct RawGatewaySettings {
	#[serde(alias = "payfast_customer_id")]
	merchant_id: String,
	#[serde(default, alias = "payfast_pass_phrase")]
	pass_phrase: Option<String>,
	#[serde(default)]
	test_mode: bool,
	#[serde(default)]
	api_base: Option<Url>,
}
impl TryFrom<RawGatewaySettings> for GatewaySettings {
	type Error = SettingsError;

	fn try_from(raw: RawGatewaySettings) -> Result<Self, Self::Error> {
		let mut builder =
			GatewaySettingsBuilder::new().merchant_id(raw.merchant_id).test_mode(raw.test_mode);

		if let Some(pass_phrase) = raw.pass_phrase {
			builder = builder.pass_phrase(pass_phrase);
		}
		if let Some(api_base) = raw.api_base {
			builder = builder.api_base(api_base);
		}

		builder.build()
	}
}
