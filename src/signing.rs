//! Canonical request signing for the Payfast subscriptions API.
//!
//! Every call carries a `signature` header computed over a canonical parameter string:
//! the signed fields sorted by key (byte order), each value trimmed, unslashed, and
//! form-encoded the way PHP's `urlencode` does it, joined as `key=value` pairs with `&`.
//! The digest is MD5, which the provider mandates; it is an interoperability requirement
//! and must not be swapped for a stronger hash while the remote protocol stays the same.

pub mod timestamp;

pub use timestamp::*;

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, settings::SettingsProvider};

/// Protocol version sent in the `version` header and signed field set.
pub const API_VERSION: &str = "v1";
/// Signed field carrying the merchant identifier.
pub const FIELD_MERCHANT_ID: &str = "merchant-id";
/// Signed field carrying the merchant pass-phrase.
pub const FIELD_PASSPHRASE: &str = "passphrase";
/// Signed field carrying the request timestamp.
pub const FIELD_TIMESTAMP: &str = "timestamp";
/// Signed field carrying the protocol version.
pub const FIELD_VERSION: &str = "version";

/// Sorted key/value set fed into the signature.
///
/// Keys are ordered by byte value regardless of insertion order, and every value is
/// normalized on insertion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureFields(BTreeMap<String, String>);
impl SignatureFields {
	/// Creates an empty field set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts (or replaces) a field after normalizing its value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
		self.0.insert(key.into(), normalize_value(value.as_ref()));
	}

	/// Chaining variant of [`insert`](Self::insert).
	pub fn with(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
		self.insert(key, value);

		self
	}

	/// Returns the normalized value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns `true` when `key` is part of the set.
	pub fn contains(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of fields.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no fields are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates fields in canonical (sorted) order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Renders the canonical parameter string.
	pub fn envelope(&self) -> SignedEnvelope {
		let mut buf = String::new();

		for (idx, (key, value)) in self.iter().enumerate() {
			if idx > 0 {
				buf.push('&');
			}

			buf.push_str(key);
			buf.push('=');
			buf.push_str(&urlencode(value));
		}

		SignedEnvelope(buf)
	}

	/// Shorthand for `self.envelope().signature()`.
	pub fn signature(&self) -> Signature {
		self.envelope().signature()
	}
}
impl<K, V> FromIterator<(K, V)> for SignatureFields
where
	K: Into<String>,
	V: AsRef<str>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut fields = Self::new();

		for (key, value) in iter {
			fields.insert(key, value);
		}

		fields
	}
}

/// Canonical parameter string used as digest input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedEnvelope(String);
impl SignedEnvelope {
	/// Returns the parameter string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Computes the provider signature over the envelope's UTF-8 bytes.
	pub fn signature(&self) -> Signature {
		Signature(format!("{:x}", md5::compute(self.0.as_bytes())))
	}
}
impl Display for SignedEnvelope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Lowercase hex digest sent in the `signature` header.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature(String);
impl Signature {
	/// Returns the hex digest.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Signature {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for Signature {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Authentication headers attached to every subscriptions API call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
	/// Merchant identifier as signed.
	pub merchant_id: String,
	/// Digest of the canonical envelope.
	pub signature: Signature,
	/// Timestamp that was signed; never regenerated for the headers.
	pub timestamp: Timestamp,
}
impl SignedHeaders {
	/// Returns the headers in wire order: `version`, `merchant-id`, `signature`, `timestamp`.
	pub fn to_pairs(&self) -> [(&'static str, String); 4] {
		[
			(FIELD_VERSION, API_VERSION.to_owned()),
			(FIELD_MERCHANT_ID, self.merchant_id.clone()),
			("signature", self.signature.as_str().to_owned()),
			(FIELD_TIMESTAMP, self.timestamp.to_string()),
		]
	}
}

/// Builds the signed field set for a call.
///
/// The base fields are merchant id, version, and timestamp, plus the pass-phrase when it
/// is non-blank after trimming. `payload` carries the extra fields some calls must sign
/// (amount, frequency, etc.); base fields take precedence over payload keys.
pub fn signature_fields(
	settings: &dyn SettingsProvider,
	timestamp: &Timestamp,
	payload: &SignatureFields,
) -> SignatureFields {
	let mut fields = payload.clone();

	fields.insert(FIELD_MERCHANT_ID, settings.merchant_id());
	fields.insert(FIELD_VERSION, API_VERSION);
	fields.insert(FIELD_TIMESTAMP, timestamp.to_string());

	if let Some(pass_phrase) = settings.pass_phrase().map(str::trim).filter(|p| !p.is_empty()) {
		fields.insert(FIELD_PASSPHRASE, pass_phrase);
	} else {
		fields.0.remove(FIELD_PASSPHRASE);
	}

	fields
}

/// Signs a call and returns the headers to attach.
pub fn sign(
	settings: &dyn SettingsProvider,
	timestamp: Timestamp,
	payload: &SignatureFields,
) -> SignedHeaders {
	let fields = signature_fields(settings, &timestamp, payload);
	let merchant_id = fields.get(FIELD_MERCHANT_ID).unwrap_or_default().to_owned();

	SignedHeaders { merchant_id, signature: fields.signature(), timestamp }
}

/// Form-encodes `value` like PHP's `urlencode`: spaces become `+`, and every byte other
/// than ASCII alphanumerics and `-_.` is percent-encoded with upper-case hex.
pub fn urlencode(value: &str) -> String {
	form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>().replace('*', "%2A")
}

fn normalize_value(value: &str) -> String {
	unslash(value.trim())
}

// Inverse of the host's magic-quote escaping: `\x` becomes `x`, `\\` becomes `\`, and a
// dangling backslash is dropped.
fn unslash(value: &str) -> String {
	let mut buf = String::with_capacity(value.len());
	let mut chars = value.chars();

	while let Some(ch) = chars.next() {
		if ch == '\\' {
			if let Some(next) = chars.next() {
				buf.push(next);
			}
		} else {
			buf.push(ch);
		}
	}

	buf
}
