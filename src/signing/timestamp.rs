//! Second-precision request timestamps and the clocks that produce them.

// crates.io
use time::{format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::_prelude::*;

const WIRE_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Wall-clock instant rendered as `YYYY-MM-DDTHH:mm:ss` without an offset.
///
/// The same value is signed and sent in the `timestamp` header.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(PrimitiveDateTime);
impl Timestamp {
	/// Wraps a date-time, dropping any sub-second component.
	pub fn new(moment: PrimitiveDateTime) -> Self {
		let time = moment.time();
		let whole = time::Time::from_hms(time.hour(), time.minute(), time.second()).unwrap_or(time);

		Self(moment.replace_time(whole))
	}

	/// Converts an offset-aware instant using its own offset's wall-clock reading.
	pub fn from_offset(moment: OffsetDateTime) -> Self {
		Self::new(PrimitiveDateTime::new(moment.date(), moment.time()))
	}

	/// Returns the wrapped date-time.
	pub fn as_primitive(&self) -> PrimitiveDateTime {
		self.0
	}
}
impl Debug for Timestamp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Timestamp({self})")
	}
}
impl Display for Timestamp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let date = self.0.date();
		let time = self.0.time();

		write!(
			f,
			"{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
			date.year(),
			u8::from(date.month()),
			date.day(),
			time.hour(),
			time.minute(),
			time.second()
		)
	}
}
impl FromStr for Timestamp {
	type Err = time::error::Parse;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		PrimitiveDateTime::parse(s, WIRE_FORMAT).map(Self::new)
	}
}
impl TryFrom<String> for Timestamp {
	type Error = time::error::Parse;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}
impl From<Timestamp> for String {
	fn from(value: Timestamp) -> Self {
		value.to_string()
	}
}

/// Source of request timestamps.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current wall-clock reading.
	fn now(&self) -> Timestamp;
}

/// Reads the process's local clock, falling back to UTC when the local offset is unknown.
///
/// On Unix, `time` refuses to read the local offset once the process runs more than one thread
/// (any multi-threaded async runtime), so stamps are UTC in practice for most hosts, matching
/// donation hosts that run their clocks on UTC. Inject a custom [`Clock`] when a specific offset
/// is required.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;
impl Clock for LocalClock {
	fn now(&self) -> Timestamp {
		let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());

		Timestamp::from_offset(now)
	}
}

/// Clock frozen at a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(Timestamp);
impl FixedClock {
	/// Creates a clock that always reports `timestamp`.
	pub fn new(timestamp: Timestamp) -> Self {
		Self(timestamp)
	}
}
impl Clock for FixedClock {
	fn now(&self) -> Timestamp {
		self.0
	}
}
