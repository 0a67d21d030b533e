//! Wall clock helpers. All stored timestamps are UTC civil datetimes.

use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::Timestamp;

pub fn now() -> DateTime {
    Timestamp::now().to_zoned(TimeZone::UTC).datetime()
}

pub fn today() -> Date {
    now().date()
}
