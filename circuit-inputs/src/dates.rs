//! Calendar conversions used by both document flows.

use crate::constants::{CIRCUIT_YEAR_SECONDS, IST_OFFSET_SECONDS};
use crate::error::{CircuitInputError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// `YYYYMMDD` as an integer, the circuit's date encoding. Years before 0
/// have no encoding.
pub fn date_to_int(date: &impl Datelike) -> Result<u64> {
    let year = u64::try_from(date.year()).map_err(|_| {
        CircuitInputError::validation(format!("year {} cannot be encoded as YYYYMMDD", date.year()))
    })?;
    Ok(year * 10_000 + u64::from(date.month()) * 100 + u64::from(date.day()))
}

/// Two-digit-year date string, as printed in an MRZ.
pub fn to_yymmdd(date: &impl Datelike) -> String {
    format!("{:02}{:02}{:02}", date.year().rem_euclid(100), date.month(), date.day())
}

fn parse_yymmdd_digits(field: &str, value: &str) -> Result<u64> {
    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CircuitInputError::Format(format!(
            "{field} must be 6 digits (YYMMDD), got '{value}'"
        )));
    }
    value
        .parse::<u64>()
        .map_err(|_| CircuitInputError::Format(format!("{field} is not numeric: '{value}'")))
}

fn parse_yyyymmdd(field: &str, value: u64) -> Result<NaiveDate> {
    let year = (value / 10_000) as i32;
    let month = ((value / 100) % 100) as u32;
    let day = (value % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CircuitInputError::Format(format!("{field} {value} is not a calendar date")))
}

/// Resolve a YYMMDD birth date: a date "after" today must be last century.
pub fn resolve_birth_date(dob: &str, now: &impl Datelike) -> Result<NaiveDate> {
    let digits = parse_yymmdd_digits("date of birth", dob)?;
    let today = date_to_int(now)? % 1_000_000;

    let century = if digits > today { 19_000_000 } else { 20_000_000 };
    parse_yyyymmdd("date of birth", century + digits)
}

/// Resolve a YYMMDD expiry date. Expiry always falls in this century and
/// must not be earlier than today (equal is still valid).
pub fn resolve_expiry_date(doe: &str, now: &impl Datelike) -> Result<NaiveDate> {
    let digits = parse_yymmdd_digits("date of expiry", doe)?;
    let today = date_to_int(now)? % 1_000_000;

    if digits < today {
        return Err(CircuitInputError::ExpiredDocument {
            expiry: doe.to_string(),
            reference: format!("{today:06}"),
        });
    }
    parse_yyyymmdd("date of expiry", 20_000_000 + digits)
}

/// Credential expiration: the document's expiry, capped at one circuit year
/// after `now`.
pub fn credential_expiration(doe: NaiveDate, now: DateTime<Utc>) -> DateTime<Utc> {
    let doe = Utc.from_utc_datetime(&doe.and_time(NaiveTime::MIN));
    let cap = Duration::seconds(CIRCUIT_YEAR_SECONDS);

    if doe - now < cap { doe } else { now + cap }
}

/// Parse the `YYYYMMDDHH` signed timestamp embedded in an Aadhaar reference
/// id. The timestamp is IST; the result is UTC.
pub fn parse_signed_time(value: &str) -> Result<DateTime<Utc>> {
    let invalid = || CircuitInputError::validation(format!("signed time '{value}' is not YYYYMMDDHH"));

    if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(&value[..8], "%Y%m%d").map_err(|_| invalid())?;
    let hour: u32 = value[8..].parse().map_err(|_| invalid())?;
    let local = date.and_hms_opt(hour, 0, 0).ok_or_else(invalid)?;

    Ok(Utc.from_utc_datetime(&local) - Duration::seconds(IST_OFFSET_SECONDS))
}

/// Aadhaar dates of birth are `DD-MM-YYYY`.
pub fn parse_aadhaar_dob(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%d-%m-%Y").map_err(|e| {
        CircuitInputError::validation(format!("date of birth '{value}' is not DD-MM-YYYY: {e}"))
    })
}

pub fn from_unix_seconds(seconds: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        CircuitInputError::Format(format!("unix time {seconds} is out of range"))
    })
}
