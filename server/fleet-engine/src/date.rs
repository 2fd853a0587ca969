//! As-of date parsing shared by the CLI and the HTTP service.

use chrono::{DateTime, NaiveDate, Utc};

/// Parse `YYYY-MM-DD`, or an ISO8601 timestamp reduced to its UTC date.
pub fn parse_as_of(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(d);
  }
  let dt = DateTime::parse_from_rfc3339(s).ok()?.with_timezone(&Utc);
  Some(dt.date_naive())
}

/// The pinned date when set, else today's UTC date.
pub fn today(as_of: Option<NaiveDate>) -> NaiveDate {
  as_of.unwrap_or_else(|| Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_plain_date_and_timestamp() {
    let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert_eq!(parse_as_of("2024-06-01"), Some(d));
    assert_eq!(parse_as_of(" 2024-06-01 "), Some(d));
    assert_eq!(parse_as_of("2024-06-01T23:30:00-02:00"), NaiveDate::from_ymd_opt(2024, 6, 2));
    assert_eq!(parse_as_of("06/01/2024"), None);
    assert_eq!(parse_as_of(""), None);
  }

  #[test]
  fn pinned_date_wins() {
    let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    assert_eq!(today(Some(d)), d);
  }
}
