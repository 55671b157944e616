use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::Weekday;
use regex::Regex;
use tracing::trace;

/// Display order used by the day filter
/// controls.
pub const WEEK_ORDER: [Weekday; 7] = [
  Weekday::Sun,
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat
];

pub fn weekday_label(
  day: Weekday
) -> &'static str {
  match day {
    | Weekday::Mon => "Monday",
    | Weekday::Tue => "Tuesday",
    | Weekday::Wed => "Wednesday",
    | Weekday::Thu => "Thursday",
    | Weekday::Fri => "Friday",
    | Weekday::Sat => "Saturday",
    | Weekday::Sun => "Sunday"
  }
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token.trim() {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

/// Canonical day id for a raw value taken
/// from markup. Anything that is not a
/// weekday name is kept as written.
#[must_use]
pub fn normalize_day(
  raw: &str
) -> String {
  let trimmed = raw.trim();
  let lower =
    trimmed.to_ascii_lowercase();
  let singular = if lower
    .ends_with("days")
  {
    &lower[..lower.len() - 1]
  } else {
    lower.as_str()
  };

  parse_weekday_name(singular)
    .map(|day| {
      weekday_label(day).to_string()
    })
    .unwrap_or_else(|| {
      trimmed.to_string()
    })
}

fn weekday_regex()
-> Option<&'static Regex> {
  static WEEKDAY_RE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  WEEKDAY_RE
    .get_or_init(|| {
      Regex::new(
        r"(?i)\b(sunday|monday|tuesday|wednesday|thursday|friday|saturday)s?\b",
      )
      .ok()
    })
    .as_ref()
}

/// Collects every weekday mentioned in a
/// free-text description.
#[must_use]
pub fn scan_weekdays(
  text: &str
) -> BTreeSet<String> {
  let Some(re) = weekday_regex() else {
    return BTreeSet::new();
  };

  let days = re
    .captures_iter(text)
    .filter_map(|caps| caps.get(1))
    .map(|m| normalize_day(m.as_str()))
    .collect::<BTreeSet<_>>();

  trace!(?days, "scanned weekdays from text");
  days
}
