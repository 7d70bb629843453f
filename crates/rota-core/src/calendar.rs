//! Service calendar: which days of a month carry shifts, and in which
//! periods.
//!
//! Months are zero-based (`0` is January) throughout this module, matching
//! the schedule's month navigation. Dates are plain [`NaiveDate`]s: nothing
//! here depends on a time zone, so a date written as `YYYY-MM-DD` always reads
//! back as the same calendar day.

use std::fmt;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{Error, Result, assignment::Period};

/// English month names, indexed by zero-based month.
const MONTH_NAMES: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December",
];

/// From this time on the last day of a month, the schedule opens on the
/// following month.
const ROLLOVER_HOUR: u32 = 18;
const ROLLOVER_MINUTE: u32 = 30;

const SUNDAY_PERIODS: &[Period] = &[Period::Morning, Period::Evening];
const WEDNESDAY_PERIODS: &[Period] = &[Period::Evening];

// ─── Service days ────────────────────────────────────────────────────────────

/// The weekdays that carry shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ServiceDay {
  Sunday,
  Wednesday,
}

impl ServiceDay {
  pub fn of(date: NaiveDate) -> Option<Self> {
    match date.weekday() {
      Weekday::Sun => Some(Self::Sunday),
      Weekday::Wed => Some(Self::Wednesday),
      _ => None,
    }
  }

  pub fn periods(self) -> &'static [Period] {
    match self {
      Self::Sunday => SUNDAY_PERIODS,
      Self::Wednesday => WEDNESDAY_PERIODS,
    }
  }
}

/// The periods that apply on `date`; empty for days without shifts.
pub fn periods_for(date: NaiveDate) -> &'static [Period] {
  ServiceDay::of(date).map(ServiceDay::periods).unwrap_or(&[])
}

/// A derived, never-persisted description of one service day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDay {
  pub date:    NaiveDate,
  pub weekday: ServiceDay,
  pub periods: Vec<Period>,
}

impl ShiftDay {
  /// `None` unless `date` is a Sunday or a Wednesday.
  pub fn for_date(date: NaiveDate) -> Option<Self> {
    let weekday = ServiceDay::of(date)?;
    Some(Self { date, weekday, periods: weekday.periods().to_vec() })
  }
}

/// Every Sunday and Wednesday of `month` (zero-based) in `year`, ascending.
///
/// Never fails: a month outside `0..=11` or a year chrono cannot represent
/// yields an empty list.
pub fn generate_shift_days(year: i32, month: u32) -> Vec<ShiftDay> {
  let Some(first) = YearMonth::new(year, month)
    .ok()
    .and_then(|ym| ym.first_day())
  else {
    return Vec::new();
  };

  first
    .iter_days()
    .take_while(|d| d.month() == first.month())
    .filter_map(ShiftDay::for_date)
    .collect()
}

// ─── Date ids ────────────────────────────────────────────────────────────────

/// Format `date` as `YYYY-MM-DD`. Years outside `0..=9999` carry an explicit
/// sign (`+10000-01-02`, `-0001-01-02`) so the id still parses back.
pub fn date_to_id(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` id. Non-canonical spellings such as `2026-1-4` are
/// rejected so that every stored id is the image of exactly one date.
pub fn parse_date_id(id: &str) -> Result<NaiveDate> {
  let date = NaiveDate::parse_from_str(id, "%Y-%m-%d")
    .map_err(|_| Error::InvalidDate(id.to_owned()))?;
  if date_to_id(date) != id {
    return Err(Error::InvalidDate(id.to_owned()));
  }
  Ok(date)
}

// ─── Months ──────────────────────────────────────────────────────────────────

/// English name of a zero-based month.
pub fn month_name(month: u32) -> Option<&'static str> {
  MONTH_NAMES.get(month as usize).copied()
}

/// A calendar month with a zero-based month index.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct YearMonth {
  pub year:  i32,
  pub month: u32,
}

impl YearMonth {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if month > 11 {
      return Err(Error::InvalidMonth(month));
    }
    Ok(Self { year, month })
  }

  /// The month containing `date`.
  pub fn of(date: NaiveDate) -> Self {
    Self { year: date.year(), month: date.month0() }
  }

  pub fn first_day(self) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
  }

  pub fn last_day(self) -> Option<NaiveDate> {
    self
      .first_day()?
      .checked_add_months(Months::new(1))?
      .pred_opt()
  }

  pub fn contains(self, date: NaiveDate) -> bool {
    date.year() == self.year && date.month0() == self.month
  }

  /// Step forwards (or backwards, for negative `months`), rolling the year.
  pub fn offset(self, months: i32) -> Self {
    let index = self.year * 12 + self.month as i32 + months;
    Self {
      year:  index.div_euclid(12),
      month: index.rem_euclid(12) as u32,
    }
  }

  /// English name of the month, or `"Unknown"` for an index past December.
  pub fn name(self) -> &'static str {
    month_name(self.month).unwrap_or("Unknown")
  }

  pub fn shift_days(self) -> Vec<ShiftDay> {
    generate_shift_days(self.year, self.month)
  }
}

impl fmt::Display for YearMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.name(), self.year)
  }
}

/// The month the schedule should open on at `now`, and whether the
/// end-of-month rollover moved it forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMonth {
  #[serde(flatten)]
  pub month:        YearMonth,
  pub transitioned: bool,
}

/// From 18:30 on the last day of a month onwards the schedule switches to the
/// next month; before that it shows the current one.
pub fn target_month(now: NaiveDateTime) -> TargetMonth {
  let current = YearMonth::of(now.date());
  let rollover = current.last_day().and_then(|day| {
    NaiveTime::from_hms_opt(ROLLOVER_HOUR, ROLLOVER_MINUTE, 0)
      .map(|t| day.and_time(t))
  });

  match rollover {
    Some(cutoff) if now >= cutoff => TargetMonth {
      month:        current.offset(1),
      transitioned: true,
    },
    _ => TargetMonth { month: current, transitioned: false },
  }
}
