//! Handler for `GET /shift-days`.

use axum::{Json, extract::Query};
use chrono::Local;
use rota_core::calendar::{ShiftDay, TargetMonth, YearMonth, target_month};
use serde::{Deserialize, Serialize};

use crate::{assignments::MonthParams, error::ApiError};

/// The service days of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDays {
  #[serde(flatten)]
  pub month:        YearMonth,
  pub name:         String,
  /// `true` when the month was chosen by the end-of-month rollover.
  pub transitioned: bool,
  pub days:         Vec<ShiftDay>,
}

impl From<TargetMonth> for ShiftDays {
  fn from(target: TargetMonth) -> Self {
    let month = target.month;
    Self {
      month,
      name: month.name().to_owned(),
      transitioned: target.transitioned,
      days: month.shift_days(),
    }
  }
}

/// `GET /shift-days[?year=<y>&month=<m>]`
///
/// Without a month, answers for the month the schedule should open on now
/// (server local time).
pub async fn shift_days(
  Query(params): Query<MonthParams>,
) -> Result<Json<ShiftDays>, ApiError> {
  let target = match params.into_month()? {
    Some(month) => TargetMonth { month, transitioned: false },
    None => target_month(Local::now().naive_local()),
  };
  Ok(Json(ShiftDays::from(target)))
}
