//! Handler for `GET /session`.

use axum::{Json, extract::State};
use rota_core::{
  identity::{Identity, Tenancy},
  store::RosterStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, caller::Caller};

/// The caller's identity plus how the server partitions data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
  #[serde(flatten)]
  pub identity: Identity,
  pub tenancy:  Tenancy,
}

/// `GET /session`
pub async fn get<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
) -> Json<SessionInfo>
where
  S: RosterStore,
{
  Json(SessionInfo { identity: caller.identity, tenancy: state.tenancy })
}
