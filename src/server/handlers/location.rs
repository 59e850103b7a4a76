use async_channel::Sender;
use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::engine::{Engine, LocationEvent, Permission};
use crate::entities::Fix;
use crate::error::{invalid_input_error, unexpected_error, Error};

#[derive(Serialize, Deserialize)]
pub struct AuthorizationParams {
    permission: Permission,
}

#[derive(Serialize, Deserialize)]
pub struct FailureParams {
    reason: String,
}

pub async fn authorization(
    Extension(events): Extension<Sender<LocationEvent>>,
    Json(params): Json<AuthorizationParams>,
) -> Result<StatusCode, Error> {
    forward(&events, LocationEvent::AuthorizationChanged(params.permission)).await
}

pub async fn fixes(
    Extension(events): Extension<Sender<LocationEvent>>,
    Json(fixes): Json<Vec<Fix>>,
) -> Result<StatusCode, Error> {
    if fixes.is_empty() {
        return Err(invalid_input_error());
    }

    forward(&events, LocationEvent::LocationUpdated(fixes)).await
}

pub async fn failure(
    Extension(events): Extension<Sender<LocationEvent>>,
    Json(params): Json<FailureParams>,
) -> Result<StatusCode, Error> {
    forward(&events, LocationEvent::LocationFailed(params.reason)).await
}

pub async fn acknowledge_error(Extension(engine): Extension<Engine>) -> Result<StatusCode, Error> {
    engine.presentation().acknowledge_location_error().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn forward(events: &Sender<LocationEvent>, event: LocationEvent) -> Result<StatusCode, Error> {
    events.send(event).await.map_err(|_| unexpected_error())?;

    Ok(StatusCode::ACCEPTED)
}
