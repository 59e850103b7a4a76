use async_channel::Receiver;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::{
    engine::{AuthorizationStatus, Engine, SearchOutcome},
    entities::Fix,
    error::{Error, LocationError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
}

/// Events reported by the platform's location services.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum LocationEvent {
    AuthorizationChanged(Permission),
    LocationUpdated(Vec<Fix>),
    LocationFailed(String),
}

/// Turns location events into presentation updates and searches.
pub struct LocationSource {
    engine: Engine,
    events: Receiver<LocationEvent>,
    status: AuthorizationStatus,
}

impl LocationSource {
    pub fn new(engine: Engine, events: Receiver<LocationEvent>) -> Self {
        Self {
            engine,
            events,
            status: AuthorizationStatus::Unauthorized,
        }
    }

    pub fn status(&self) -> AuthorizationStatus {
        self.status
    }

    /// Processes events one at a time until every sender is dropped.
    #[tracing::instrument(name = "LocationSource::run", skip_all)]
    pub async fn run(mut self) {
        while let Ok(event) = self.events.recv().await {
            if let Err(err) = self.handle(event).await {
                tracing::error!(code = err.code, message = %err.message, "location event dropped");
            }
        }

        tracing::info!("location events closed");
    }

    /// Applies one event. Returns the search it triggered, if any.
    #[tracing::instrument(skip(self))]
    pub async fn handle(
        &mut self,
        event: LocationEvent,
    ) -> Result<Option<JoinHandle<Result<SearchOutcome, Error>>>, Error> {
        let presentation = self.engine.presentation();

        match event {
            LocationEvent::AuthorizationChanged(permission) => {
                self.status = match permission {
                    Permission::Granted => AuthorizationStatus::Authorized,
                    Permission::Denied => AuthorizationStatus::Denied,
                };
                presentation.set_authorization(self.status).await?;

                if self.status == AuthorizationStatus::Denied {
                    presentation
                        .record_location_error(LocationError::PermissionDenied)
                        .await?;
                }

                Ok(None)
            }
            LocationEvent::LocationUpdated(fixes) => {
                if self.status != AuthorizationStatus::Authorized {
                    tracing::warn!(status = ?self.status, "fix before authorization; ignoring");
                    return Ok(None);
                }

                // only the most recent fix of a batch counts
                let fix = match fixes.last() {
                    Some(fix) => fix,
                    None => {
                        tracing::warn!("empty fix batch; ignoring");
                        return Ok(None);
                    }
                };

                presentation.record_fix(fix.coordinates).await?;

                let query = self.engine.query(fix.coordinates, None);
                Ok(Some(self.engine.dispatch(query)))
            }
            LocationEvent::LocationFailed(reason) => {
                presentation
                    .record_location_error(LocationError::LocationUnavailable(reason))
                    .await?;

                Ok(None)
            }
        }
    }
}
