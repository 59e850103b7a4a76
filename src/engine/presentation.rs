use async_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::{oneshot, watch};

use crate::{
    entities::{Coordinates, Region, Restaurant},
    error::{invalid_input_error, unexpected_error, Error, LocationError},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    #[default]
    Unauthorized,
    Authorized,
    Denied,
}

/// How completions of overlapping searches are reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Whichever completion is applied last replaces the list.
    #[default]
    LastWriteWins,
    /// A completion is dropped if a later-dispatched search was already applied.
    LatestRequestWins,
}

impl FromStr for OverwritePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_write_wins" => Ok(Self::LastWriteWins),
            "latest_request_wins" => Ok(Self::LatestRequestWins),
            _ => Err(invalid_input_error()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresentationState {
    pub restaurants: Vec<Restaurant>,
    pub coordinates: Coordinates,
    pub region: Region,
    pub authorization: AuthorizationStatus,
    pub show_location_error: bool,
    pub location_error: Option<LocationError>,
    /// Sequence number of the search currently on display, 0 before any.
    pub last_applied_search: u64,
}

impl PresentationState {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            restaurants: Vec::new(),
            coordinates,
            region: Region::around(coordinates),
            authorization: AuthorizationStatus::default(),
            show_location_error: false,
            location_error: None,
            last_applied_search: 0,
        }
    }

    fn apply(&mut self, update: Update, policy: OverwritePolicy) -> bool {
        match update {
            Update::Authorization(status) => {
                self.authorization = status;
            }
            Update::Fix(coordinates) => {
                self.coordinates = coordinates;
                self.region = Region::around(coordinates);
            }
            Update::LocationError(error) => {
                self.show_location_error = true;
                self.location_error = Some(error);
            }
            Update::AcknowledgeLocationError => {
                self.show_location_error = false;
                self.location_error = None;
            }
            Update::Restaurants {
                search,
                restaurants,
            } => {
                if policy == OverwritePolicy::LatestRequestWins
                    && search < self.last_applied_search
                {
                    return false;
                }

                self.restaurants = restaurants;
                self.last_applied_search = search;
            }
        }

        true
    }
}

#[derive(Debug)]
enum Update {
    Authorization(AuthorizationStatus),
    Fix(Coordinates),
    LocationError(LocationError),
    AcknowledgeLocationError,
    Restaurants {
        search: u64,
        restaurants: Vec<Restaurant>,
    },
}

struct Command {
    update: Update,
    applied: oneshot::Sender<bool>,
}

/// Handle to the presentation state. All writes go through a single writer
/// task; readers get snapshots or a watch subscription.
#[derive(Clone)]
pub struct Presentation {
    updates: Sender<Command>,
    snapshots: watch::Receiver<PresentationState>,
}

impl Presentation {
    /// Starts the writer task. Must be called from within a tokio runtime.
    pub fn spawn(initial: PresentationState, policy: OverwritePolicy) -> Self {
        let (updates, queue) = async_channel::unbounded();
        let (publisher, snapshots) = watch::channel(initial.clone());

        tokio::spawn(write_loop(initial, policy, queue, publisher));

        Self { updates, snapshots }
    }

    pub fn snapshot(&self) -> PresentationState {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PresentationState> {
        self.snapshots.clone()
    }

    pub async fn set_authorization(&self, status: AuthorizationStatus) -> Result<(), Error> {
        self.send(Update::Authorization(status)).await.map(|_| ())
    }

    /// Records new current coordinates and recenters the viewport on them.
    pub async fn record_fix(&self, coordinates: Coordinates) -> Result<(), Error> {
        self.send(Update::Fix(coordinates)).await.map(|_| ())
    }

    pub async fn record_location_error(&self, error: LocationError) -> Result<(), Error> {
        self.send(Update::LocationError(error)).await.map(|_| ())
    }

    pub async fn acknowledge_location_error(&self) -> Result<(), Error> {
        self.send(Update::AcknowledgeLocationError)
            .await
            .map(|_| ())
    }

    /// Replaces the restaurant list wholesale. Returns whether the list was
    /// replaced under the configured policy.
    pub async fn replace_restaurants(
        &self,
        search: u64,
        restaurants: Vec<Restaurant>,
    ) -> Result<bool, Error> {
        self.send(Update::Restaurants {
            search,
            restaurants,
        })
        .await
    }

    async fn send(&self, update: Update) -> Result<bool, Error> {
        let (applied, ack) = oneshot::channel();

        self.updates
            .send(Command { update, applied })
            .await
            .map_err(|_| unexpected_error())?;

        ack.await.map_err(|_| unexpected_error())
    }
}

async fn write_loop(
    mut state: PresentationState,
    policy: OverwritePolicy,
    queue: Receiver<Command>,
    publisher: watch::Sender<PresentationState>,
) {
    while let Ok(Command { update, applied }) = queue.recv().await {
        let changed = state.apply(update, policy);

        if changed {
            publisher.send_replace(state.clone());
        }

        let _ = applied.send(changed);
    }

    tracing::debug!("presentation writer stopped");
}
