mod location_source;
mod presentation;

#[cfg(test)]
pub(crate) mod testing;

pub use location_source::{LocationEvent, LocationSource, Permission};
pub use presentation::{AuthorizationStatus, OverwritePolicy, Presentation, PresentationState};

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::task::JoinHandle;

use crate::{
    api::DynPlacesAPI,
    config::Config,
    entities::{Coordinates, SearchQuery},
    error::{Error, SearchError},
};

/// What became of one dispatched search.
#[derive(Debug)]
pub enum SearchOutcome {
    Applied { search: u64, count: usize },
    Superseded { search: u64 },
    Failed { search: u64, error: SearchError },
}

#[derive(Clone)]
pub struct Engine {
    places: DynPlacesAPI,
    presentation: Presentation,
    radius: u32,
    place_type: Arc<str>,
    sequence: Arc<AtomicU64>,
}

impl Engine {
    pub fn new(
        places: DynPlacesAPI,
        presentation: Presentation,
        radius: u32,
        place_type: &str,
    ) -> Self {
        Self {
            places,
            presentation,
            radius,
            place_type: place_type.into(),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts the presentation writer and wires it to `places`.
    #[tracing::instrument(name = "Engine::from_config", skip_all)]
    pub fn from_config(config: &Config, places: DynPlacesAPI) -> Self {
        let presentation = Presentation::spawn(
            PresentationState::new(config.default_coordinates),
            config.overwrite_policy,
        );

        Self::new(places, presentation, config.radius, &config.place_type)
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn query(&self, coordinates: Coordinates, keyword: Option<String>) -> SearchQuery {
        SearchQuery::new(coordinates, self.radius, self.place_type.as_ref()).with_keyword(keyword)
    }

    /// User-initiated search around the last known coordinates. Leaves the
    /// location error flag and the viewport alone.
    #[tracing::instrument(skip(self))]
    pub fn search_keyword(&self, keyword: Option<String>) -> JoinHandle<Result<SearchOutcome, Error>> {
        let coordinates = self.presentation.snapshot().coordinates;
        self.dispatch(self.query(coordinates, keyword))
    }

    /// Spawns one search. Outstanding searches are never cancelled.
    pub fn dispatch(&self, query: SearchQuery) -> JoinHandle<Result<SearchOutcome, Error>> {
        let search = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let engine = self.clone();

        tracing::info!(search, keyword = ?query.keyword, "dispatching search");

        tokio::spawn(async move { engine.run_search(search, query).await })
    }

    #[tracing::instrument(skip(self, query))]
    async fn run_search(&self, search: u64, query: SearchQuery) -> Result<SearchOutcome, Error> {
        let restaurants = match self.places.search(&query).await {
            Ok(restaurants) => restaurants,
            Err(error) => {
                tracing::warn!(%error, "search failed; keeping current restaurants");
                return Ok(SearchOutcome::Failed { search, error });
            }
        };

        let count = restaurants.len();

        if self
            .presentation
            .replace_restaurants(search, restaurants)
            .await?
        {
            tracing::info!(count, "restaurants replaced");
            Ok(SearchOutcome::Applied { search, count })
        } else {
            tracing::info!("newer results already displayed; discarding");
            Ok(SearchOutcome::Superseded { search })
        }
    }
}
