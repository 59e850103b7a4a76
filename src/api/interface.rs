use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{Restaurant, SearchQuery};
use crate::error::SearchError;

#[async_trait]
pub trait PlacesAPI {
    /// Runs one nearby search. Exactly one request per call.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, SearchError>;
}

pub type DynPlacesAPI = Arc<dyn PlacesAPI + Send + Sync>;
