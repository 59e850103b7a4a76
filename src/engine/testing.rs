use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::{
    api::PlacesAPI,
    entities::{Restaurant, SearchQuery},
    error::SearchError,
};

type Reply = Result<Vec<Restaurant>, SearchError>;

pub fn restaurant(id: &str) -> Restaurant {
    Restaurant {
        id: id.into(),
        name: format!("Restaurant {}", id),
        business_status: "OPERATIONAL".into(),
        icon_url: "https://maps.gstatic.com/icon.png".into(),
        location: None,
        price_level: None,
        rating: None,
        user_ratings_total: None,
        open_now: None,
        reference: id.into(),
    }
}

/// Places provider whose replies are released by the test, keyed by keyword.
/// Searches with no scripted reply answer at once with a single "default" entry.
#[derive(Default)]
pub struct ScriptedPlaces {
    queries: Mutex<Vec<SearchQuery>>,
    replies: Mutex<HashMap<Option<String>, oneshot::Receiver<Reply>>>,
}

impl ScriptedPlaces {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn expect(&self, keyword: Option<&str>) -> oneshot::Sender<Reply> {
        let (reply, pending) = oneshot::channel();
        self.replies
            .lock()
            .unwrap()
            .insert(keyword.map(String::from), pending);
        reply
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlacesAPI for ScriptedPlaces {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, SearchError> {
        self.queries.lock().unwrap().push(query.clone());

        let pending = self.replies.lock().unwrap().remove(&query.keyword);

        match pending {
            Some(pending) => pending
                .await
                .unwrap_or_else(|_| Err(SearchError::Http { status: 599 })),
            None => Ok(vec![restaurant("default")]),
        }
    }
}
