use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

pub const DEFAULT_RADIUS: u32 = 50_000;
pub const DEFAULT_PLACE_TYPE: &str = "restaurant";

/// Parameters of one nearby search. Built per call, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub coordinates: Coordinates,
    pub radius: u32,
    pub place_type: String,
    pub keyword: Option<String>,
}

impl SearchQuery {
    pub fn new(coordinates: Coordinates, radius: u32, place_type: impl Into<String>) -> Self {
        Self {
            coordinates,
            radius,
            place_type: place_type.into(),
            keyword: None,
        }
    }

    /// Empty keywords are dropped so they never reach the request.
    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword.filter(|k| !k.is_empty());
        self
    }
}

#[test]
fn empty_keyword_is_dropped() {
    let query = SearchQuery::new(Coordinates::new(0.0, 0.0), DEFAULT_RADIUS, DEFAULT_PLACE_TYPE)
        .with_keyword(Some("".into()));
    assert_eq!(query.keyword, None);

    let query = query.with_keyword(Some(" ".into()));
    assert_eq!(query.keyword.as_deref(), Some(" "));

    let query = query.with_keyword(Some("thai food".into()));
    assert_eq!(query.keyword.as_deref(), Some("thai food"));
}
