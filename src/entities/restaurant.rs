use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    entities::Coordinates,
    error::{RecordRef, SearchError},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub business_status: String,
    pub icon_url: String,
    pub location: Option<Coordinates>,
    pub price_level: Option<u8>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub open_now: Option<bool>,
    pub reference: String,
}

/// Wire shape of one nearby-search result.
#[derive(Deserialize)]
struct PlaceResult {
    place_id: String,
    name: String,
    business_status: String,
    icon: String,
    reference: String,
    geometry: Option<Geometry>,
    price_level: Option<u8>,
    rating: Option<f64>,
    user_ratings_total: Option<u64>,
    opening_hours: Option<OpeningHours>,
}

#[derive(Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Deserialize)]
struct LatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

impl Restaurant {
    /// Decodes the result entry at `index`.
    pub fn decode(index: usize, value: &Value) -> Result<Self, SearchError> {
        let malformed = |reason: String| SearchError::MalformedRecord {
            record: record_ref(index, value),
            reason,
        };

        if !value.is_object() {
            return Err(malformed("expected a JSON object".into()));
        }

        let result = PlaceResult::deserialize(value).map_err(|e| malformed(e.to_string()))?;

        if result.place_id.is_empty() {
            return Err(malformed("empty place_id".into()));
        }

        // a location is only kept when both halves are present
        let location = result
            .geometry
            .and_then(|g| g.location)
            .and_then(|l| Some(Coordinates::new(l.lat?, l.lng?)));

        Ok(Self {
            id: result.place_id,
            name: result.name,
            business_status: result.business_status,
            icon_url: result.icon,
            location,
            price_level: result.price_level,
            rating: result.rating,
            user_ratings_total: result.user_ratings_total,
            open_now: result.opening_hours.and_then(|h| h.open_now),
            reference: result.reference,
        })
    }

    /// Decodes every entry or none: the first malformed entry fails the batch.
    pub fn decode_all(values: &[Value]) -> Result<Vec<Self>, SearchError> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| Self::decode(index, value))
            .collect()
    }
}

fn record_ref(index: usize, value: &Value) -> RecordRef {
    match value.get("place_id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => RecordRef::PlaceId(id.to_string()),
        _ => RecordRef::Index(index),
    }
}
