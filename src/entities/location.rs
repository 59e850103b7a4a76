use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Span of the default map viewport, in degrees.
pub const DEFAULT_SPAN_DEGREES: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lat, coordinates.lng)
    }
}

/// A single reported device location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coordinates: Coordinates,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Fix {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Visible map area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinates,
    pub span: Span,
}

impl Region {
    pub fn around(center: Coordinates) -> Self {
        Self {
            center,
            span: Span {
                latitude_delta: DEFAULT_SPAN_DEGREES,
                longitude_delta: DEFAULT_SPAN_DEGREES,
            },
        }
    }
}

#[test]
fn coordinates_into_location_parameter() {
    let location: String = Coordinates::new(41.258652, -95.937187).into();
    assert_eq!(location, "41.258652,-95.937187");
}

#[test]
fn region_is_centered_on_coordinates() {
    let center = Coordinates::new(40.7128, -74.006);
    let region = Region::around(center);

    assert_eq!(region.center, center);
    assert_eq!(region.span.latitude_delta, 0.1);
    assert_eq!(region.span.longitude_delta, 0.1);
}

#[test]
fn fix_timestamp_defaults_when_missing() {
    let fix: Fix = serde_json::from_str(r#"{"coordinates":{"lat":1.5,"lng":2.5}}"#).unwrap();
    assert_eq!(fix.coordinates, Coordinates::new(1.5, 2.5));
}
