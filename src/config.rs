use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::{
    engine::OverwritePolicy,
    entities::{Coordinates, DEFAULT_PLACE_TYPE, DEFAULT_RADIUS},
    error::{config_error, Error},
};

pub const DEFAULT_API_BASE: &str = "https://maps.googleapis.com";

// Omaha, NE
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    lat: 41.258652,
    lng: -95.937187,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub api_key: String,
    pub radius: u32,
    pub place_type: String,
    pub default_coordinates: Coordinates,
    pub overwrite_policy: OverwritePolicy,
    pub listen_addr: SocketAddr,
    pub http_timeout: Duration,
}

impl Config {
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY")?;
        if api_key.is_empty() {
            return Err(config_error("GOOGLE_MAPS_API_KEY is empty"));
        }

        Ok(Self {
            api_base: env::var("GOOGLE_MAPS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            api_key,
            radius: parse_var("PLACES_SEARCH_RADIUS", DEFAULT_RADIUS)?,
            place_type: env::var("PLACES_SEARCH_TYPE")
                .unwrap_or_else(|_| DEFAULT_PLACE_TYPE.into()),
            default_coordinates: Coordinates {
                lat: parse_var("DEFAULT_LATITUDE", DEFAULT_COORDINATES.lat)?,
                lng: parse_var("DEFAULT_LONGITUDE", DEFAULT_COORDINATES.lng)?,
            },
            overwrite_policy: parse_var("OVERWRITE_POLICY", OverwritePolicy::default())?,
            listen_addr: parse_var("LISTEN_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 10)?),
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| config_error(&format!("invalid value for {}", name))),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err.into()),
    }
}

#[test]
fn parse_var_uses_default_when_unset() {
    let radius: u32 = parse_var("NEARBY_TEST_UNSET_RADIUS", 1500).unwrap();
    assert_eq!(radius, 1500);
}

#[test]
fn parse_var_rejects_garbage() {
    env::set_var("NEARBY_TEST_BAD_RADIUS", "fifty");
    let err = parse_var::<u32>("NEARBY_TEST_BAD_RADIUS", 1500).unwrap_err();
    assert_eq!(err.code, 2);
}

#[test]
fn parse_var_reads_policy() {
    env::set_var("NEARBY_TEST_POLICY", "latest_request_wins");
    let policy = parse_var("NEARBY_TEST_POLICY", OverwritePolicy::default()).unwrap();
    assert_eq!(policy, OverwritePolicy::LatestRequestWins);
}
