use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::fmt::{self, Display};

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<SearchError> for Error {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Transport(err) => reqwest_error(err),
            _ => upstream_error(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn config_error(message: &str) -> Error {
    Error {
        code: 2,
        message: format!("configuration error: {}", message),
    }
}

pub fn reqwest_error(_: reqwest::Error) -> Error {
    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
    }
}

/// Identifies a result entry that failed to decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordRef {
    PlaceId(String),
    Index(usize),
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaceId(id) => write!(f, "place_id {}", id),
            Self::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Failure of a single nearby search. Every variant leaves the published
/// restaurant list untouched.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("http error: status {status}")]
    Http { status: u16 },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("provider returned status {status}")]
    Provider {
        status: String,
        message: Option<String>,
    },

    #[error("malformed record {record}: {reason}")]
    MalformedRecord { record: RecordRef, reason: String },
}

// the request url carries the api key
impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),
}

#[test]
fn record_ref_display() {
    assert_eq!(RecordRef::PlaceId("abc".into()).to_string(), "place_id abc");
    assert_eq!(RecordRef::Index(3).to_string(), "#3");
}

#[test]
fn search_error_maps_to_upstream_code() {
    let err: Error = SearchError::Http { status: 503 }.into();
    assert_eq!(err.code, 4);

    let err: Error = SearchError::MalformedRecord {
        record: RecordRef::Index(0),
        reason: "missing field `name`".into(),
    }
    .into();
    assert_eq!(err.code, 4);
}

#[test]
fn client_errors_respond_with_bad_request() {
    let response = invalid_input_error().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = upstream_error().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
