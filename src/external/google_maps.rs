use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::{
    api::PlacesAPI,
    config::Config,
    entities::{Restaurant, SearchQuery},
    error::{config_error, Error, SearchError},
};

pub const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";

/// Google Places nearby-search client.
#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl PlacesClient {
    pub fn new(api_base: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let endpoint = Url::parse(&format!(
            "{}{}",
            api_base.trim_end_matches('/'),
            NEARBY_SEARCH_PATH
        ))
        .map_err(|_| config_error("invalid GOOGLE_MAPS_API_BASE"))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("nearby-restaurants/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(&config.api_base, config.api_key.clone(), config.http_timeout)
    }

    /// Parameters go out in a fixed order: location, radius, type, keyword, key.
    pub fn build_url(&self, query: &SearchQuery) -> Url {
        let location: String = query.coordinates.into();

        let mut params = vec![
            format!("location={}", location),
            format!("radius={}", query.radius),
            format!("type={}", encode(&query.place_type)),
        ];

        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
            params.push(format!("keyword={}", encode(keyword)));
        }

        params.push(format!("key={}", encode(&self.api_key)));

        let mut url = self.endpoint.clone();
        url.set_query(Some(&params.join("&")));
        url
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

#[async_trait]
impl PlacesAPI for PlacesClient {
    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Restaurant>, SearchError> {
        let res = self.http.get(self.build_url(query)).send().await?;

        let status_code = res.status().as_u16();

        if status_code != 200 {
            return Err(SearchError::Http {
                status: status_code,
            });
        }

        let body = res.bytes().await?;

        parse_results(&body)
    }
}

/// Decodes a nearby-search response body.
pub fn parse_results(body: &[u8]) -> Result<Vec<Restaurant>, SearchError> {
    let data: Value =
        serde_json::from_slice(body).map_err(|e| SearchError::MalformedBody(e.to_string()))?;

    let data = data
        .as_object()
        .ok_or_else(|| SearchError::MalformedBody("expected a JSON object".into()))?;

    if let Some(status) = data.get("status").and_then(Value::as_str) {
        if !(status == "OK" || status == "ZERO_RESULTS") {
            return Err(SearchError::Provider {
                status: status.into(),
                message: data
                    .get("error_message")
                    .and_then(Value::as_str)
                    .map(String::from),
            });
        }
    }

    if data.contains_key("next_page_token") {
        tracing::debug!("ignoring next_page_token");
    }

    let results = data
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::MalformedBody("missing results array".into()))?;

    Restaurant::decode_all(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Coordinates, DEFAULT_PLACE_TYPE, DEFAULT_RADIUS};
    use crate::error::RecordRef;

    use axum::{extract::Extension, http::StatusCode, http::Uri, routing::get, Json, Router};
    use serde_json::json;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    struct Reply {
        status: StatusCode,
        body: Value,
        queries: Mutex<Vec<String>>,
    }

    async fn respond(Extension(reply): Extension<Arc<Reply>>, uri: Uri) -> (StatusCode, Json<Value>) {
        reply
            .queries
            .lock()
            .unwrap()
            .push(uri.query().unwrap_or_default().to_string());

        (reply.status, Json(reply.body.clone()))
    }

    /// Serves `body` with `status` for every nearby search, on a free local port.
    fn fake_provider(status: StatusCode, body: Value) -> (String, Arc<Reply>) {
        let reply = Arc::new(Reply {
            status,
            body,
            queries: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(NEARBY_SEARCH_PATH, get(respond))
            .layer(Extension(reply.clone()));

        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let base = format!("http://{}", server.local_addr());
        tokio::spawn(server);

        (base, reply)
    }

    fn client(base: &str) -> PlacesClient {
        PlacesClient::new(base, "test-key", Duration::from_secs(5)).unwrap()
    }

    fn omaha() -> SearchQuery {
        SearchQuery::new(
            Coordinates::new(41.258652, -95.937187),
            DEFAULT_RADIUS,
            DEFAULT_PLACE_TYPE,
        )
    }

    fn place(id: &str, name: &str) -> Value {
        json!({
            "business_status": "OPERATIONAL",
            "icon": "https://maps.gstatic.com/icon.png",
            "name": name,
            "place_id": id,
            "reference": id,
        })
    }

    #[test]
    fn url_without_keyword() {
        let url = client("https://maps.googleapis.com").build_url(&omaha());

        assert_eq!(url.path(), NEARBY_SEARCH_PATH);
        assert_eq!(
            url.query(),
            Some("location=41.258652,-95.937187&radius=50000&type=restaurant&key=test%2Dkey")
        );

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.iter().any(|(k, v)| k == "location" && v == "41.258652,-95.937187"));
        assert!(!params.iter().any(|(k, _)| k == "keyword"));
    }

    #[test]
    fn keyword_is_percent_encoded() {
        let query = omaha().with_keyword(Some("fish & chips, \"best\"?/#".into()));
        let url = client("https://maps.googleapis.com").build_url(&query);
        let raw = url.as_str();

        assert!(!raw.contains(' '));
        let keyword = url
            .query()
            .unwrap()
            .split('&')
            .find_map(|p| p.strip_prefix("keyword="))
            .unwrap();
        assert!(keyword.chars().all(|c| c.is_ascii_alphanumeric() || c == '%'));
        assert_eq!(keyword, "fish%20%26%20chips%2C%20%22best%22%3F%2F%23");

        let decoded: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(decoded
            .iter()
            .any(|(k, v)| k == "keyword" && v == "fish & chips, \"best\"?/#"));
    }

    #[test]
    fn empty_keyword_is_omitted() {
        let mut query = omaha();
        query.keyword = Some("".into());
        let url = client("https://maps.googleapis.com").build_url(&query);

        assert!(!url.query().unwrap().contains("keyword"));
    }

    #[test]
    fn parse_rejects_provider_errors() {
        let body = json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        });

        match parse_results(body.to_string().as_bytes()) {
            Err(SearchError::Provider { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message.as_deref(), Some("The provided API key is invalid."));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_requires_results_array() {
        assert!(matches!(
            parse_results(br#"{"status":"OK"}"#),
            Err(SearchError::MalformedBody(_))
        ));
        assert!(matches!(
            parse_results(b"not json"),
            Err(SearchError::MalformedBody(_))
        ));
        assert!(matches!(
            parse_results(b"[]"),
            Err(SearchError::MalformedBody(_))
        ));
    }

    #[test]
    fn parse_accepts_zero_results() {
        let restaurants =
            parse_results(br#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        assert!(restaurants.is_empty());
    }

    #[test]
    fn parse_ignores_next_page_token() {
        let body = json!({
            "status": "OK",
            "next_page_token": "Aap_uEA7vb0DDYVJWEaX3O-AtYp77AaswQKSGtDaimt3gt7QCNpdjp1BkdM6acJ96xTec3tsV_ZJNL_JP-lqsVxydG3nh739RE_hepOOL05tfJh2_ranjMadb3VoBYFvF0ma6S24qZ6QJUuV6sSRrhCskSBP5C1myCzsebztMfGvm7ij3gZT",
            "results": [place("a", "Alpha")]
        });

        let restaurants = parse_results(body.to_string().as_bytes()).unwrap();
        assert_eq!(restaurants.len(), 1);
    }

    #[tokio::test]
    async fn search_returns_every_result_in_order() {
        let body = json!({
            "status": "OK",
            "results": [place("a", "Alpha"), place("b", "Bravo"), place("c", "Charlie")]
        });
        let (base, reply) = fake_provider(StatusCode::OK, body);

        let restaurants = client(&base).search(&omaha()).await.unwrap();

        let ids: Vec<&str> = restaurants.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let queries = reply.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].starts_with("location=41.258652,-95.937187&radius=50000"));
    }

    #[tokio::test]
    async fn search_fails_whole_batch_on_one_bad_record() {
        let mut bad = place("b", "Bravo");
        bad.as_object_mut().unwrap().remove("business_status");
        let body = json!({ "results": [place("a", "Alpha"), bad, place("c", "Charlie")] });
        let (base, _) = fake_provider(StatusCode::OK, body);

        match client(&base).search(&omaha()).await {
            Err(SearchError::MalformedRecord { record, .. }) => {
                assert_eq!(record, RecordRef::PlaceId("b".into()))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn search_reports_http_status() {
        let (base, _) = fake_provider(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "results": [place("a", "Alpha")] }),
        );

        assert!(matches!(
            client(&base).search(&omaha()).await,
            Err(SearchError::Http { status: 503 })
        ));
    }

    #[tokio::test]
    async fn search_reports_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        assert!(matches!(
            client(&base).search(&omaha()).await,
            Err(SearchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn transport_error_does_not_reveal_api_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = PlacesClient::new(&base, "SECRETKEY123", Duration::from_secs(5)).unwrap();
        let err = client.search(&omaha()).await.unwrap_err();

        assert!(matches!(err, SearchError::Transport(_)));
        assert!(!err.to_string().contains("SECRETKEY123"));
        assert!(!format!("{:?}", err).contains("SECRETKEY123"));
    }
}
