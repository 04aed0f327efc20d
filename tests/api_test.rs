use chrono::{TimeZone, Utc};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

use pricelog::clock::FixedClock;
use pricelog::config::{AppState, Config};
use pricelog::handler::handle_request;
use pricelog::partition::partition;
use pricelog::query::insert_entry;
use pricelog::store::{init_schema, Database, SharedDatabase, SqliteDatabase};

struct Harness {
    state: Arc<AppState>,
    db: Arc<SqliteDatabase>,
    _assets: tempfile::TempDir,
}

fn harness(with_schema: bool) -> Harness {
    harness_with(with_schema, |_| {})
}

fn harness_with(with_schema: bool, configure: impl FnOnce(&mut Config)) -> Harness {
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    if with_schema {
        init_schema(&db).unwrap();
    }

    let assets = tempfile::tempdir().unwrap();
    std::fs::write(assets.path().join("index.html"), "<h1>prices</h1>").unwrap();
    std::fs::write(assets.path().join("app.js"), "console.log(1);").unwrap();

    let mut config = Config::defaults().unwrap();
    config.assets.dir = assets.path().display().to_string();
    config.logging.access_log = false;
    configure(&mut config);

    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
    ));
    let shared: SharedDatabase = db.clone();
    let state = Arc::new(AppState::with_clock(config, shared, clock));

    Harness {
        state,
        db,
        _assets: assets,
    }
}

impl Harness {
    async fn send(&self, method: &str, uri: &str, body: &str) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handle_request(req, Arc::clone(&self.state), peer).await.unwrap()
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let resp = self.send("GET", uri, "").await;
        let status = resp.status();
        (status, body_json(resp).await)
    }

    fn seed(&self, entry_type: &str, price: f64, ymd: (i32, u32, u32)) {
        let instant = Utc.with_ymd_and_hms(ymd.0, ymd.1, ymd.2, 12, 0, 0).unwrap();
        self.db
            .run(&insert_entry(entry_type, price, &partition(instant)))
            .unwrap();
    }
}

async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
    resp.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(resp: Response<Full<Bytes>>) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

#[tokio::test]
async fn test_log_entry_then_summary() {
    let h = harness(true);

    let resp = h
        .send("POST", "/api/log-entry", r#"{"entry_type":"coffee","price":4.5}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
    assert_eq!(body_json(resp).await, serde_json::json!({"success": true}));

    let stored = h
        .db
        .first(&pricelog::query::Statement::new("SELECT * FROM entries"))
        .unwrap()
        .unwrap();
    assert_eq!(stored["entry_type"], "coffee");
    assert_eq!(stored["entry_date"], "2024-03-15");
    assert_eq!(stored["entry_timestamp"], "2024-03-15T10:00:00.000Z");
    assert_eq!(stored["year"], 2024);
    assert_eq!(stored["month"], 3);
    assert_eq!(stored["week"], 11);
    assert_eq!(stored["day"], 15);

    let resp = h.send("GET", "/api/summary", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["Cache-Control"], "no-cache");
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["meta"]["filtered"], false);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["entry_type"], "coffee");
    assert_eq!(results[0]["count"], 1);
    assert_eq!(results[0]["total_value"], 4.5);
    assert_eq!(results[0]["average_price"], 4.5);
}

#[tokio::test]
async fn test_summary_groups_by_type_with_filters() {
    let h = harness(true);
    h.seed("coffee", 3.0, (2024, 3, 15));
    h.seed("coffee", 5.0, (2024, 3, 15));
    h.seed("tea", 2.0, (2024, 3, 15));
    h.seed("coffee", 100.0, (2024, 4, 2));

    let (status, body) = h.get_json("/api/summary?date=2024-03-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["filtered"], true);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    let coffee = results.iter().find(|r| r["entry_type"] == "coffee").unwrap();
    assert_eq!(coffee["count"], 2);
    assert_eq!(coffee["total_value"], 8.0);
    assert_eq!(coffee["average_price"], 4.0);

    let (_, body) = h.get_json("/api/summary?year=2024&month=4").await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["total_value"], 100.0);

    // Empty values are ignored
    let (_, body) = h.get_json("/api/summary?year=&week=").await;
    assert_eq!(body["meta"]["filtered"], false);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_weekly_summary_january_range() {
    let h = harness(true);
    h.seed("coffee", 1.5, (2024, 1, 2));
    h.seed("coffee", 2.0, (2024, 1, 10));
    h.seed("tea", 2.5, (2024, 1, 11));
    h.seed("coffee", 9.0, (2024, 2, 20));

    let (status, body) = h
        .get_json("/api/weekly-summary?start_date=2024-01-01&end_date=2024-01-31")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["start_date"], "2024-01-01");
    assert_eq!(body["meta"]["end_date"], "2024-01-31");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["week"], 2);
    assert_eq!(results[0]["weekly_total"], 4.5);
    assert_eq!(results[0]["entry_count"], 2);
    assert_eq!(results[1]["week"], 1);
    assert_eq!(results[1]["weekly_total"], 1.5);
}

#[tokio::test]
async fn test_daily_and_monthly_summaries() {
    let h = harness(true);
    h.seed("coffee", 1.0, (2024, 1, 31));
    h.seed("coffee", 2.0, (2024, 2, 1));
    h.seed("tea", 3.0, (2024, 2, 1));

    let (_, body) = h.get_json("/api/daily-summary").await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["entry_date"], "2024-02-01");
    assert_eq!(results[0]["daily_total"], 5.0);
    assert_eq!(results[1]["entry_date"], "2024-01-31");

    let (_, body) = h.get_json("/api/monthly-summary?start_date=2024-02-01").await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["month"], 2);
    assert_eq!(results[0]["monthly_total"], 5.0);
    assert_eq!(results[0]["entry_count"], 2);

    // Daily ignores point filters
    let (_, body) = h.get_json("/api/daily-summary?year=1999").await;
    assert_eq!(body["meta"]["filtered"], false);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_table_is_404() {
    let h = harness(false);
    for uri in [
        "/api/summary",
        "/api/daily-summary",
        "/api/weekly-summary",
        "/api/monthly-summary",
    ] {
        let (status, body) = h.get_json(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "Table does not exist");
        assert!(body["message"].as_str().unwrap().contains("entries"));
    }
}

#[tokio::test]
async fn test_invalid_integer_filter_is_400() {
    let h = harness(true);
    let (status, body) = h.get_json("/api/summary?week=eleven").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid filter");
    assert!(body["message"].as_str().unwrap().contains("week"));
}

#[tokio::test]
async fn test_malformed_entry_body_is_500() {
    let h = harness(true);
    let resp = h.send("POST", "/api/log-entry", "not json").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Failed to log entry");
    assert!(body.get("details").is_none());

    let resp = h
        .send("POST", "/api/log-entry", r#"{"entry_type":"coffee"}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_api_route_is_404() {
    let h = harness(true);
    let resp = h.send("GET", "/api/nothing", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Wrong method on a known path
    let resp = h.send("GET", "/api/log-entry", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_options_preflight() {
    let h = harness(true);
    let resp = h.send("OPTIONS", "/api/log-entry", "").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
    assert!(resp.headers()["Access-Control-Allow-Methods"]
        .to_str()
        .unwrap()
        .contains("POST"));
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn test_static_assets() {
    let h = harness(true);

    let resp = h.send("GET", "/", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
    assert!(resp.headers().contains_key("ETag"));
    assert_eq!(&body_bytes(resp).await[..], b"<h1>prices</h1>");

    let resp = h.send("GET", "/app.js", "").await;
    assert_eq!(resp.headers()["Content-Type"], "application/javascript");

    let resp = h.send("GET", "/missing.css", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"Not Found: missing.css");

    let resp = h.send("DELETE", "/", "").await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_and_server_header() {
    let h = harness(true);
    let resp = h.send("GET", "/healthz", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["Server"], "pricelog/0.1");

    let resp = h.send("GET", "/readyz", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_range_summaries_ignore_calendar_parameters() {
    let h = harness(true);
    h.seed("coffee", 1.0, (2024, 1, 31));
    h.seed("tea", 2.0, (2024, 2, 1));

    for uri in [
        "/api/daily-summary?year=abc",
        "/api/weekly-summary?week=x",
        "/api/monthly-summary?day=1st&month=feb",
    ] {
        let (status, body) = h.get_json(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["meta"]["filtered"], false);
        assert_eq!(body["results"].as_array().unwrap().len(), 2, "{uri}");
    }

    let (status, body) = h
        .get_json("/api/daily-summary?year=abc&start_date=2024-02-01")
        .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["entry_date"], "2024-02-01");
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let h = harness(false);
    h.db.execute_batch("CREATE TABLE entries (id INTEGER PRIMARY KEY)")
        .unwrap();

    for (uri, label) in [
        ("/api/summary", "Failed to fetch summary"),
        ("/api/daily-summary", "Failed to fetch daily summary"),
        ("/api/weekly-summary", "Failed to fetch weekly summary"),
        ("/api/monthly-summary", "Failed to fetch monthly summary"),
    ] {
        let (status, body) = h.get_json(uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["error"], label);
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    let resp = h
        .send("POST", "/api/log-entry", r#"{"entry_type":"coffee","price":4.5}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["error"], "Failed to log entry");
}

#[tokio::test]
async fn test_oversized_body_without_content_length_is_413() {
    let h = harness_with(true, |config| config.http.max_body_size = 32);

    let body = format!(r#"{{"entry_type":"{}","price":1.0}}"#, "x".repeat(64));
    let resp = h.send("POST", "/api/log-entry", &body).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(resp).await["error"], "Payload Too Large");

    let (_, summary) = h.get_json("/api/summary").await;
    assert!(summary["results"].as_array().unwrap().is_empty());

    let resp = h
        .send("POST", "/api/log-entry", r#"{"entry_type":"tea","price":1}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}
