//! Integration tests for paginated acquisition and the snapshot cache gate

use std::time::Duration;

use mockito::{Mock, Server, ServerGuard};
use serde_json::{Value as Json, json};
use tsa_demand::app::pipeline::{MERGED, POWER, Pipeline, SALES};
use tsa_demand::data::{ApiClient, fetch_csv, http_client};
use tsa_demand::domain::{AcquireConfig, RestDataset, Value};
use tsa_demand::error::PipelineError;
use tsa_demand::report::Origin;

fn page_body(resource: &str, records: Json, next_page: Option<&str>, max_page: u64) -> String {
    json!({
        "payload": {
            resource: records,
            "max_page": max_page,
            "next_page": next_page,
            "page": 1,
        },
        "status": "ok",
    })
    .to_string()
}

fn mock_page(server: &mut ServerGuard, path: &str, body: String, hits: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create()
}

fn api(server: &ServerGuard) -> ApiClient {
    ApiClient::new(http_client(Duration::from_secs(5)).unwrap(), &server.url()).unwrap()
}

fn pipeline(server: &ServerGuard, dir: &std::path::Path) -> Pipeline {
    Pipeline::new(&AcquireConfig {
        api_base: server.url(),
        power_url: format!("{}/opsd_germany_daily.csv", server.url()),
        data_dir: dir.to_path_buf(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[test]
fn single_page_resource() {
    //* Given
    let mut server = Server::new();
    let page = mock_page(
        &mut server,
        "/api/v1/items",
        page_body(
            "items",
            json!([{"item_id": 1, "item_brand": "Riceland", "item_price": 0.84}]),
            None,
            1,
        ),
        1,
    );

    //* When
    let table = api(&server).fetch_resource("items").expect("fetch failed");

    //* Then
    page.assert();
    assert_eq!(table.len(), 1);
    assert_eq!(table.columns(), ["item_id", "item_brand", "item_price"]);
    assert_eq!(table.get(0, "item_price"), Some(&Value::Float(0.84)));
}

#[test]
fn pages_are_concatenated_in_order_and_last_page_is_kept() {
    //* Given
    let mut server = Server::new();
    let p1 = mock_page(
        &mut server,
        "/api/v1/sales",
        page_body("sales", json!([{"sale_id": 1}, {"sale_id": 2}]), Some("/api/v1/sales/page/2"), 3),
        1,
    );
    let p2 = mock_page(
        &mut server,
        "/api/v1/sales/page/2",
        page_body("sales", json!([{"sale_id": 3}, {"sale_id": 4}]), Some("/api/v1/sales/page/3"), 3),
        1,
    );
    let p3 = mock_page(
        &mut server,
        "/api/v1/sales/page/3",
        page_body("sales", json!([{"sale_id": 5}]), None, 3),
        1,
    );
    // Nothing links here; it must never be requested.
    let beyond = mock_page(
        &mut server,
        "/api/v1/sales/page/4",
        page_body("sales", json!([{"sale_id": 99}]), None, 3),
        0,
    );

    //* When
    let table = api(&server).fetch_resource("sales").expect("fetch failed");

    //* Then
    p1.assert();
    p2.assert();
    p3.assert();
    beyond.assert();
    let ids = table.numeric_column("sales", "sale_id").unwrap();
    assert_eq!(ids, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn failed_page_aborts_fetch_and_persists_nothing() {
    //* Given
    let mut server = Server::new();
    let _p1 = mock_page(
        &mut server,
        "/api/v1/sales",
        page_body("sales", json!([{"sale_id": 1}]), Some("/api/v1/sales/page/2"), 2),
        1,
    );
    let _p2 = server
        .mock("GET", "/api/v1/sales/page/2")
        .with_status(500)
        .create();
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(&server, dir.path());

    //* When
    let err = pipeline.sales().unwrap_err();

    //* Then
    match err {
        PipelineError::FetchFailed { status, url } => {
            assert_eq!(status.as_u16(), 500);
            assert!(url.ends_with("/api/v1/sales/page/2"), "{url}");
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
    assert!(!pipeline.store().exists(SALES));
}

#[test]
fn unreachable_next_page_is_a_transport_error() {
    //* Given
    let mut server = Server::new();
    let _p1 = mock_page(
        &mut server,
        "/api/v1/stores",
        page_body(
            "stores",
            json!([{"store_id": 1}]),
            Some("http://127.0.0.1:1/api/v1/stores/page/2"),
            2,
        ),
        1,
    );

    //* When
    let err = api(&server).fetch_resource("stores").unwrap_err();

    //* Then
    assert!(matches!(err, PipelineError::Transport { .. }), "{err:?}");
}

#[test]
fn malformed_payload_is_reported() {
    //* Given
    let mut server = Server::new();
    let _p1 = mock_page(&mut server, "/api/v1/items", json!({"status": "ok"}).to_string(), 1);

    //* When
    let err = api(&server).fetch_resource("items").unwrap_err();

    //* Then
    assert!(matches!(err, PipelineError::MalformedPayload { .. }), "{err:?}");
}

#[test]
fn merged_dataset_is_fetched_once_then_served_from_snapshots() {
    //* Given
    let mut server = Server::new();
    let sales = mock_page(
        &mut server,
        "/api/v1/sales",
        page_body(
            "sales",
            json!([
                {"item": 10, "sale_amount": 5.0, "sale_date": "Tue, 01 Jan 2013 00:00:00 GMT", "store": 1},
                {"item": 11, "sale_amount": 7.0, "sale_date": "Wed, 02 Jan 2013 00:00:00 GMT", "store": 2}
            ]),
            None,
            1,
        ),
        1,
    );
    let items = mock_page(
        &mut server,
        "/api/v1/items",
        page_body("items", json!([{"item_id": 10, "item_name": "X"}, {"item_id": 11, "item_name": "Y"}]), None, 1),
        1,
    );
    let stores = mock_page(
        &mut server,
        "/api/v1/stores",
        page_body("stores", json!([{"store_id": 1, "name": "A"}, {"store_id": 2, "name": "B"}]), None, 1),
        1,
    );
    let dir = tempfile::tempdir().unwrap();

    //* When
    let first = pipeline(&server, dir.path())
        .acquire(RestDataset::Merged)
        .expect("first acquire failed");
    let second = pipeline(&server, dir.path())
        .acquire(RestDataset::All)
        .expect("second acquire failed");
    let merged = pipeline(&server, dir.path()).merged().unwrap();

    //* Then
    sales.assert();
    items.assert();
    stores.assert();

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].origin, Origin::Remote);
    assert!(second.iter().all(|s| s.origin == Origin::Snapshot));
    assert!(dir.path().join(format!("{MERGED}.csv")).is_file());

    assert_eq!(merged.len(), 2);
    assert_eq!(merged.get(0, "name"), Some(&Value::from("A")));
    assert_eq!(merged.get(0, "item_name"), Some(&Value::from("X")));
    assert_eq!(merged.get(1, "store_id"), Some(&Value::Int(2)));
}

#[test]
fn next_page_pointing_back_is_rejected() {
    //* Given
    let mut server = Server::new();
    let p1 = mock_page(
        &mut server,
        "/api/v1/sales",
        page_body("sales", json!([{"sale_id": 1}]), Some("/api/v1/sales/page/2"), 2),
        1,
    );
    let p2 = mock_page(
        &mut server,
        "/api/v1/sales/page/2",
        page_body("sales", json!([{"sale_id": 2}]), Some("/api/v1/sales"), 2),
        1,
    );

    //* When
    let err = api(&server).fetch_resource("sales").unwrap_err();

    //* Then
    p1.assert();
    p2.assert();
    match err {
        PipelineError::MalformedPayload { url, reason } => {
            assert!(url.ends_with("/api/v1/sales/page/2"), "{url}");
            assert!(reason.contains("already fetched"), "{reason}");
        }
        other => panic!("expected MalformedPayload, got {other:?}"),
    }
}

const POWER_CSV: &str = "Date,Consumption,Wind\n2006-01-01,1069.184,\n2006-01-02,1380.521,12.5\n";

#[test]
fn power_csv_is_downloaded_once_and_saved_with_row_index() {
    //* Given
    let mut server = Server::new();
    let csv = server
        .mock("GET", "/opsd_germany_daily.csv")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body(POWER_CSV)
        .expect(1)
        .create();
    let dir = tempfile::tempdir().unwrap();

    //* When
    let first = pipeline(&server, dir.path()).power().expect("download failed");
    let second = pipeline(&server, dir.path()).power().expect("snapshot read failed");

    //* Then
    csv.assert();
    assert_eq!(first.columns(), ["Date", "Consumption", "Wind"]);
    assert_eq!(first.len(), 2);
    assert_eq!(first.get(0, "Wind"), Some(&Value::Null));
    assert_eq!(first.get(1, "Wind"), Some(&Value::Float(12.5)));
    assert_eq!(second, first);

    let saved = std::fs::read_to_string(dir.path().join(format!("{POWER}.csv"))).unwrap();
    assert_eq!(
        saved,
        ",Date,Consumption,Wind\n0,2006-01-01,1069.184,\n1,2006-01-02,1380.521,12.5\n"
    );
}

#[test]
fn power_csv_not_found_persists_nothing() {
    //* Given
    let mut server = Server::new();
    let _csv = server
        .mock("GET", "/opsd_germany_daily.csv")
        .with_status(404)
        .create();
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(&server, dir.path());

    //* When
    let err = pipeline.power().unwrap_err();

    //* Then
    match err {
        PipelineError::FetchFailed { status, url } => {
            assert_eq!(status.as_u16(), 404);
            assert!(url.ends_with("/opsd_germany_daily.csv"), "{url}");
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
    assert!(!pipeline.store().exists(POWER));
}

#[test]
fn ragged_csv_is_a_malformed_payload() {
    //* Given
    let mut server = Server::new();
    let _csv = server
        .mock("GET", "/opsd_germany_daily.csv")
        .with_status(200)
        .with_body("Date,Consumption\n2006-01-01,1069.184,7.0\n")
        .create();
    let client = http_client(Duration::from_secs(5)).unwrap();

    //* When
    let err = fetch_csv(&client, &format!("{}/opsd_germany_daily.csv", server.url())).unwrap_err();

    //* Then
    assert!(matches!(err, PipelineError::MalformedPayload { .. }), "{err:?}");
}
