//! Integration tests for `DataLoader` against local files and `wiremock`
//! HTTP mocks.

use storemap_core::{BuildOptions, DataSource};
use storemap_loader::{DataLoader, LoaderError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STORES_CSV: &str = "code,name,brand,latitude,longitude\n\
1,松屋 梅田店,松屋,34.7025,135.4959\n\
2,松のや 梅田店,松のや,34.7025,135.4959\n\
3,松屋 新宿店,松屋,35.6909,139.7003\n";

fn remote_loader(server: &MockServer) -> DataLoader {
    DataLoader::new(
        DataSource::parse(&format!("{}/data", server.uri())),
        5,
        "storemap-test/0.1",
    )
    .expect("failed to build test DataLoader")
}

fn local_loader(dir: &std::path::Path) -> DataLoader {
    DataLoader::new(DataSource::Directory(dir.to_path_buf()), 5, "storemap-test/0.1")
        .expect("failed to build test DataLoader")
}

// ---------------------------------------------------------------------------
// Remote source
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remote_store_table_is_built_into_features() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/stores.csv"))
        .and(header("user-agent", "storemap-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STORES_CSV))
        .mount(&server)
        .await;

    let (collection, report) = remote_loader(&server)
        .load_stores("stores.csv", BuildOptions::default())
        .await
        .expect("load should succeed");

    assert_eq!(collection.len(), 3);
    assert_eq!(report.offset_rows, 1);
    let second = collection.features[1].geometry.expect("geometry");
    assert!((second.longitude() - 135.495_95).abs() < 1e-9);
}

#[tokio::test]
async fn remote_allow_list_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/limited.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1\n3\n"))
        .mount(&server)
        .await;

    let list = remote_loader(&server)
        .load_allow_list("limited.csv")
        .await
        .expect("load should succeed");

    assert_eq!(list.id(), "limited.csv");
    assert!(list.contains("1"));
    assert!(list.contains("3"));
    assert!(!list.contains("2"));
}

#[tokio::test]
async fn remote_missing_file_is_http_status_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/gone.csv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = remote_loader(&server)
        .load_allow_list("gone.csv")
        .await
        .unwrap_err();

    assert!(
        matches!(err, LoaderError::HttpStatus { status: 404, .. }),
        "expected HttpStatus 404, got: {err:?}"
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn remote_server_error_is_not_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = remote_loader(&server).fetch_text("stores.csv").await.unwrap_err();
    assert!(matches!(err, LoaderError::HttpStatus { status: 503, .. }));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn remote_names_are_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/%E9%99%90%E5%AE%9A.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("9\n"))
        .mount(&server)
        .await;

    let list = remote_loader(&server)
        .load_allow_list("限定.csv")
        .await
        .expect("load should succeed");
    assert!(list.contains("9"));
}

#[tokio::test]
async fn remote_sources_list_nothing() {
    let server = MockServer::start().await;
    let lists = remote_loader(&server)
        .list_allow_lists("stores.csv")
        .await
        .unwrap();
    assert!(lists.is_empty());
}

// ---------------------------------------------------------------------------
// Local source
// ---------------------------------------------------------------------------

#[tokio::test]
async fn local_store_table_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stores.csv"), STORES_CSV).unwrap();

    let (collection, _) = local_loader(dir.path())
        .load_stores("stores.csv", BuildOptions::default())
        .await
        .expect("load should succeed");
    assert_eq!(collection.len(), 3);
}

#[tokio::test]
async fn local_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = local_loader(dir.path())
        .load_allow_list("absent.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, LoaderError::Io { .. }));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn traversal_is_rejected_before_any_read() {
    let dir = tempfile::tempdir().unwrap();
    let err = local_loader(dir.path())
        .load_allow_list("../secrets.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, LoaderError::InvalidFileName(_)));
}

#[tokio::test]
async fn local_allow_lists_exclude_store_table() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["stores.csv", "limited.csv", "curry.CSV", "notes.txt"] {
        std::fs::write(dir.path().join(name), "1\n").unwrap();
    }

    let lists = local_loader(dir.path())
        .list_allow_lists("stores.csv")
        .await
        .unwrap();
    assert_eq!(lists, vec!["curry.CSV".to_string(), "limited.csv".to_string()]);
}
