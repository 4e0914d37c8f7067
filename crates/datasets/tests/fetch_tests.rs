//! Cache-or-fetch behavior against a one-shot loopback origin.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use datasets::{DatasetError, ListingsClient};

const BODY: &str = "id,price\n1,100\n2,250\n";

/// Serve exactly one HTTP response on a loopback listener, then exit.
fn serve_once(status_line: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let response = format!(
                "{status_line}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (addr, handle)
}

#[test]
fn test_miss_fetches_and_populates_cache_then_hits_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("raw").join("listings");
    let (addr, server) = serve_once("HTTP/1.1 200 OK", BODY);

    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let client = ListingsClient::new(&cache_dir)
        .unwrap()
        .with_base_url(format!("http://{addr}"));

    // first call: network fetch, cache write
    let table = client.fetch(date).unwrap();
    assert_eq!(table.len(), 2);

    let cached = client.cache_path(date);
    assert!(cached.exists());
    assert_eq!(std::fs::read_to_string(&cached).unwrap(), BODY);
    server.join().unwrap();

    // second call: the origin is gone, so success proves the cache served
    let table = client.fetch(date).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.numeric_column("price").unwrap(), vec![100.0, 250.0]);
}

#[test]
fn test_cache_hit_skips_the_network_entirely() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2022, 9, 7).unwrap();

    // pre-seed the cache; the base URL is unroutable, so any network
    // attempt would fail the call
    let client = ListingsClient::new(dir.path())
        .unwrap()
        .with_base_url("http://192.0.2.1:9");
    std::fs::write(client.cache_path(date), BODY).unwrap();

    let table = client.fetch(date).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.headers(), &["id", "price"]);
}

#[test]
fn test_error_status_propagates_and_leaves_no_cache() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, server) = serve_once("HTTP/1.1 404 Not Found", "missing");

    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let client = ListingsClient::new(dir.path())
        .unwrap()
        .with_base_url(format!("http://{addr}"));

    let err = client.fetch(date).unwrap_err();
    assert!(matches!(err, DatasetError::Status { status, .. } if status.as_u16() == 404));
    assert!(!client.cache_path(date).exists());
    server.join().unwrap();
}

#[test]
fn test_transport_failure_is_a_request_error() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    // bind a listener and drop it so the port refuses connections
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = ListingsClient::new(dir.path())
        .unwrap()
        .with_base_url(format!("http://127.0.0.1:{port}"));

    let err = client.fetch(date).unwrap_err();
    assert!(matches!(err, DatasetError::Request { .. }));
}
