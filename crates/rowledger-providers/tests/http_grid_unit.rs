// crates/rowledger-providers/tests/http_grid_unit.rs
// ============================================================================
// Module: HTTP Grid Adapter Tests
// Description: Adapter tests against a local in-process grid server.
// Purpose: Exercise the wire protocol, auth handling, and error mapping.
// ============================================================================

//! ## Overview
//! Runs the HTTP grid adapter against a `tiny_http` server that keeps its
//! grid in memory, covering the full read/append/update/delete protocol,
//! bearer-credential handling, and status-code error classification.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use rowledger_core::AuthError;
use rowledger_core::CredentialProvider;
use rowledger_core::ServiceToken;
use rowledger_core::StoreAdapter;
use rowledger_core::StoreError;
use rowledger_core::header_row;
use rowledger_providers::HttpGridConfig;
use rowledger_providers::HttpGridStoreAdapter;
use rowledger_providers::StaticCredentialProvider;
use serde_json::Value;
use serde_json::json;
use tiny_http::Method;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

const TEST_TOKEN: &str = "test-token";

/// Spawns a grid server that answers a fixed number of requests.
///
/// The grid starts seeded with the header row and mutates in memory like
/// the real service would.
fn grid_server(request_budget: usize) -> (String, thread::JoinHandle<Vec<Vec<String>>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base_url = format!("http://{addr}");
    let handle = thread::spawn(move || {
        let mut grid: Vec<Vec<String>> = vec![header_row()];
        for _ in 0 .. request_budget {
            let Ok(mut request) = server.recv() else {
                break;
            };
            if !authorized(&request) {
                let _ = request.respond(Response::from_string("denied").with_status_code(401));
                continue;
            }
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let reply = handle_request(&mut grid, request.method(), request.url(), &body);
            let _ = request.respond(reply);
        }
        grid
    });
    (base_url, handle)
}

/// Checks the bearer credential on an incoming request.
fn authorized(request: &tiny_http::Request) -> bool {
    let expected = format!("Bearer {TEST_TOKEN}");
    request
        .headers()
        .iter()
        .any(|header| {
            header.field.equiv("Authorization") && header.value.as_str() == expected
        })
}

/// Applies one protocol request to the in-memory grid.
fn handle_request(
    grid: &mut Vec<Vec<String>>,
    method: &Method,
    url: &str,
    body: &str,
) -> Response<std::io::Cursor<Vec<u8>>> {
    match (method, url) {
        (Method::Get, "/rows") => Response::from_string(json!({ "rows": grid }).to_string()),
        (Method::Post, "/rows") => {
            let parsed: Value = serde_json::from_str(body).unwrap();
            let row: Vec<String> = parsed["row"]
                .as_array()
                .unwrap()
                .iter()
                .map(|cell| cell.as_str().unwrap().to_string())
                .collect();
            grid.push(row);
            Response::from_string("{}")
        }
        (Method::Post, "/cells") => {
            let parsed: Value = serde_json::from_str(body).unwrap();
            let row = usize::try_from(parsed["row"].as_u64().unwrap()).unwrap();
            let column = usize::try_from(parsed["column"].as_u64().unwrap()).unwrap();
            grid[row][column] = parsed["value"].as_str().unwrap().to_string();
            Response::from_string("{}")
        }
        (Method::Post, "/rows/delete") => {
            let parsed: Value = serde_json::from_str(body).unwrap();
            let start = usize::try_from(parsed["start"].as_u64().unwrap()).unwrap();
            let end = usize::try_from(parsed["end"].as_u64().unwrap()).unwrap();
            grid.drain(start .. end);
            Response::from_string("{}")
        }
        (Method::Post, "/rows/clear") => {
            let parsed: Value = serde_json::from_str(body).unwrap();
            let start = usize::try_from(parsed["start"].as_u64().unwrap()).unwrap();
            let end = usize::try_from(parsed["end"].as_u64().unwrap()).unwrap();
            for row in &mut grid[start .. end] {
                for cell in row.iter_mut() {
                    cell.clear();
                }
            }
            Response::from_string("{}")
        }
        _ => Response::from_string("unknown endpoint").with_status_code(404),
    }
}

/// Creates an adapter pointed at the local server.
fn adapter(base_url: &str) -> HttpGridStoreAdapter {
    HttpGridStoreAdapter::new(
        HttpGridConfig {
            base_url: base_url.to_string(),
            allow_http: true,
            ..HttpGridConfig::default()
        },
        Arc::new(StaticCredentialProvider::new(TEST_TOKEN)),
    )
    .unwrap()
}

fn row(id: &str, topics: &str) -> Vec<String> {
    vec![
        id.to_string(),
        topics.to_string(),
        "tag".to_string(),
        "facts".to_string(),
        "2026-03-15".to_string(),
        "pending".to_string(),
    ]
}

// ============================================================================
// SECTION: Protocol Round Trips
// ============================================================================

#[test]
fn adapter_drives_the_full_grid_protocol() {
    let (base_url, server) = grid_server(6);
    let adapter = adapter(&base_url);

    adapter.append(&row("1", "alpha")).unwrap();
    adapter.append(&row("2", "beta")).unwrap();
    let rows = adapter.read_all().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][1], "alpha");

    adapter.update_cell(2, 5, "confirmed").unwrap();
    adapter.delete_rows(1, 2).unwrap();
    let rows = adapter.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "2");
    assert_eq!(rows[1][5], "confirmed");

    let final_grid = server.join().unwrap();
    assert_eq!(final_grid.len(), 2);
}

#[test]
fn clear_rows_blanks_cells_without_removing_rows() {
    let (base_url, server) = grid_server(3);
    let adapter = adapter(&base_url);

    adapter.append(&row("1", "alpha")).unwrap();
    adapter.clear_rows(1, 2).unwrap();
    let rows = adapter.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[1].iter().all(String::is_empty));
    drop(server);
}

// ============================================================================
// SECTION: Credential Handling
// ============================================================================

/// Provider that counts retrievals to prove the session cache works.
struct CountingProvider(AtomicUsize);

impl CredentialProvider for CountingProvider {
    fn credentials(&self) -> Result<ServiceToken, AuthError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(ServiceToken::new(TEST_TOKEN))
    }
}

#[test]
fn credential_is_fetched_once_per_session() {
    let (base_url, server) = grid_server(2);
    let provider = Arc::new(CountingProvider(AtomicUsize::new(0)));
    let adapter = HttpGridStoreAdapter::new(
        HttpGridConfig {
            base_url,
            allow_http: true,
            ..HttpGridConfig::default()
        },
        Arc::clone(&provider) as Arc<dyn CredentialProvider>,
    )
    .unwrap();

    adapter.read_all().unwrap();
    adapter.read_all().unwrap();
    assert_eq!(provider.0.load(Ordering::SeqCst), 1);
    drop(server);
}

#[test]
fn rejected_credential_surfaces_as_auth_error() {
    let (base_url, server) = grid_server(1);
    let adapter = HttpGridStoreAdapter::new(
        HttpGridConfig {
            base_url,
            allow_http: true,
            ..HttpGridConfig::default()
        },
        Arc::new(StaticCredentialProvider::new("wrong-token")),
    )
    .unwrap();

    match adapter.read_all() {
        Err(StoreError::Auth(_)) => {}
        other => panic!("expected auth error, got {other:?}"),
    }
    drop(server);
}

#[test]
fn failed_credential_retrieval_never_reaches_the_wire() {
    let adapter = HttpGridStoreAdapter::new(
        HttpGridConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            allow_http: true,
            ..HttpGridConfig::default()
        },
        Arc::new(StaticCredentialProvider::new("")),
    )
    .unwrap();
    match adapter.read_all() {
        Err(StoreError::Auth(_)) => {}
        other => panic!("expected auth error, got {other:?}"),
    }
}
