//! Integration tests for the capture-to-view pipeline
//!
//! Parses a capture JSON document the way the binary does, feeds it
//! through [`AppState`], and checks that navigation, formatting, and
//! pruning behave together.

use flowlens_app::{AppState, BodyTab, Config, ContentEncoding, FormatTag, InputKey};
use flowlens_core::flow::Flow;

const CAPTURE: &str = r#"[
  {
    "kind": "http",
    "id": "http-1",
    "request": {
      "method": "POST",
      "url": "https://api.example.com/v1/items?page=2",
      "timestamp_start": {"seconds": 1700000000, "nanos": 0},
      "content": [123, 34, 110, 34, 58, 49, 125],
      "headers": [["Content-Type", "application/json"]]
    },
    "response": {
      "status_code": 201,
      "timestamp_end": {"seconds": 1700000001, "nanos": 0},
      "content": [123, 34, 111, 107, 34, 58, 116, 114, 117, 101, 125],
      "headers": [["content-type", "application/json; charset=utf-8"]]
    }
  },
  {
    "kind": "dns",
    "id": "dns-1",
    "questions": [{"name": "api.example.com", "record_type": "A"}],
    "request_size": 33,
    "response_size": 49,
    "has_response": true,
    "timestamp_start": {"seconds": 1700000002, "nanos": 0}
  },
  {
    "kind": "tcp",
    "client_addr": "127.0.0.1:50000",
    "server_host": "db.internal",
    "server_port": 5432,
    "timestamp_start": {"seconds": 1700000003, "nanos": 0},
    "messages": [
      {"from_client": true, "content": [1, 2, 3]},
      {"from_client": false, "content": [4, 5, 6, 7]}
    ]
  }
]"#;

fn load_state() -> AppState {
    let flows: Vec<Flow> = serde_json::from_str(CAPTURE).unwrap();
    let mut state = AppState::new(&Config::default());
    state.refresh(flows);
    state
}

#[test]
fn capture_parses_all_flow_kinds() {
    let flows: Vec<Flow> = serde_json::from_str(CAPTURE).unwrap();
    assert_eq!(flows.len(), 3);
    assert_eq!(flows[0].identity(), "http-1");
    assert_eq!(flows[1].identity(), "dns-1");
    // The TCP session carries no id and gets a synthesized one.
    assert!(flows[2].identity().starts_with("tcp:db.internal:5432:"));
}

#[test]
fn navigation_walks_newest_first() {
    let mut state = load_state();
    state.handle_key(&InputKey::Down, false);
    // Default sort is Started descending: the TCP session is newest.
    let focused = state.focused_flow().unwrap();
    assert!(focused.identity().starts_with("tcp:"));

    state.handle_key(&InputKey::Down, false);
    assert_eq!(state.focused_flow().unwrap().identity(), "dns-1");
    state.handle_key(&InputKey::Down, false);
    assert_eq!(state.focused_flow().unwrap().identity(), "http-1");
}

#[test]
fn http_response_body_negotiates_json() {
    let mut state = load_state();
    state.detail = Some("http-1".to_string());
    let body = state.formatted_body().unwrap();
    assert_eq!(body.format, FormatTag::Json);
    assert_eq!(body.encoding, ContentEncoding::Text);
    // Pretty-printed, so the key sits on its own line.
    assert!(body.as_text().unwrap().contains("\"ok\": true"));
}

#[test]
fn request_tab_shows_request_body() {
    let mut state = load_state();
    state.detail = Some("http-1".to_string());
    state.handle_key(&InputKey::Tab, false);
    assert_eq!(state.body_tab, BodyTab::Request);
    let body = state.formatted_body().unwrap();
    assert!(body.as_text().unwrap().contains("\"n\": 1"));
}

#[test]
fn dns_flow_has_sizes_but_no_body() {
    let mut state = load_state();
    state.detail = Some("dns-1".to_string());
    assert!(state.formatted_body().is_none());
    let flow = state.detail_flow().unwrap();
    assert_eq!(flow.record.inbound_bytes(), Some(49));
    assert_eq!(flow.record.outbound_bytes(), Some(33));
}

#[test]
fn tcp_body_follows_direction_tabs() {
    let mut state = load_state();
    let tcp_id = state
        .store
        .list()
        .iter()
        .find(|f| f.identity().starts_with("tcp:"))
        .unwrap()
        .identity();
    state.detail = Some(tcp_id);
    // Sockets have no declared content type; force the byte view.
    state.body_format = FormatTag::Binary;

    // Response tab: server-to-client payload.
    let body = state.formatted_body().unwrap();
    assert_eq!(body.as_bytes(), Some(&[4u8, 5, 6, 7][..]));

    state.handle_key(&InputKey::Tab, false);
    let body = state.formatted_body().unwrap();
    assert_eq!(body.as_bytes(), Some(&[1u8, 2, 3][..]));
}

#[test]
fn text_filter_narrows_visible_rows() {
    let mut state = load_state();
    state.handle_key(&InputKey::Char('/'), false);
    for c in "api.example.com".chars() {
        state.handle_key(&InputKey::Char(c), false);
    }
    state.handle_key(&InputKey::Enter, false);
    // The HTTP URL and the DNS question both mention the host; the
    // TCP session does not.
    let visible = state.table.visible(state.store.list());
    assert_eq!(visible.len(), 2);
}

#[test]
fn navigation_selects_focused_row_for_detail() {
    let mut state = load_state();
    state.handle_key(&InputKey::Down, false);
    state.handle_key(&InputKey::Down, false);
    assert_eq!(state.detail.as_deref(), Some("dns-1"));
}

#[test]
fn delete_selected_removes_flow() {
    let mut state = load_state();
    state.table.selected.insert("http-1".to_string());
    state.handle_key(&InputKey::Char('d'), false);
    assert_eq!(state.store.len(), 2);
    assert!(state.store.get("http-1").is_none());
}

#[test]
fn pinned_flow_survives_prune_and_clear() {
    let mut state = AppState::new(&Config {
        max_flows: 2,
        ..Config::default()
    });
    let flows: Vec<Flow> = serde_json::from_str(CAPTURE).unwrap();
    let mut flows = flows;
    flows[0].pinned = true;
    state.refresh(flows);

    // Prune to 2 kept the pinned HTTP flow.
    assert_eq!(state.store.len(), 2);
    assert!(state.store.get("http-1").is_some());

    state.handle_key(&InputKey::Char('D'), false);
    assert_eq!(state.store.len(), 1);
    assert!(state.store.get("http-1").is_some());
}
