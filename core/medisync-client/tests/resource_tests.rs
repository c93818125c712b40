use std::sync::Arc;
use std::time::Duration;

use medisync_client::{
    BlobApiClient, ClientConfig, MemoryBackend, RemoteBackend, SyncOptions, SyncTarget,
    SyncedResource,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    text: String,
}

fn note(text: &str) -> Note {
    Note {
        text: text.to_string(),
    }
}

fn remote_resource(server: &MockServer, options: SyncOptions) -> SyncedResource<Note> {
    let config = ClientConfig {
        api_base: server.uri(),
        origin: None,
    };
    let backend = RemoteBackend::new(
        BlobApiClient::new(config),
        SyncTarget::new("meals", "today"),
    );
    SyncedResource::new(Arc::new(backend), options)
}

// ── update ──────────────────────────────────────────────────────

#[tokio::test]
async fn update_sets_value_and_dirty_flag() {
    let resource: SyncedResource<Note> =
        SyncedResource::new(Arc::new(MemoryBackend::new()), SyncOptions::default());

    assert!(!resource.has_data());
    resource.update(note("take with food"));

    assert_eq!(resource.value(), Some(note("take with food")));
    assert!(resource.is_dirty());
}

#[tokio::test]
async fn updates_apply_in_call_order() {
    let resource: SyncedResource<Note> =
        SyncedResource::new(Arc::new(MemoryBackend::new()), SyncOptions::default());

    resource.update(note("a"));
    resource.update(note("b"));
    resource.update(note("c"));
    assert_eq!(resource.value(), Some(note("c")));
}

// ── save ────────────────────────────────────────────────────────

#[tokio::test]
async fn save_without_value_returns_false_and_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    assert!(!resource.save().await);
    assert!(resource.error().is_none());
}

#[tokio::test]
async fn save_posts_current_value_and_clears_dirty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blobs/meals/today/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    resource.update(note("lunch at noon"));
    assert!(resource.is_dirty());

    assert!(resource.save().await);
    assert!(!resource.is_dirty());

    let requests = server.received_requests().await.unwrap();
    let sent: Note = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent, note("lunch at noon"));
}

#[tokio::test]
async fn save_with_replaces_value_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blobs/meals/today/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    assert!(resource.save_with(note("explicit")).await);
    assert_eq!(resource.value(), Some(note("explicit")));
    assert!(!resource.is_dirty());
}

#[tokio::test]
async fn save_failure_sets_error_and_keeps_dirty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blobs/meals/today/set"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "disk full"})),
        )
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    resource.update(note("unsaved"));

    assert!(!resource.save().await);
    assert!(resource.is_dirty());
    assert_eq!(resource.error(), Some("disk full".to_string()));
    assert!(!resource.is_online());
    assert!(!resource.is_loading());
}

// ── load ────────────────────────────────────────────────────────

#[tokio::test]
async fn load_replaces_value_and_clears_dirty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blobs/meals/today/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "remote"})))
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    resource.update(note("local edit"));

    let loaded = resource.load().await;
    assert_eq!(loaded, Some(note("remote")));
    assert_eq!(resource.value(), Some(note("remote")));
    assert!(!resource.is_dirty());
    assert!(resource.is_online());
}

#[tokio::test]
async fn load_of_null_slot_yields_none_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blobs/meals/today/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    assert_eq!(resource.load().await, None);
    assert!(resource.error().is_none());
    assert!(!resource.has_data());
}

#[tokio::test]
async fn load_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blobs/meals/today/get"))
        .respond_with(
            ResponseTemplate::new(502).set_body_json(json!({"error": "upstream gone"})),
        )
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    assert_eq!(resource.load().await, None);
    assert_eq!(resource.error(), Some("upstream gone".to_string()));
    assert!(!resource.is_loading());
}

#[tokio::test]
async fn load_failure_without_error_body_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blobs/meals/today/get"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    assert_eq!(resource.load().await, None);
    assert_eq!(resource.error(), Some("Failed to load data".to_string()));
}

// ── remove ──────────────────────────────────────────────────────

#[tokio::test]
async fn remove_clears_value_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/blobs/meals/today/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    resource.update(note("to be removed"));

    assert!(resource.remove().await);
    assert!(!resource.has_data());
    assert!(!resource.is_dirty());
}

#[tokio::test]
async fn remove_failure_keeps_value() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/blobs/meals/today/delete"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    resource.update(note("sticky"));

    assert!(!resource.remove().await);
    assert_eq!(resource.value(), Some(note("sticky")));
    assert_eq!(resource.error(), Some("nope".to_string()));
}

// ── debounced autosave ──────────────────────────────────────────

#[tokio::test]
async fn rapid_updates_coalesce_into_one_save_with_last_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blobs/meals/today/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let options = SyncOptions {
        auto_sync: true,
        debounce_ms: 500,
    };
    let resource = remote_resource(&server, options);

    resource.update(note("a"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    resource.update(note("b"));

    // Well past the debounce window measured from the second update.
    tokio::time::sleep(Duration::from_millis(900)).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Note = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent, note("b"));
    assert!(!resource.is_dirty());
}

#[tokio::test]
async fn no_save_fires_before_the_window_elapses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let options = SyncOptions {
        auto_sync: true,
        debounce_ms: 500,
    };
    let resource = remote_resource(&server, options);

    resource.update(note("early"));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(resource.is_dirty());
}

#[tokio::test]
async fn autosync_disabled_never_saves_on_update() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resource = remote_resource(&server, SyncOptions::default());
    resource.update(note("manual only"));
    tokio::time::sleep(Duration::from_millis(700)).await;
}

#[tokio::test]
async fn dropping_the_resource_cancels_the_pending_save() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let options = SyncOptions {
        auto_sync: true,
        debounce_ms: 300,
    };
    let resource = remote_resource(&server, options);
    resource.update(note("never sent"));
    drop(resource);

    tokio::time::sleep(Duration::from_millis(600)).await;
    // expect(0) is verified when the server drops.
}

#[tokio::test]
async fn clones_share_state_and_debounce_timer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blobs/meals/today/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let options = SyncOptions {
        auto_sync: true,
        debounce_ms: 300,
    };
    let resource = remote_resource(&server, options);
    let clone = resource.clone();

    resource.update(note("from original"));
    clone.update(note("from clone"));
    assert_eq!(resource.value(), Some(note("from clone")));

    tokio::time::sleep(Duration::from_millis(700)).await;
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
