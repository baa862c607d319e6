//! Construction and transport-swap behaviour of `TaskTracker`.
//!
//! No server is involved: construction must not touch the network, and a
//! swapped-in stub transport records what the client sends.

use std::any::Any;
use std::sync::{Arc, Mutex};

use task_tracker_core::{
    default_client, default_transport_config, new_http_client, new_http_client_with_config,
    ClientTransport, FormatRegistry, HttpRequest, HttpResponse, HttpTransport, TaskTracker,
    TransportConfig, TransportError,
};

#[derive(Debug, Default)]
struct StubTransport {
    seen: Mutex<Vec<String>>,
}

impl ClientTransport for StubTransport {
    fn submit(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request.path);
        Ok(HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn built_config(client: &TaskTracker) -> TransportConfig {
    client
        .transport()
        .as_any()
        .downcast_ref::<HttpTransport>()
        .expect("factory builds an HttpTransport")
        .config()
}

#[test]
fn default_client_targets_localhost_api() {
    let client = default_client();
    let config = built_config(&client);
    assert_eq!(config.host, "localhost:8322");
    assert_eq!(config.base_path, "/api");
    assert_eq!(config.schemes, vec!["http", "https"]);
}

#[test]
fn new_http_client_uses_defaults() {
    let client = new_http_client(None);
    assert_eq!(built_config(&client), default_transport_config());
}

#[test]
fn explicit_config_is_used_verbatim() {
    let mut config = TransportConfig::default();
    config
        .with_host("example.com")
        .with_base_path("/v2")
        .with_schemes(["https"]);
    let custom = Arc::new(FormatRegistry::with_builtins());
    let client = new_http_client_with_config(Some(Arc::clone(&custom)), Some(config.clone()));

    assert_eq!(built_config(&client), config);
    assert!(Arc::ptr_eq(client.tasks.formats(), &custom));
}

#[test]
fn partial_config_is_not_defaulted() {
    let mut config = TransportConfig::default();
    config.with_base_path("/v3");
    let client = new_http_client_with_config(None, Some(config));
    let built = built_config(&client);
    assert_eq!(built.host, "");
    assert_eq!(built.base_path, "/v3");
    assert!(built.schemes.is_empty());
}

#[test]
fn construction_without_registry_uses_global() {
    let client = new_http_client_with_config(None, None);
    assert!(Arc::ptr_eq(client.tasks.formats(), &FormatRegistry::global()));
}

#[test]
fn set_transport_propagates_identity_to_sub_resources() {
    let mut client = new_http_client(None);
    let stub: Arc<dyn ClientTransport> = Arc::new(StubTransport::default());

    client.set_transport(Arc::clone(&stub));

    assert!(Arc::ptr_eq(client.transport(), &stub));
    assert!(Arc::ptr_eq(client.tasks.transport(), &stub));
}

#[test]
fn operations_after_swap_reach_the_new_transport() {
    let stub = Arc::new(StubTransport::default());
    let mut client = default_client();
    client.set_transport(stub.clone());

    client.tasks.delete_task(11).unwrap();

    assert_eq!(*stub.seen.lock().unwrap(), vec!["/tasks/11".to_string()]);
}

#[test]
fn client_built_around_stub_transport() {
    let stub: Arc<dyn ClientTransport> = Arc::new(StubTransport::default());
    let mut client = TaskTracker::new(Arc::clone(&stub), None);
    assert!(Arc::ptr_eq(client.tasks.transport(), &stub));

    let replacement: Arc<dyn ClientTransport> = Arc::new(StubTransport::default());
    client.set_transport(Arc::clone(&replacement));
    assert!(Arc::ptr_eq(client.tasks.transport(), &replacement));
    assert!(!Arc::ptr_eq(client.tasks.transport(), &stub));
}

#[test]
fn clients_do_not_share_transports() {
    let a = default_client();
    let b = default_client();
    assert!(!Arc::ptr_eq(a.transport(), b.transport()));
}
