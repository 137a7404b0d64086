mod common;

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use common::{RecordingTransport, StaticDirectory, server_with};
use pmomediaserver::{LifecycleState, MediaServer, MediaServerError};
use pmoupnp::NetworkConfig;
use pmoupnp::transport::TransportError;

#[tokio::test]
async fn test_start_cascades_content_directory_then_transport() {
    let transport = Arc::new(RecordingTransport::default());
    let server = server_with(transport.clone());

    server.start().unwrap();
    assert_eq!(server.state(), LifecycleState::Running);
    assert!(server.content_directory().is_running());
    assert!(transport.is_running_now());
    assert_eq!(transport.calls(), vec!["start 127.0.0.1:38520"]);

    assert!(server.stop());
    assert_eq!(server.state(), LifecycleState::Stopped);
    assert!(!server.content_directory().is_running());
    assert_eq!(transport.calls(), vec!["start 127.0.0.1:38520", "stop"]);
}

#[tokio::test]
async fn test_double_start_is_idempotent() {
    let transport = Arc::new(RecordingTransport::default());
    let server = server_with(transport.clone());

    server.start().unwrap();
    server.start().unwrap();
    assert_eq!(server.state(), LifecycleState::Running);
    assert_eq!(transport.calls().len(), 1);
}

#[test]
fn test_stop_on_never_started_server() {
    let transport = Arc::new(RecordingTransport::default());
    let server = server_with(transport.clone());

    assert!(server.stop());
    assert!(server.stop());
    assert_eq!(server.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn test_failed_transport_start_leaves_server_stopped() {
    let transport = Arc::new(RecordingTransport::failing_start());
    let server = server_with(transport.clone());

    let err = server.start().unwrap_err();
    assert!(matches!(
        err,
        MediaServerError::Transport(TransportError::Bind { .. })
    ));
    assert_eq!(server.state(), LifecycleState::Stopped);
    assert!(!server.content_directory().is_running());
}

#[test]
fn test_failed_content_directory_start_skips_transport() {
    let transport = Arc::new(RecordingTransport::default());
    let server = MediaServer::builder()
        .transport(transport.clone())
        .network(NetworkConfig::default())
        .content_update_interval(Duration::from_secs(1))
        .build()
        .unwrap();

    // Hors runtime tokio, la tâche de rafraîchissement ne peut pas démarrer.
    let err = server.start().unwrap_err();
    assert!(matches!(err, MediaServerError::ContentDirectory(_)));
    assert_eq!(server.state(), LifecycleState::Stopped);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_stop_attempts_both_steps_when_transport_fails() {
    let transport = Arc::new(RecordingTransport::failing_stop());
    let server = server_with(transport.clone());

    server.start().unwrap();
    assert!(!server.stop());
    assert_eq!(server.state(), LifecycleState::Stopped);
    assert!(!server.content_directory().is_running());
    assert_eq!(transport.calls().last().map(String::as_str), Some("stop"));
}

#[tokio::test]
async fn test_drop_stops_running_server() {
    let transport = Arc::new(RecordingTransport::default());
    let server = server_with(transport.clone());
    server.start().unwrap();

    drop(server);
    assert!(!transport.is_running_now());
    assert_eq!(transport.calls().last().map(String::as_str), Some("stop"));
}

#[tokio::test]
async fn test_network_changes_only_while_stopped() {
    let transport = Arc::new(RecordingTransport::default());
    let server = server_with(transport.clone());
    let lan = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 2));

    server.set_interface_address(lan).unwrap();
    server.set_http_port(40000).unwrap();
    server.start().unwrap();
    assert_eq!(transport.calls(), vec!["start 192.168.0.2:40000"]);

    assert!(matches!(
        server.set_http_port(1),
        Err(MediaServerError::Running)
    ));
    assert_eq!(server.http_port(), 40000);
    assert_eq!(server.interface_address(), lan);
}

#[test]
fn test_directory_facade() {
    let server = server_with(Arc::new(RecordingTransport::default()));

    server.add_directory(Arc::new(StaticDirectory { name: "library" }));
    assert_eq!(server.directory_count(), 1);
    assert_eq!(server.directory(0).unwrap().name(), "library");

    assert!(!server.remove_directory("unknown"));
    assert_eq!(server.directory_count(), 1);

    assert!(server.remove_directory("library"));
    assert_eq!(server.directory_count(), 0);
    assert!(server.directory(0).is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_restart_on_same_port_with_http_server() {
    let port = {
        let free = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        free.local_addr().unwrap().port()
    };
    let server = MediaServer::builder()
        .network(NetworkConfig::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port))
        .content_update_interval(Duration::ZERO)
        .build()
        .unwrap();

    server.start().unwrap();
    assert!(std::net::TcpStream::connect(("127.0.0.1", port)).is_ok());

    assert!(server.stop());
    assert_eq!(server.state(), LifecycleState::Stopped);
    assert!(std::net::TcpStream::connect(("127.0.0.1", port)).is_err());

    server.start().unwrap();
    assert_eq!(server.state(), LifecycleState::Running);
    assert!(std::net::TcpStream::connect(("127.0.0.1", port)).is_ok());
    assert!(server.stop());
}
