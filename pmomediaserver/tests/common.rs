#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::response::IntoResponse;
use parking_lot::Mutex;
use pmomediaserver::{Directory, ExportedContent, MediaServer};
use pmoupnp::NetworkConfig;
use pmoupnp::handler::{Request, RequestHandler, Response};
use pmoupnp::transport::{DeviceTransport, TransportError};

/// Transport qui enregistre les appels au lieu d'ouvrir un socket.
#[derive(Default)]
pub struct RecordingTransport {
    pub calls: Mutex<Vec<String>>,
    pub running: Mutex<bool>,
    pub fail_start: bool,
    pub fail_stop: bool,
}

impl RecordingTransport {
    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Default::default()
        }
    }

    pub fn failing_stop() -> Self {
        Self {
            fail_stop: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn is_running_now(&self) -> bool {
        *self.running.lock()
    }
}

impl DeviceTransport for RecordingTransport {
    fn start(
        &self,
        network: &NetworkConfig,
        _handler: Arc<dyn RequestHandler>,
    ) -> Result<(), TransportError> {
        self.calls.lock().push(format!("start {}", network.socket_addr()));
        if self.fail_start {
            return Err(TransportError::Bind {
                addr: network.socket_addr(),
                source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
            });
        }
        *self.running.lock() = true;
        Ok(())
    }

    fn stop(&self) -> Result<(), TransportError> {
        self.calls.lock().push("stop".to_string());
        *self.running.lock() = false;
        if self.fail_stop {
            return Err(TransportError::NoRuntime);
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        *self.running.lock()
    }
}

/// Handler qui répond par son étiquette.
pub struct Tag(pub &'static str);

#[async_trait]
impl RequestHandler for Tag {
    async fn handle(&self, _request: Request) -> Response {
        self.0.into_response()
    }
}

pub struct StaticDirectory {
    pub name: &'static str,
}

#[async_trait]
impl Directory for StaticDirectory {
    fn name(&self) -> &str {
        self.name
    }

    async fn content(&self, id: &str) -> Option<ExportedContent> {
        (id == "track-1").then(|| ExportedContent::new("audio/flac", vec![0x66, 0x4c, 0x61, 0x43]))
    }
}

pub fn request(uri: &str) -> Request {
    axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn server_with(transport: Arc<RecordingTransport>) -> MediaServer {
    MediaServer::builder()
        .transport(transport)
        .network(NetworkConfig::default())
        .build()
        .unwrap()
}

pub const DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaServer:1</deviceType>
    <friendlyName>Test Server</friendlyName>
    <UDN>uuid:00000000-0000-0000-0000-000000000001</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:ContentDirectory:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:ContentDirectory</serviceId>
      </service>
      <service>
        <serviceType>urn:schemas-upnp-org:service:ConnectionManager:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:ConnectionManager</serviceId>
      </service>
      <service>
        <serviceType>urn:schemas-upnp-org:service:X_Extra:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:X_Extra</serviceId>
      </service>
    </serviceList>
  </device>
</root>"#;
