//! # ConnectionManager - Sous-système de gestion des connexions
//!
//! Listener des actions et requêtes du service ConnectionManager:1.
//!
//! Pour un MediaServer :
//! - **SourceProtocolInfo** : un `http-get:*:<mime>:*` par plug-in de format
//!   enregistré dans le ContentDirectory
//! - **SinkProtocolInfo** : vide (le server ne consomme pas de contenu)
//! - une seule connexion, d'identifiant `0`

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use pmoupnp::actions::{ActionError, ActionRequest, ActionResponse};
use pmoupnp::devices::Device;
use pmoupnp::services::{ActionListener, QueryListener, Service};

use crate::contentdirectory::ContentDirectory;

/// Type UPnP du service.
pub const SERVICE_TYPE: &str = "urn:schemas-upnp-org:service:ConnectionManager:1";

/// SCPD intégré du service.
pub const SCPD: &str = include_str!("scpd.xml");

const DEFAULT_CONNECTION_ID: &str = "0";
const INVALID_CONNECTION_REFERENCE: u32 = 706;

/// Sous-système ConnectionManager.
pub struct ConnectionManager {
    device: Weak<Device>,
    content_directory: Arc<ContentDirectory>,
}

impl ConnectionManager {
    pub fn new(device: Weak<Device>, content_directory: Arc<ContentDirectory>) -> Self {
        Self {
            device,
            content_directory,
        }
    }

    pub fn device(&self) -> Option<Arc<Device>> {
        self.device.upgrade()
    }

    pub fn service(&self) -> Option<Arc<Service>> {
        self.device()?.get_service(SERVICE_TYPE).ok()
    }

    /// Protocoles exportables, séparés par des virgules.
    pub fn source_protocol_info(&self) -> String {
        self.content_directory
            .formats()
            .iter()
            .map(|f| format!("http-get:*:{}:*", f.mime_type()))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn connection_info(&self, request: &ActionRequest) -> Result<ActionResponse, ActionError> {
        let id = request.required_argument("ConnectionID")?;
        if id.trim() != DEFAULT_CONNECTION_ID {
            return Err(ActionError::upnp(
                INVALID_CONNECTION_REFERENCE,
                "Invalid connection reference",
            ));
        }

        Ok(ActionResponse::new()
            .with_argument("RcsID", "-1")
            .with_argument("AVTransportID", "-1")
            .with_argument("ProtocolInfo", "")
            .with_argument("PeerConnectionManager", "")
            .with_argument("PeerConnectionID", "-1")
            .with_argument("Direction", "Output")
            .with_argument("Status", "OK"))
    }
}

#[async_trait]
impl ActionListener for ConnectionManager {
    async fn action_control_received(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionResponse, ActionError> {
        match request.name() {
            "GetProtocolInfo" => Ok(ActionResponse::new()
                .with_argument("Source", self.source_protocol_info())
                .with_argument("Sink", "")),
            "GetCurrentConnectionIDs" => {
                Ok(ActionResponse::new().with_argument("ConnectionIDs", DEFAULT_CONNECTION_ID))
            }
            "GetCurrentConnectionInfo" => self.connection_info(request),
            other => Err(ActionError::InvalidAction(other.to_string())),
        }
    }
}

#[async_trait]
impl QueryListener for ConnectionManager {
    async fn query_control_received(&self, variable: &str) -> Option<String> {
        match variable {
            "SourceProtocolInfo" => Some(self.source_protocol_info()),
            "SinkProtocolInfo" => Some(String::new()),
            "CurrentConnectionIDs" => Some(DEFAULT_CONNECTION_ID.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contentdirectory::Format;
    use std::time::Duration;

    struct Mime(&'static str);

    impl Format for Mime {
        fn mime_type(&self) -> &str {
            self.0
        }

        fn media_class(&self) -> &str {
            "object.item.audioItem.musicTrack"
        }
    }

    fn connection_manager() -> ConnectionManager {
        let cd = Arc::new(ContentDirectory::new(Weak::new(), Duration::ZERO));
        cd.add_plugin(Arc::new(Mime("audio/flac")));
        cd.add_plugin(Arc::new(Mime("audio/mpeg")));
        ConnectionManager::new(Weak::new(), cd)
    }

    #[tokio::test]
    async fn test_protocol_info_lists_formats() {
        let cm = connection_manager();
        let response = cm
            .action_control_received(&ActionRequest::new("GetProtocolInfo"))
            .await
            .unwrap();
        assert_eq!(
            response.argument("Source"),
            Some("http-get:*:audio/flac:*,http-get:*:audio/mpeg:*")
        );
        assert_eq!(response.argument("Sink"), Some(""));
    }

    #[tokio::test]
    async fn test_connection_info() {
        let cm = connection_manager();
        let request = ActionRequest::new("GetCurrentConnectionInfo").with_argument("ConnectionID", "0");
        let response = cm.action_control_received(&request).await.unwrap();
        assert_eq!(response.argument("Direction"), Some("Output"));
        assert_eq!(response.argument("Status"), Some("OK"));

        let request = ActionRequest::new("GetCurrentConnectionInfo").with_argument("ConnectionID", "3");
        let err = cm.action_control_received(&request).await.unwrap_err();
        assert_eq!(err.code(), 706);

        let err = cm
            .action_control_received(&ActionRequest::new("GetCurrentConnectionInfo"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 402);
    }

    #[tokio::test]
    async fn test_queries() {
        let cm = connection_manager();
        assert_eq!(
            cm.query_control_received("CurrentConnectionIDs").await.as_deref(),
            Some("0")
        );
        assert_eq!(cm.query_control_received("SinkProtocolInfo").await.as_deref(), Some(""));
        assert_eq!(cm.query_control_received("A_ARG_TYPE_RcsID").await, None);
    }

    #[test]
    fn test_builtin_scpd_is_valid() {
        let scpd = pmoupnp::services::Scpd::parse(SCPD).unwrap();
        let action = scpd.action("GetCurrentConnectionInfo").unwrap();
        assert_eq!(action.in_arguments().count(), 1);
        assert_eq!(action.out_arguments().count(), 7);
    }
}
