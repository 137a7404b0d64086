//! Handlers HTTP d'un device UPnP.
//!
//! La couche transport ne connaît qu'un [`RequestHandler`] : elle lui
//! confie chaque requête entrante et renvoie sa réponse telle quelle.
//! [`DeviceHandler`] est le handler générique d'un device : il sert la
//! description et les SCPD de ses services.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::{debug, error};

use crate::devices::{DESCRIPTION_ROUTE, Device};

pub use axum::extract::Request;
pub use axum::response::Response;

/// Traitement d'une requête HTTP adressée au device.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: Request) -> Response;
}

const XML_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

/// Réponse XML `200 OK`.
pub fn xml_response(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
}

/// Réponse vide avec le statut donné.
pub fn status_response(status: StatusCode) -> Response {
    status.into_response()
}

/// Handler générique d'un device.
///
/// - `GET /description.xml` : description du device
/// - URL SCPD d'un service : document SCPD chargé
/// - URL de contrôle ou d'événements : `501 Not Implemented`
/// - tout le reste : `404 Not Found`
pub struct DeviceHandler {
    device: Arc<Device>,
}

impl DeviceHandler {
    pub fn new(device: Arc<Device>) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    fn description(&self) -> Response {
        match self.device.description_xml() {
            Ok(xml) => xml_response(xml),
            Err(e) => {
                error!(udn = %self.device.udn(), "❌ Cannot serialize description: {}", e);
                status_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[async_trait]
impl RequestHandler for DeviceHandler {
    async fn handle(&self, request: Request) -> Response {
        let path = request.uri().path();
        debug!(method = %request.method(), path, "Device request");

        if path == DESCRIPTION_ROUTE {
            return self.description();
        }

        let Some(service) = self.device.service_for_path(path) else {
            return status_response(StatusCode::NOT_FOUND);
        };

        if service.scpd_url() == path {
            return match service.scpd() {
                Some(scpd) => xml_response(scpd.source().to_string()),
                None => status_response(StatusCode::NOT_FOUND),
            };
        }

        status_response(StatusCode::NOT_IMPLEMENTED)
    }
}
