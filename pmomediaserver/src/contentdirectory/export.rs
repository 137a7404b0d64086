//! Export de contenu sur `CONTENT_EXPORT_URI`.
//!
//! `GET /ExportContent?id=<id>` interroge les répertoires dans l'ordre
//! d'enregistrement ; le premier qui résout l'identifiant fournit la réponse.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Query;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use pmoupnp::handler::{Request, RequestHandler, Response};
use tracing::{debug, warn};

use super::ContentDirectory;

#[async_trait]
impl RequestHandler for ContentDirectory {
    async fn handle(&self, request: Request) -> Response {
        if !self.is_running() {
            warn!(uri = %request.uri(), "Export request while content directory is stopped");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }

        let id = Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(params)| params.get("id").cloned());
        let Some(id) = id else {
            return (StatusCode::BAD_REQUEST, "missing content id").into_response();
        };

        debug!(id = %id, "📤 Exporting content");
        match self.resolve(&id).await {
            Some(content) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content.mime_type)],
                Body::from(content.data),
            )
                .into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }
}
