//! Routage des requêtes entrantes.
//!
//! Le [`RequestRouter`] évalue une liste ordonnée de règles ; la première
//! dont le [`PathMatcher`] accepte le chemin de la requête la traite. Si
//! aucune ne correspond, la requête va au handler de repli (le handler
//! générique du device).

use std::sync::Arc;

use async_trait::async_trait;
use pmoupnp::handler::{Request, RequestHandler, Response};
use tracing::debug;

/// Critère de sélection d'une route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// Le chemin commence par le préfixe donné.
    Prefix(String),
}

impl PathMatcher {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        PathMatcher::Prefix(prefix.into())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// Règle de routage : un critère et le handler associé.
pub struct Route {
    pub matcher: PathMatcher,
    pub handler: Arc<dyn RequestHandler>,
}

/// Décision de routage pour une requête.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Index de la route retenue.
    Route(usize),
    Fallback,
}

/// Routeur à règles ordonnées, première correspondance gagnante.
pub struct RequestRouter {
    routes: Vec<Route>,
    fallback: Arc<dyn RequestHandler>,
}

impl RequestRouter {
    pub fn new(fallback: Arc<dyn RequestHandler>) -> Self {
        Self {
            routes: Vec::new(),
            fallback,
        }
    }

    /// Ajoute une règle, évaluée après les règles existantes.
    pub fn with_route(mut self, matcher: PathMatcher, handler: Arc<dyn RequestHandler>) -> Self {
        self.routes.push(Route { matcher, handler });
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn fallback(&self) -> &Arc<dyn RequestHandler> {
        &self.fallback
    }

    /// Choisit le handler d'une requête sans la traiter.
    pub fn route(&self, request: &Request) -> RouteTarget {
        let path = request.uri().path();
        self.routes
            .iter()
            .position(|route| route.matcher.matches(path))
            .map_or(RouteTarget::Fallback, RouteTarget::Route)
    }
}

#[async_trait]
impl RequestHandler for RequestRouter {
    async fn handle(&self, request: Request) -> Response {
        let target = self.route(&request);
        debug!(uri = %request.uri(), target = ?target, "Routing request");

        let handler = match target {
            RouteTarget::Route(index) => &self.routes[index].handler,
            RouteTarget::Fallback => &self.fallback,
        };
        handler.handle(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::response::IntoResponse;

    struct Tag(&'static str);

    #[async_trait]
    impl RequestHandler for Tag {
        async fn handle(&self, _request: Request) -> Response {
            self.0.into_response()
        }
    }

    fn router() -> RequestRouter {
        RequestRouter::new(Arc::new(Tag("generic")))
            .with_route(PathMatcher::prefix("/ExportContent"), Arc::new(Tag("export")))
            .with_route(PathMatcher::prefix("/Export"), Arc::new(Tag("shadowed")))
    }

    fn request(uri: &str) -> Request {
        axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_first_matching_route_wins() {
        let router = router();
        assert_eq!(router.route(&request("/ExportContent/1")), RouteTarget::Route(0));
        assert_eq!(router.route(&request("/Export/1")), RouteTarget::Route(1));
        assert_eq!(router.route(&request("/description.xml")), RouteTarget::Fallback);
    }

    #[test]
    fn test_query_string_is_ignored_for_matching() {
        let router = router();
        assert_eq!(
            router.route(&request("/ExportContent?id=42")),
            RouteTarget::Route(0)
        );
        assert_eq!(
            router.route(&request("/other?next=/ExportContent")),
            RouteTarget::Fallback
        );
    }

    #[tokio::test]
    async fn test_dispatches_to_selected_handler() {
        let router = router();
        let body = |response: Response| async move {
            to_bytes(response.into_body(), usize::MAX).await.unwrap()
        };

        let response = router.handle(request("/ExportContent/x")).await;
        assert_eq!(&body(response).await[..], b"export");

        let response = router.handle(request("/service/x/desc.xml")).await;
        assert_eq!(&body(response).await[..], b"generic");
    }
}
