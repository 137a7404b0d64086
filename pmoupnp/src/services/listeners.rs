//! Traits des composants qui traitent les invocations d'un service.

use async_trait::async_trait;

use crate::actions::{ActionError, ActionRequest, ActionResponse};

/// Composant qui exécute les actions d'un service.
///
/// Un même composant peut être lié comme listener d'action et de requête ;
/// il est appelé de façon concurrente depuis plusieurs workers HTTP.
#[async_trait]
pub trait ActionListener: Send + Sync {
    async fn action_control_received(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionResponse, ActionError>;
}

/// Composant qui répond aux requêtes de variable d'état (`QueryStateVariable`).
#[async_trait]
pub trait QueryListener: Send + Sync {
    /// Valeur courante de la variable, `None` si le composant ne la connaît pas.
    async fn query_control_received(&self, variable: &str) -> Option<String>;
}
