use thiserror::Error;

use crate::actions::ActionError;

/// Erreurs levées lors de l'invocation d'un service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Aucun listener d'action n'est lié au service
    #[error("Service '{0}' has no action listener")]
    NoActionListener(String),

    /// Aucun listener de requête n'est lié au service
    #[error("Service '{0}' has no query listener")]
    NoQueryListener(String),

    /// Action absente du SCPD du service
    #[error("Action '{action}' is not declared by service '{service}'")]
    UnknownAction { service: String, action: String },

    /// Variable d'état inconnue
    #[error("State variable '{variable}' is not available on service '{service}'")]
    UnknownVariable { service: String, variable: String },

    /// Échec remonté par le listener
    #[error(transparent)]
    Action(#[from] ActionError),
}
