use thiserror::Error;

/// Erreur renvoyée par un listener d'action.
///
/// Chaque variante correspond à un code d'erreur UPnP que la couche SOAP
/// placera dans le `<UPnPError>` de la réponse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Invalid Action: {0}")]
    InvalidAction(String),

    #[error("Invalid Args: {0}")]
    InvalidArgs(String),

    #[error("Action Failed: {0}")]
    ActionFailed(String),

    #[error("UPnP error {code}: {description}")]
    Upnp { code: u32, description: String },
}

impl ActionError {
    pub fn upnp(code: u32, description: &str) -> Self {
        ActionError::Upnp {
            code,
            description: description.to_string(),
        }
    }

    /// Code d'erreur UPnP associé.
    pub fn code(&self) -> u32 {
        match self {
            ActionError::InvalidAction(_) => 401,
            ActionError::InvalidArgs(_) => 402,
            ActionError::ActionFailed(_) => 501,
            ActionError::Upnp { code, .. } => *code,
        }
    }

    /// Description courte, telle qu'attendue dans `errorDescription`.
    pub fn description(&self) -> &str {
        match self {
            ActionError::InvalidAction(_) => "Invalid Action",
            ActionError::InvalidArgs(_) => "Invalid Args",
            ActionError::ActionFailed(_) => "Action Failed",
            ActionError::Upnp { description, .. } => description,
        }
    }
}
