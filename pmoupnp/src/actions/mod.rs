//! Requêtes et réponses d'actions UPnP.
//!
//! Le décodage des enveloppes SOAP est fait par la couche transport ; ce
//! module ne manipule que les valeurs déjà extraites :
//!
//! ```text
//! ActionRequest (nom + arguments IN)
//!       ↓
//! ActionListener (lié au service)
//!       ↓
//! ActionResponse (arguments OUT) ou ActionError
//! ```
//!
//! # Exemple
//!
//! ```rust
//! use pmoupnp::actions::{ActionRequest, ActionResponse};
//!
//! let request = ActionRequest::new("Browse")
//!     .with_argument("ObjectID", "0")
//!     .with_argument("BrowseFlag", "BrowseDirectChildren");
//! assert_eq!(request.argument("ObjectID"), Some("0"));
//!
//! let response = ActionResponse::new().with_argument("Id", "3");
//! assert_eq!(response.argument("Id"), Some("3"));
//! ```

mod errors;

pub use errors::ActionError;

/// Invocation d'une action : nom et arguments IN, dans l'ordre reçu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionRequest {
    name: String,
    arguments: Vec<(String, String)>,
}

impl ActionRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[(String, String)] {
        &self.arguments
    }

    /// Valeur d'un argument IN.
    pub fn argument(&self, name: &str) -> Option<&str> {
        find_argument(&self.arguments, name)
    }

    /// Valeur d'un argument IN obligatoire.
    ///
    /// # Errors
    ///
    /// [`ActionError::InvalidArgs`] si l'argument est absent.
    pub fn required_argument(&self, name: &str) -> Result<&str, ActionError> {
        self.argument(name)
            .ok_or_else(|| ActionError::InvalidArgs(format!("missing argument {}", name)))
    }
}

/// Résultat d'une action : arguments OUT, dans l'ordre du SCPD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResponse {
    arguments: Vec<(String, String)>,
}

impl ActionResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }

    pub fn arguments(&self) -> &[(String, String)] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        find_argument(&self.arguments, name)
    }
}

fn find_argument<'a>(arguments: &'a [(String, String)], name: &str) -> Option<&'a str> {
    arguments
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_argument() {
        let request = ActionRequest::new("GetCurrentConnectionInfo").with_argument("ConnectionID", "0");
        assert_eq!(request.required_argument("ConnectionID"), Ok("0"));

        let err = request.required_argument("InstanceID").unwrap_err();
        assert_eq!(err.code(), 402);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ActionError::InvalidAction("Foo".into()).code(), 401);
        assert_eq!(ActionError::ActionFailed("boom".into()).description(), "Action Failed");

        let err = ActionError::upnp(706, "Invalid connection reference");
        assert_eq!(err.code(), 706);
        assert_eq!(err.description(), "Invalid connection reference");
    }

    #[test]
    fn test_arguments_keep_order() {
        let response = ActionResponse::new()
            .with_argument("Source", "a")
            .with_argument("Sink", "");
        let names: Vec<_> = response.arguments().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["Source", "Sink"]);
    }
}
