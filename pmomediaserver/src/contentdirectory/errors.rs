use thiserror::Error;

/// Erreurs du sous-système ContentDirectory.
#[derive(Debug, Error)]
pub enum ContentDirectoryError {
    #[error("No tokio runtime available to run the content refresh task")]
    NoRuntime,
}
