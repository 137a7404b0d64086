//! Erreurs relatives aux devices UPnP.

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs liées à la composition d'un device UPnP.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Document de description ou SCPD mal formé, ou élément obligatoire absent
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Aucun service de ce type n'est déclaré par le device
    #[error("Service '{0}' not found in device")]
    ServiceNotFound(String),

    /// Fichier de description illisible
    #[error("Cannot read descriptor file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Échec de sérialisation de la description
    #[error("Failed to serialize description: {0}")]
    Serialization(String),
}
