//! Couche transport d'un device.
//!
//! Le transport publie le device sur le réseau : il écoute sur l'adresse
//! d'une [`NetworkConfig`] et confie chaque requête au handler fourni au
//! démarrage. L'implémentation HTTP est fournie par `pmoserver`.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::handler::RequestHandler;
use crate::network::NetworkConfig;

/// Erreurs de la couche transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport already running")]
    AlreadyRunning,

    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("No tokio runtime available to run the transport")]
    NoRuntime,
}

/// Publication réseau d'un device.
///
/// `start` et `stop` sont synchrones : l'arrêt doit pouvoir être déclenché
/// depuis un `Drop`.
pub trait DeviceTransport: Send + Sync {
    /// Commence à servir `handler` sur l'adresse de `network`.
    ///
    /// # Errors
    ///
    /// [`TransportError::AlreadyRunning`] si le transport est déjà démarré,
    /// [`TransportError::Bind`] si l'adresse n'est pas disponible.
    fn start(
        &self,
        network: &NetworkConfig,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), TransportError>;

    /// Arrête de servir. Sans effet si le transport n'est pas démarré.
    fn stop(&self) -> Result<(), TransportError>;

    fn is_running(&self) -> bool;
}
