use pmoupnp::devices::DeviceError;
use pmoupnp::transport::TransportError;
use thiserror::Error;

use crate::contentdirectory::ContentDirectoryError;

/// Erreurs de composition et de cycle de vie du MediaServer.
#[derive(Debug, Error)]
pub enum MediaServerError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    ContentDirectory(#[from] ContentDirectoryError),

    #[error("Network configuration cannot change while the server is running")]
    Running,
}
