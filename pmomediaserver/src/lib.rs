//! Module MediaServer UPnP.
//!
//! Cette crate compose un MediaServer UPnP conforme à l'architecture UPnP AV
//! à partir d'une description de device et des SCPD de ses services.
//!
//! # Architecture
//!
//! Le MediaServer est composé de deux services obligatoires, chacun lié à un
//! sous-système :
//!
//! - **ContentDirectory** : répertoires de contenu, plug-ins de formats et
//!   export des contenus ([`contentdirectory`])
//! - **ConnectionManager** : protocoles supportés et connexions
//!   ([`connectionmanager`])
//!
//! Les requêtes HTTP passent par un [`RequestRouter`] : les chemins commençant
//! par [`CONTENT_EXPORT_URI`] vont à l'export du ContentDirectory, tout le
//! reste au handler générique du device.
//!
//! # Device UPnP
//!
//! - Type : `urn:schemas-upnp-org:device:MediaServer:1`
//! - Services : ContentDirectory:1, ConnectionManager:1
//!
//! # Utilisation de base
//!
//! ```rust,no_run
//! use pmomediaserver::MediaServer;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let server = MediaServer::new();
//! server.start()?;
//!
//! tokio::signal::ctrl_c().await?;
//! server.stop();
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod connectionmanager;
pub mod contentdirectory;
pub mod device;
mod errors;
pub mod router;

pub use builder::{DESCRIPTION, MediaServerBuilder};
pub use connectionmanager::ConnectionManager;
pub use contentdirectory::{
    CONTENT_EXPORT_URI, ContentDirectory, ContentDirectoryError, Directory, ExportedContent,
    Format,
};
pub use device::{DEVICE_TYPE, LifecycleState, MediaServer};
pub use errors::MediaServerError;
pub use router::{PathMatcher, RequestRouter, Route, RouteTarget};
