//! # pmoupnp - Modèle de device UPnP
//!
//! Cette crate fournit les briques d'un device UPnP :
//!
//! - [`devices`] : chargement et validation de la description d'un device
//! - [`services`] : services déclarés, documents SCPD et listeners
//! - [`actions`] : requêtes et réponses d'actions, erreurs UPnP
//! - [`handler`] : traitement des requêtes HTTP adressées au device
//! - [`transport`] : abstraction de la publication réseau
//! - [`network`] : interface et port de publication
//!
//! ## Exemple
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pmoupnp::devices::Device;
//! use pmoupnp::handler::DeviceHandler;
//!
//! let device = Arc::new(Device::from_file("description.xml")?);
//! let handler = DeviceHandler::new(device.clone());
//! ```

pub mod actions;
pub mod config_ext;
pub mod devices;
pub mod handler;
pub mod network;
pub mod services;
pub mod transport;
mod xml;

pub use config_ext::UpnpConfigExt;
pub use network::{DEFAULT_HTTP_PORT, NetworkConfig};
pub use xml::UpnpXml;
