//! Module pour les devices UPnP.
//!
//! Ce module fournit le modèle d'un device UPnP tel qu'il est décrit par son
//! document de description (UPnP Device Architecture).
//!
//! # Architecture
//!
//! - [`Device`] : device racine et ses services, dans l'ordre de déclaration
//! - [`DeviceError`](errors::DeviceError) : erreurs de chargement et de recherche
//!
//! # Exemple
//!
//! ```ignore
//! use pmoupnp::devices::Device;
//!
//! let device = Device::from_file("description/description.xml")?;
//! let cds = device.get_service("urn:schemas-upnp-org:service:ContentDirectory:1")?;
//! cds.load_scpd(CONTENT_DIRECTORY_SCPD)?;
//! ```

mod device;
pub mod errors;

pub use device::{DESCRIPTION_ROUTE, Device};
pub use errors::DeviceError;
