//! # pmoserver - Transport HTTP des devices UPnP
//!
//! Cette crate fournit :
//!
//! - [`server`] : [`Server`], implémentation Axum de
//!   [`DeviceTransport`](pmoupnp::transport::DeviceTransport)
//! - [`logs`] : initialisation du logging à partir de la configuration
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pmoserver::Server;
//! use pmoupnp::NetworkConfig;
//! use pmoupnp::devices::Device;
//! use pmoupnp::handler::DeviceHandler;
//! use pmoupnp::transport::DeviceTransport;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let device = Arc::new(Device::from_file("description.xml")?);
//!     let server = Server::new("MyDevice");
//!     server.start(&NetworkConfig::detect(), Arc::new(DeviceHandler::new(device)))?;
//!     tokio::signal::ctrl_c().await?;
//!     server.stop()?;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogControl, init_logging};
pub use server::Server;
