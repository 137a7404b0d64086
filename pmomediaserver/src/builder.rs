//! Composition du MediaServer.
//!
//! [`MediaServerBuilder::build`] enchaîne :
//!
//! 1. le chargement de la description (fichier, texte, ou description intégrée) ;
//! 2. la création des sous-systèmes ContentDirectory et ConnectionManager,
//!    avec une référence faible vers le device ;
//! 3. le chargement des SCPD et la liaison des sous-systèmes comme
//!    listeners de leurs services ;
//! 4. la construction du routeur de requêtes.
//!
//! Tout est construit localement : en cas d'erreur rien n'est retourné, et
//! aucun device partiellement composé n'est visible.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pmoupnp::NetworkConfig;
use pmoupnp::devices::{Device, DeviceError};
use pmoupnp::handler::{DeviceHandler, RequestHandler};
use pmoupnp::services::{ActionListener, QueryListener};
use pmoupnp::transport::DeviceTransport;
use pmoserver::Server;
use tracing::{debug, error, info};

use crate::connectionmanager::{self, ConnectionManager};
use crate::contentdirectory::{self, CONTENT_EXPORT_URI, ContentDirectory};
use crate::device::MediaServer;
use crate::errors::MediaServerError;
use crate::router::{PathMatcher, RequestRouter};

/// Description intégrée du MediaServer.
pub const DESCRIPTION: &str = include_str!("description.xml");

/// Configuration de la composition d'un [`MediaServer`].
///
/// # Exemple
///
/// ```rust,no_run
/// use pmomediaserver::MediaServer;
/// use pmoupnp::NetworkConfig;
///
/// let server = MediaServer::builder()
///     .description_file("/etc/pmomediaserver/description.xml")
///     .network(NetworkConfig::detect().with_http_port(8080))
///     .build()?;
/// # Ok::<(), pmomediaserver::MediaServerError>(())
/// ```
#[derive(Default)]
pub struct MediaServerBuilder {
    description_file: Option<PathBuf>,
    description: Option<String>,
    content_directory_scpd: Option<String>,
    connection_manager_scpd: Option<String>,
    network: Option<NetworkConfig>,
    transport: Option<Arc<dyn DeviceTransport>>,
    generic_handler: Option<Arc<dyn RequestHandler>>,
    content_update_interval: Option<Duration>,
}

impl MediaServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge la description depuis un fichier.
    pub fn description_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.description_file = Some(path.into());
        self
    }

    /// Utilise une description fournie sous forme de texte.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn content_directory_scpd(mut self, text: impl Into<String>) -> Self {
        self.content_directory_scpd = Some(text.into());
        self
    }

    pub fn connection_manager_scpd(mut self, text: impl Into<String>) -> Self {
        self.connection_manager_scpd = Some(text.into());
        self
    }

    /// Interface et port de publication. Par défaut : [`NetworkConfig::detect`].
    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    /// Couche transport. Par défaut : un [`Server`] HTTP.
    pub fn transport(mut self, transport: Arc<dyn DeviceTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Handler de repli du routeur. Par défaut : un [`DeviceHandler`].
    pub fn generic_handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.generic_handler = Some(handler);
        self
    }

    pub fn content_update_interval(mut self, interval: Duration) -> Self {
        self.content_update_interval = Some(interval);
        self
    }

    /// Compose le MediaServer.
    ///
    /// # Errors
    ///
    /// - [`DeviceError::InvalidDescriptor`] si la description ou un SCPD est
    ///   invalide, ou si un fichier et un texte sont fournis ensemble
    /// - [`DeviceError::ServiceNotFound`] si la description ne déclare pas
    ///   les services ContentDirectory et ConnectionManager
    /// - [`DeviceError::Io`] si le fichier de description est illisible
    pub fn build(self) -> Result<MediaServer, MediaServerError> {
        let device = Arc::new(self.load_device().inspect_err(|e| {
            error!("❌ Cannot load MediaServer description: {}", e);
        })?);

        let update_interval = self
            .content_update_interval
            .unwrap_or(contentdirectory::DEFAULT_UPDATE_INTERVAL);
        let content_directory = Arc::new(ContentDirectory::new(
            Arc::downgrade(&device),
            update_interval,
        ));
        let connection_manager = Arc::new(ConnectionManager::new(
            Arc::downgrade(&device),
            content_directory.clone(),
        ));

        bind_service(
            &device,
            contentdirectory::SERVICE_TYPE,
            self.content_directory_scpd
                .as_deref()
                .unwrap_or(contentdirectory::SCPD),
            content_directory.clone(),
            content_directory.clone(),
        )?;
        bind_service(
            &device,
            connectionmanager::SERVICE_TYPE,
            self.connection_manager_scpd
                .as_deref()
                .unwrap_or(connectionmanager::SCPD),
            connection_manager.clone(),
            connection_manager.clone(),
        )?;

        let generic_handler = self
            .generic_handler
            .unwrap_or_else(|| Arc::new(DeviceHandler::new(device.clone())));
        let router = Arc::new(
            RequestRouter::new(generic_handler).with_route(
                PathMatcher::prefix(CONTENT_EXPORT_URI),
                content_directory.clone(),
            ),
        );

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(Server::new(device.friendly_name())));
        let network = self.network.unwrap_or_else(NetworkConfig::detect);

        info!(
            udn = %device.udn(),
            friendly_name = %device.friendly_name(),
            services = device.services().len(),
            "✅ MediaServer composed"
        );

        Ok(MediaServer::from_parts(
            device,
            content_directory,
            connection_manager,
            router,
            transport,
            network,
        ))
    }

    fn load_device(&self) -> Result<Device, DeviceError> {
        match (&self.description_file, &self.description) {
            (Some(_), Some(_)) => Err(DeviceError::InvalidDescriptor(
                "both a description file and a description text were supplied".to_string(),
            )),
            (Some(path), None) => Device::from_file(path),
            (None, Some(text)) => Device::from_description(text),
            (None, None) => Device::from_description(DESCRIPTION),
        }
    }
}

/// Charge le SCPD du service `service_type` (s'il ne l'est pas déjà) et lui
/// lie ses listeners.
fn bind_service(
    device: &Device,
    service_type: &str,
    scpd: &str,
    action_listener: Arc<dyn ActionListener>,
    query_listener: Arc<dyn QueryListener>,
) -> Result<(), DeviceError> {
    let service = device.get_service(service_type).inspect_err(|_| {
        error!(service = %service_type, "❌ Required service missing from description");
    })?;

    if !service.is_scpd_loaded() {
        service.load_scpd(scpd)?;
    }
    service.set_action_listener(action_listener);
    service.set_query_listener(query_listener);

    debug!(service = %service_type, "🔗 Service bound");
    Ok(())
}
