//! Le device MediaServer composé.
//!
//! Un [`MediaServer`] possède sa description ([`Device`]), ses deux
//! sous-systèmes et son routeur. Il n'existe qu'entièrement composé : voir
//! [`MediaServerBuilder`].
//!
//! # Cycle de vie
//!
//! ```text
//! Stopped ──start()──▶ Starting ──▶ Running ──stop()──▶ Stopped
//! ```
//!
//! `start` démarre le ContentDirectory puis le transport ; `stop` arrête le
//! ContentDirectory puis le transport, en tentant toujours les deux étapes.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use pmoconfig::Config;
use pmoupnp::devices::{Device, DeviceError};
use pmoupnp::services::Service;
use pmoupnp::transport::DeviceTransport;
use pmoupnp::{NetworkConfig, UpnpConfigExt};
use tracing::{debug, error, info, warn};

use crate::builder::MediaServerBuilder;
use crate::connectionmanager::ConnectionManager;
use crate::contentdirectory::{ContentDirectory, Directory, Format};
use crate::errors::MediaServerError;
use crate::router::RequestRouter;

/// Type UPnP du device.
pub const DEVICE_TYPE: &str = "urn:schemas-upnp-org:device:MediaServer:1";

/// État du cycle de vie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Starting,
    Running,
}

/// Device MediaServer UPnP.
///
/// # Services liés
///
/// - **ContentDirectory:1** : [`ContentDirectory`]
/// - **ConnectionManager:1** : [`ConnectionManager`]
///
/// # Exemple
///
/// ```rust,no_run
/// use pmomediaserver::MediaServer;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), pmomediaserver::MediaServerError> {
/// let server = MediaServer::new();
/// server.start()?;
/// // ...
/// server.stop();
/// # Ok(())
/// # }
/// ```
pub struct MediaServer {
    device: Arc<Device>,
    content_directory: Arc<ContentDirectory>,
    connection_manager: Arc<ConnectionManager>,
    router: Arc<RequestRouter>,
    transport: Arc<dyn DeviceTransport>,
    network: RwLock<NetworkConfig>,
    state: Mutex<LifecycleState>,
}

impl MediaServer {
    /// Compose le MediaServer à partir de la description et des SCPD intégrés.
    ///
    /// # Panics
    ///
    /// Si la description intégrée ne peut pas être composée : c'est une
    /// constante interne, son échec est un bug.
    pub fn new() -> Self {
        match Self::builder().build() {
            Ok(server) => server,
            Err(e) => {
                error!("❌ Built-in MediaServer description is invalid: {}", e);
                panic!("built-in MediaServer description is invalid: {e}");
            }
        }
    }

    pub fn builder() -> MediaServerBuilder {
        MediaServerBuilder::new()
    }

    /// Compose le MediaServer à partir d'un fichier de description, avec les
    /// SCPD intégrés.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MediaServerError> {
        Self::builder()
            .description_file(path.as_ref())
            .build()
    }

    /// Compose le MediaServer à partir de textes explicites.
    pub fn from_description(
        description: &str,
        content_directory_scpd: &str,
        connection_manager_scpd: &str,
    ) -> Result<Self, MediaServerError> {
        Self::builder()
            .description(description)
            .content_directory_scpd(content_directory_scpd)
            .connection_manager_scpd(connection_manager_scpd)
            .build()
    }

    /// Compose le MediaServer selon la configuration : fichier de
    /// description, interface, port et intervalle de rafraîchissement.
    pub fn from_config(config: &Config) -> Result<Self, MediaServerError> {
        let interval = config.get_content_update_interval().unwrap_or_else(|e| {
            warn!("Invalid content update interval, using default: {}", e);
            crate::contentdirectory::DEFAULT_UPDATE_INTERVAL.as_secs() as usize
        });

        let mut builder = Self::builder()
            .network(config.get_network_config())
            .content_update_interval(Duration::from_secs(interval as u64));
        if let Some(path) = config.get_description_path() {
            builder = builder.description_file(path);
        }
        builder.build()
    }

    pub(crate) fn from_parts(
        device: Arc<Device>,
        content_directory: Arc<ContentDirectory>,
        connection_manager: Arc<ConnectionManager>,
        router: Arc<RequestRouter>,
        transport: Arc<dyn DeviceTransport>,
        network: NetworkConfig,
    ) -> Self {
        Self {
            device,
            content_directory,
            connection_manager,
            router,
            transport,
            network: RwLock::new(network),
            state: Mutex::new(LifecycleState::Stopped),
        }
    }

    // ------------------------------------------------------------------
    // Accès aux composants
    // ------------------------------------------------------------------

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn get_service(&self, service_type: &str) -> Result<Arc<Service>, DeviceError> {
        self.device.get_service(service_type)
    }

    pub fn content_directory(&self) -> &Arc<ContentDirectory> {
        &self.content_directory
    }

    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        &self.connection_manager
    }

    pub fn router(&self) -> &Arc<RequestRouter> {
        &self.router
    }

    // ------------------------------------------------------------------
    // Configuration réseau
    // ------------------------------------------------------------------

    pub fn network(&self) -> NetworkConfig {
        *self.network.read()
    }

    pub fn interface_address(&self) -> IpAddr {
        self.network.read().interface
    }

    pub fn http_port(&self) -> u16 {
        self.network.read().http_port
    }

    /// Change l'interface de publication, prise en compte au prochain `start`.
    ///
    /// # Errors
    ///
    /// [`MediaServerError::Running`] si le serveur n'est pas arrêté.
    pub fn set_interface_address(&self, interface: IpAddr) -> Result<(), MediaServerError> {
        self.update_network(|network| network.interface = interface)
    }

    /// Change le port HTTP, pris en compte au prochain `start`.
    ///
    /// # Errors
    ///
    /// [`MediaServerError::Running`] si le serveur n'est pas arrêté.
    pub fn set_http_port(&self, http_port: u16) -> Result<(), MediaServerError> {
        self.update_network(|network| network.http_port = http_port)
    }

    fn update_network(&self, f: impl FnOnce(&mut NetworkConfig)) -> Result<(), MediaServerError> {
        let state = self.state.lock();
        if *state != LifecycleState::Stopped {
            return Err(MediaServerError::Running);
        }
        f(&mut self.network.write());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Répertoires et formats
    // ------------------------------------------------------------------

    pub fn add_directory(&self, directory: Arc<dyn Directory>) {
        self.content_directory.add_directory(directory);
    }

    pub fn remove_directory(&self, name: &str) -> bool {
        self.content_directory.remove_directory(name)
    }

    pub fn directory_count(&self) -> usize {
        self.content_directory.directory_count()
    }

    pub fn directory(&self, index: usize) -> Option<Arc<dyn Directory>> {
        self.content_directory.directory(index)
    }

    pub fn add_plugin(&self, format: Arc<dyn Format>) -> bool {
        self.content_directory.add_plugin(format)
    }

    // ------------------------------------------------------------------
    // Cycle de vie
    // ------------------------------------------------------------------

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Démarre le ContentDirectory puis le transport.
    ///
    /// Sans effet si le serveur tourne déjà. En cas d'échec, le serveur
    /// reste arrêté.
    pub fn start(&self) -> Result<(), MediaServerError> {
        let mut state = self.state.lock();
        if *state == LifecycleState::Running {
            debug!("MediaServer already running");
            return Ok(());
        }
        *state = LifecycleState::Starting;

        if let Err(e) = self.content_directory.start() {
            error!("❌ Cannot start ContentDirectory: {}", e);
            *state = LifecycleState::Stopped;
            return Err(e.into());
        }

        let network = *self.network.read();
        if let Err(e) = self.transport.start(&network, self.router.clone()) {
            error!(addr = %network.socket_addr(), "❌ Cannot start transport: {}", e);
            self.content_directory.stop();
            *state = LifecycleState::Stopped;
            return Err(e.into());
        }

        *state = LifecycleState::Running;
        info!(
            udn = %self.device.udn(),
            url = %network.base_url(),
            "🚀 MediaServer started"
        );
        Ok(())
    }

    /// Arrête le ContentDirectory puis le transport.
    ///
    /// Les deux étapes sont toujours tentées. Retourne `false` si l'une
    /// d'elles a échoué ; le serveur est arrêté dans tous les cas.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock();

        self.content_directory.stop();
        let stopped = match self.transport.stop() {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ Cannot stop transport: {}", e);
                false
            }
        };

        if *state != LifecycleState::Stopped {
            info!(udn = %self.device.udn(), "🛑 MediaServer stopped");
        }
        *state = LifecycleState::Stopped;
        stopped
    }

    /// Point d'extension pour les tâches périodiques. Sans effet.
    pub fn update(&self) {}
}

impl Default for MediaServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MediaServer {
    fn drop(&mut self) {
        if *self.state.get_mut() != LifecycleState::Stopped {
            self.stop();
        }
    }
}
