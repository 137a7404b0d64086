//! # ContentDirectory - Sous-système de gestion du contenu
//!
//! Ce module implémente le sous-système lié au service ContentDirectory:1 du
//! MediaServer. Il est à la fois :
//!
//! - l'[`ActionListener`] et le [`QueryListener`] du service ;
//! - le registre des [`Directory`] (répertoires nommés) et des [`Format`]
//!   (plug-ins de formats, clés par type MIME) ;
//! - le handler d'export des contenus sur [`CONTENT_EXPORT_URI`].
//!
//! ## Actions
//!
//! - ✅ GetSearchCapabilities
//! - ✅ GetSortCapabilities
//! - ✅ GetSystemUpdateID
//!
//! ## Cycle de vie
//!
//! [`ContentDirectory::start`] lance une tâche tokio qui rafraîchit
//! périodiquement les répertoires ; [`ContentDirectory::stop`] l'arrête.
//! Tant que le sous-système est arrêté, l'export répond `503`.

mod directory;
mod errors;
mod export;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use pmoupnp::actions::{ActionError, ActionRequest, ActionResponse};
use pmoupnp::devices::Device;
use pmoupnp::services::{ActionListener, QueryListener, Service};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub use directory::{Directory, ExportedContent, Format};
pub use errors::ContentDirectoryError;

/// Type UPnP du service.
pub const SERVICE_TYPE: &str = "urn:schemas-upnp-org:service:ContentDirectory:1";

/// Préfixe des URLs d'export de contenu.
pub const CONTENT_EXPORT_URI: &str = "/ExportContent";

/// SCPD intégré du service.
pub const SCPD: &str = include_str!("scpd.xml");

/// Intervalle de rafraîchissement par défaut des répertoires.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

type Directories = Arc<RwLock<Vec<Arc<dyn Directory>>>>;

#[derive(Default)]
struct RunState {
    running: bool,
    refresh_task: Option<JoinHandle<()>>,
}

/// Sous-système ContentDirectory.
pub struct ContentDirectory {
    device: Weak<Device>,
    directories: Directories,
    formats: RwLock<Vec<Arc<dyn Format>>>,
    system_update_id: Arc<AtomicU32>,
    update_interval: Duration,
    run_state: Mutex<RunState>,
}

impl ContentDirectory {
    /// Crée le sous-système.
    ///
    /// `device` est une référence non propriétaire : le sous-système ne
    /// prolonge jamais la vie du device. Un intervalle nul désactive le
    /// rafraîchissement périodique.
    pub fn new(device: Weak<Device>, update_interval: Duration) -> Self {
        Self {
            device,
            directories: Arc::new(RwLock::new(Vec::new())),
            formats: RwLock::new(Vec::new()),
            system_update_id: Arc::new(AtomicU32::new(0)),
            update_interval,
            run_state: Mutex::new(RunState::default()),
        }
    }

    /// Device propriétaire, s'il existe encore.
    pub fn device(&self) -> Option<Arc<Device>> {
        self.device.upgrade()
    }

    /// Service ContentDirectory du device propriétaire.
    pub fn service(&self) -> Option<Arc<Service>> {
        self.device()?.get_service(SERVICE_TYPE).ok()
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn system_update_id(&self) -> u32 {
        self.system_update_id.load(Ordering::SeqCst)
    }

    fn bump_system_update_id(&self) {
        self.system_update_id.fetch_add(1, Ordering::SeqCst);
    }

    // ------------------------------------------------------------------
    // Répertoires
    // ------------------------------------------------------------------

    /// Enregistre un répertoire. Un répertoire de même nom est remplacé.
    pub fn add_directory(&self, directory: Arc<dyn Directory>) {
        let mut directories = self.directories.write();
        match directories.iter().position(|d| d.name() == directory.name()) {
            Some(index) => {
                debug!(name = %directory.name(), "Replacing content directory");
                directories[index] = directory;
            }
            None => {
                info!(name = %directory.name(), "📁 Content directory added");
                directories.push(directory);
            }
        }
        drop(directories);
        self.bump_system_update_id();
    }

    /// Retire un répertoire par son nom.
    ///
    /// Retourne `false` (sans erreur) si aucun répertoire ne porte ce nom.
    pub fn remove_directory(&self, name: &str) -> bool {
        let mut directories = self.directories.write();
        let before = directories.len();
        directories.retain(|d| d.name() != name);
        let removed = directories.len() != before;
        drop(directories);

        if removed {
            info!(name = %name, "Content directory removed");
            self.bump_system_update_id();
        }
        removed
    }

    pub fn directory_count(&self) -> usize {
        self.directories.read().len()
    }

    /// Répertoire à la position `index`, dans l'ordre d'enregistrement.
    pub fn directory(&self, index: usize) -> Option<Arc<dyn Directory>> {
        self.directories.read().get(index).cloned()
    }

    /// Répertoire par son nom.
    pub fn directory_by_name(&self, name: &str) -> Option<Arc<dyn Directory>> {
        self.directories
            .read()
            .iter()
            .find(|d| d.name() == name)
            .cloned()
    }

    /// Résout un identifiant de contenu via le premier répertoire qui le connaît.
    pub async fn resolve(&self, id: &str) -> Option<ExportedContent> {
        let snapshot = self.directories.read().clone();
        for directory in snapshot {
            if let Some(content) = directory.content(id).await {
                return Some(content);
            }
        }
        None
    }

    /// Rafraîchit tous les répertoires.
    ///
    /// Retourne `true` si au moins un répertoire a changé ; le
    /// `SystemUpdateID` est alors incrémenté.
    pub async fn refresh(&self) -> bool {
        refresh_directories(&self.directories, &self.system_update_id).await
    }

    // ------------------------------------------------------------------
    // Formats
    // ------------------------------------------------------------------

    /// Enregistre un plug-in de format.
    ///
    /// Retourne `false` si un plug-in du même type MIME est déjà enregistré.
    pub fn add_plugin(&self, format: Arc<dyn Format>) -> bool {
        let mut formats = self.formats.write();
        if formats.iter().any(|f| f.mime_type() == format.mime_type()) {
            debug!(mime = %format.mime_type(), "Format plug-in already registered");
            return false;
        }
        info!(mime = %format.mime_type(), class = %format.media_class(), "🔌 Format plug-in added");
        formats.push(format);
        true
    }

    pub fn formats(&self) -> Vec<Arc<dyn Format>> {
        self.formats.read().clone()
    }

    // ------------------------------------------------------------------
    // Cycle de vie
    // ------------------------------------------------------------------

    /// Démarre le sous-système. Sans effet s'il tourne déjà.
    ///
    /// # Errors
    ///
    /// [`ContentDirectoryError::NoRuntime`] si un rafraîchissement périodique
    /// est demandé hors d'un runtime tokio.
    pub fn start(&self) -> Result<(), ContentDirectoryError> {
        let mut state = self.run_state.lock();
        if state.running {
            return Ok(());
        }

        if !self.update_interval.is_zero() {
            let runtime = Handle::try_current().map_err(|_| ContentDirectoryError::NoRuntime)?;
            let directories = self.directories.clone();
            let system_update_id = self.system_update_id.clone();
            let period = self.update_interval;

            state.refresh_task = Some(runtime.spawn(refresh_loop(
                directories,
                system_update_id,
                period,
            )));
        }

        state.running = true;
        info!(interval = ?self.update_interval, "▶️ ContentDirectory started");
        Ok(())
    }

    /// Arrête le sous-système. Sans effet s'il est déjà arrêté.
    pub fn stop(&self) {
        let mut state = self.run_state.lock();
        if let Some(task) = state.refresh_task.take() {
            task.abort();
        }
        if std::mem::take(&mut state.running) {
            info!("⏹️ ContentDirectory stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state.lock().running
    }
}

impl Drop for ContentDirectory {
    fn drop(&mut self) {
        if let Some(task) = self.run_state.get_mut().refresh_task.take() {
            task.abort();
        }
    }
}

async fn refresh_loop(directories: Directories, system_update_id: Arc<AtomicU32>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // Le premier tick est immédiat.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        refresh_directories(&directories, &system_update_id).await;
    }
}

async fn refresh_directories(directories: &Directories, system_update_id: &AtomicU32) -> bool {
    let snapshot = directories.read().clone();
    let mut changed = false;
    for directory in snapshot {
        if directory.refresh().await {
            debug!(name = %directory.name(), "Content directory changed");
            changed = true;
        }
    }
    if changed {
        system_update_id.fetch_add(1, Ordering::SeqCst);
    }
    changed
}

#[async_trait]
impl ActionListener for ContentDirectory {
    async fn action_control_received(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionResponse, ActionError> {
        match request.name() {
            "GetSystemUpdateID" => {
                Ok(ActionResponse::new().with_argument("Id", self.system_update_id().to_string()))
            }
            "GetSearchCapabilities" => Ok(ActionResponse::new().with_argument("SearchCaps", "")),
            "GetSortCapabilities" => Ok(ActionResponse::new().with_argument("SortCaps", "")),
            other => Err(ActionError::InvalidAction(other.to_string())),
        }
    }
}

#[async_trait]
impl QueryListener for ContentDirectory {
    async fn query_control_received(&self, variable: &str) -> Option<String> {
        match variable {
            "SystemUpdateID" => Some(self.system_update_id().to_string()),
            "SearchCapabilities" | "SortCapabilities" => Some(String::new()),
            _ => None,
        }
    }
}
