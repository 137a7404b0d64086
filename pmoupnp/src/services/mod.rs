//! Services UPnP d'un device.
//!
//! Un [`Service`] est créé lors du chargement de la description du device.
//! Il porte :
//!
//! - son identité (`serviceType`, `serviceId`) et ses URLs ;
//! - son document SCPD, chargé séparément via [`Service::load_scpd`] ;
//! - au plus un [`ActionListener`] et un [`QueryListener`].
//!
//! Tant qu'aucun listener n'est lié, toute invocation est rejetée.

mod errors;
mod listeners;
mod scpd;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};
use xmltree::Element;

use crate::actions::{ActionRequest, ActionResponse};
use crate::devices::errors::DeviceError;
use crate::xml::{UpnpXml, push_text_child};

pub use errors::ServiceError;
pub use listeners::{ActionListener, QueryListener};
pub use scpd::{ArgumentDirection, Scpd, ScpdAction, ScpdArgument, ScpdStateVariable};

/// Service déclaré dans la description d'un device.
pub struct Service {
    service_type: String,
    service_id: String,
    scpd_url: String,
    control_url: String,
    event_sub_url: String,
    scpd: RwLock<Option<Arc<Scpd>>>,
    action_listener: RwLock<Option<Arc<dyn ActionListener>>>,
    query_listener: RwLock<Option<Arc<dyn QueryListener>>>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("service_type", &self.service_type)
            .field("service_id", &self.service_id)
            .field("scpd_url", &self.scpd_url)
            .field("scpd_loaded", &self.is_scpd_loaded())
            .field("action_listener", &self.action_listener.read().is_some())
            .field("query_listener", &self.query_listener.read().is_some())
            .finish()
    }
}

impl Service {
    /// Crée un service avec les URLs par défaut :
    /// `/service/{id}/desc.xml`, `/service/{id}/control`, `/service/{id}/event`,
    /// où `{id}` est le dernier segment du `serviceId`.
    pub fn new(service_type: impl Into<String>, service_id: impl Into<String>) -> Self {
        let service_id = service_id.into();
        let base = format!("/service/{}", short_id(&service_id));

        Self {
            service_type: service_type.into(),
            scpd_url: format!("{}/desc.xml", base),
            control_url: format!("{}/control", base),
            event_sub_url: format!("{}/event", base),
            service_id,
            scpd: RwLock::new(None),
            action_listener: RwLock::new(None),
            query_listener: RwLock::new(None),
        }
    }

    pub(crate) fn set_urls(
        &mut self,
        scpd_url: Option<String>,
        control_url: Option<String>,
        event_sub_url: Option<String>,
    ) {
        if let Some(url) = scpd_url {
            self.scpd_url = absolute_path(url);
        }
        if let Some(url) = control_url {
            self.control_url = absolute_path(url);
        }
        if let Some(url) = event_sub_url {
            self.event_sub_url = absolute_path(url);
        }
    }

    /// Type UPnP, clé de recherche dans le device.
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn scpd_url(&self) -> &str {
        &self.scpd_url
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    pub fn event_sub_url(&self) -> &str {
        &self.event_sub_url
    }

    /// Charge (ou remplace) le document SCPD du service.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidDescriptor`] si le document est invalide ; le
    /// SCPD précédent est alors conservé.
    pub fn load_scpd(&self, text: &str) -> Result<(), DeviceError> {
        let scpd = Scpd::parse(text)?;
        debug!(
            service = %self.service_type,
            actions = scpd.actions().len(),
            variables = scpd.state_variables().len(),
            "SCPD loaded"
        );
        *self.scpd.write() = Some(Arc::new(scpd));
        Ok(())
    }

    pub fn is_scpd_loaded(&self) -> bool {
        self.scpd.read().is_some()
    }

    pub fn scpd(&self) -> Option<Arc<Scpd>> {
        self.scpd.read().clone()
    }

    pub fn set_action_listener(&self, listener: Arc<dyn ActionListener>) {
        *self.action_listener.write() = Some(listener);
    }

    pub fn set_query_listener(&self, listener: Arc<dyn QueryListener>) {
        *self.query_listener.write() = Some(listener);
    }

    pub fn action_listener(&self) -> Option<Arc<dyn ActionListener>> {
        self.action_listener.read().clone()
    }

    pub fn query_listener(&self) -> Option<Arc<dyn QueryListener>> {
        self.query_listener.read().clone()
    }

    /// Invoque une action sur le listener lié.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NoActionListener`] si aucun listener n'est lié
    /// - [`ServiceError::UnknownAction`] si le SCPD chargé ne déclare pas l'action
    /// - [`ServiceError::Action`] si le listener échoue
    pub async fn invoke_action(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionResponse, ServiceError> {
        let listener = self
            .action_listener()
            .ok_or_else(|| ServiceError::NoActionListener(self.service_type.clone()))?;

        if let Some(scpd) = self.scpd() {
            if scpd.action(request.name()).is_none() {
                warn!(service = %self.service_type, action = %request.name(), "Rejecting undeclared action");
                return Err(ServiceError::UnknownAction {
                    service: self.service_type.clone(),
                    action: request.name().to_string(),
                });
            }
        }

        Ok(listener.action_control_received(request).await?)
    }

    /// Interroge la valeur d'une variable d'état via le listener lié.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NoQueryListener`] si aucun listener n'est lié
    /// - [`ServiceError::UnknownVariable`] si la variable n'est pas déclarée
    ///   dans le SCPD chargé ou si le listener ne la connaît pas
    pub async fn query_variable(&self, variable: &str) -> Result<String, ServiceError> {
        let listener = self
            .query_listener()
            .ok_or_else(|| ServiceError::NoQueryListener(self.service_type.clone()))?;

        let unknown = || ServiceError::UnknownVariable {
            service: self.service_type.clone(),
            variable: variable.to_string(),
        };

        if let Some(scpd) = self.scpd() {
            if scpd.state_variable(variable).is_none() {
                return Err(unknown());
            }
        }

        listener
            .query_control_received(variable)
            .await
            .ok_or_else(unknown)
    }
}

impl UpnpXml for Service {
    fn to_xml_element(&self) -> Element {
        let mut elem = Element::new("service");
        push_text_child(&mut elem, "serviceType", &self.service_type);
        push_text_child(&mut elem, "serviceId", &self.service_id);
        push_text_child(&mut elem, "SCPDURL", &self.scpd_url);
        push_text_child(&mut elem, "controlURL", &self.control_url);
        push_text_child(&mut elem, "eventSubURL", &self.event_sub_url);
        elem
    }
}

// "urn:upnp-org:serviceId:ContentDirectory" -> "ContentDirectory"
fn short_id(service_id: &str) -> &str {
    service_id.rsplit(':').next().unwrap_or(service_id)
}

fn absolute_path(url: String) -> String {
    if url.starts_with('/') || url.contains("://") {
        url
    } else {
        format!("/{}", url)
    }
}
