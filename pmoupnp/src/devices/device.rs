//! Modèle d'un device UPnP chargé depuis son document de description.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use xmltree::{Element, XMLNode};

use crate::services::Service;
use crate::xml::{UpnpXml, child_text, named_children, parse_document, push_text_child};

use super::errors::DeviceError;

/// Route à laquelle la description du device est servie.
pub const DESCRIPTION_ROUTE: &str = "/description.xml";

/// Device UPnP racine.
///
/// Représente le contenu d'un document de description
/// (`urn:schemas-upnp-org:device-1-0`). La structure est figée après le
/// chargement ; seuls les services évoluent ensuite (SCPD, listeners).
///
/// Les services sont conservés dans l'ordre de déclaration et le
/// `serviceType` est unique dans un device.
#[derive(Debug)]
pub struct Device {
    device_type: String,
    friendly_name: String,
    manufacturer: Option<String>,
    manufacturer_url: Option<String>,
    model_description: Option<String>,
    model_name: Option<String>,
    model_number: Option<String>,
    model_url: Option<String>,
    serial_number: Option<String>,
    udn: String,
    presentation_url: Option<String>,
    services: Vec<Arc<Service>>,
}

impl Device {
    /// Charge un device depuis un fichier de description.
    ///
    /// # Errors
    ///
    /// - [`DeviceError::Io`] si le fichier est illisible
    /// - [`DeviceError::InvalidDescriptor`] si son contenu est invalide
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DeviceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "📄 Loading device description");
        Self::from_description(&text)
    }

    /// Charge un device depuis le texte de sa description.
    ///
    /// Éléments obligatoires : `root/device` avec `deviceType`,
    /// `friendlyName` et `serviceList` ; chaque `service` doit porter
    /// `serviceType` et `serviceId`. Un UDN est généré s'il est absent.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidDescriptor`] si le document est mal formé, s'il
    /// manque un élément obligatoire ou si deux services partagent le même type.
    pub fn from_description(text: &str) -> Result<Self, DeviceError> {
        let root = parse_document(text).map_err(DeviceError::InvalidDescriptor)?;

        if root.name != "root" {
            return Err(DeviceError::InvalidDescriptor(format!(
                "description root element must be <root>, found <{}>",
                root.name
            )));
        }

        let device = root
            .get_child("device")
            .ok_or_else(|| missing("device"))?;

        let device_type = child_text(device, "deviceType").ok_or_else(|| missing("deviceType"))?;
        let friendly_name =
            child_text(device, "friendlyName").ok_or_else(|| missing("friendlyName"))?;
        let service_list = device
            .get_child("serviceList")
            .ok_or_else(|| missing("serviceList"))?;

        let mut services: Vec<Arc<Service>> = Vec::new();
        for entry in named_children(service_list, "service") {
            let service = parse_service(entry)?;
            if services
                .iter()
                .any(|s| s.service_type() == service.service_type())
            {
                return Err(DeviceError::InvalidDescriptor(format!(
                    "service type '{}' declared twice",
                    service.service_type()
                )));
            }
            services.push(Arc::new(service));
        }

        let udn = child_text(device, "UDN")
            .unwrap_or_else(|| format!("uuid:{}", uuid::Uuid::new_v4()));

        debug!(
            device_type = %device_type,
            udn = %udn,
            services = services.len(),
            "Device description parsed"
        );

        Ok(Self {
            device_type,
            friendly_name,
            manufacturer: child_text(device, "manufacturer"),
            manufacturer_url: child_text(device, "manufacturerURL"),
            model_description: child_text(device, "modelDescription"),
            model_name: child_text(device, "modelName"),
            model_number: child_text(device, "modelNumber"),
            model_url: child_text(device, "modelURL"),
            serial_number: child_text(device, "serialNumber"),
            udn,
            presentation_url: child_text(device, "presentationURL"),
            services,
        })
    }

    /// Retourne le type de device UPnP.
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Retourne le nom convivial.
    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn manufacturer_url(&self) -> Option<&str> {
        self.manufacturer_url.as_deref()
    }

    pub fn model_description(&self) -> Option<&str> {
        self.model_description.as_deref()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn model_number(&self) -> Option<&str> {
        self.model_number.as_deref()
    }

    pub fn model_url(&self) -> Option<&str> {
        self.model_url.as_deref()
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    /// Retourne l'UDN du device.
    pub fn udn(&self) -> &str {
        &self.udn
    }

    pub fn presentation_url(&self) -> Option<&str> {
        self.presentation_url.as_deref()
    }

    /// Retourne tous les services, dans l'ordre de déclaration.
    pub fn services(&self) -> &[Arc<Service>] {
        &self.services
    }

    /// Retourne un service par son `serviceType`.
    ///
    /// # Errors
    ///
    /// [`DeviceError::ServiceNotFound`] si aucun service de ce type n'est déclaré.
    pub fn get_service(&self, service_type: &str) -> Result<Arc<Service>, DeviceError> {
        self.services
            .iter()
            .find(|s| s.service_type() == service_type)
            .cloned()
            .ok_or_else(|| DeviceError::ServiceNotFound(service_type.to_string()))
    }

    /// Retourne le service dont l'une des URLs (SCPD, contrôle, événements) vaut `path`.
    pub fn service_for_path(&self, path: &str) -> Option<Arc<Service>> {
        self.services
            .iter()
            .find(|s| s.scpd_url() == path || s.control_url() == path || s.event_sub_url() == path)
            .cloned()
    }

    /// Génère l'élément XML de description du device.
    pub fn description_element(&self) -> Element {
        let mut root = Element::new("root");
        root.attributes.insert(
            "xmlns".to_string(),
            "urn:schemas-upnp-org:device-1-0".to_string(),
        );

        let mut spec = Element::new("specVersion");
        push_text_child(&mut spec, "major", "1");
        push_text_child(&mut spec, "minor", "0");
        root.children.push(XMLNode::Element(spec));

        root.children.push(XMLNode::Element(self.to_xml_element()));
        root
    }

    /// Sérialise la description complète, avec les URLs de chaque service.
    pub fn description_xml(&self) -> Result<String, DeviceError> {
        DescriptionDocument(self)
            .to_xml()
            .map_err(DeviceError::Serialization)
    }
}

impl UpnpXml for Device {
    fn to_xml_element(&self) -> Element {
        let mut elem = Element::new("device");

        push_text_child(&mut elem, "deviceType", &self.device_type);
        push_text_child(&mut elem, "friendlyName", &self.friendly_name);

        let optional = [
            ("manufacturer", &self.manufacturer),
            ("manufacturerURL", &self.manufacturer_url),
            ("modelDescription", &self.model_description),
            ("modelName", &self.model_name),
            ("modelNumber", &self.model_number),
            ("modelURL", &self.model_url),
            ("serialNumber", &self.serial_number),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                push_text_child(&mut elem, name, value);
            }
        }

        push_text_child(&mut elem, "UDN", &self.udn);

        let mut service_list = Element::new("serviceList");
        for service in &self.services {
            service_list
                .children
                .push(XMLNode::Element(service.to_xml_element()));
        }
        elem.children.push(XMLNode::Element(service_list));

        if let Some(url) = &self.presentation_url {
            push_text_child(&mut elem, "presentationURL", url);
        }

        elem
    }
}

/// Document complet (`<root>`) d'un device.
struct DescriptionDocument<'a>(&'a Device);

impl UpnpXml for DescriptionDocument<'_> {
    fn to_xml_element(&self) -> Element {
        self.0.description_element()
    }
}

fn missing(element: &str) -> DeviceError {
    DeviceError::InvalidDescriptor(format!("missing required element <{}>", element))
}

fn parse_service(entry: &Element) -> Result<Service, DeviceError> {
    let service_type = child_text(entry, "serviceType").ok_or_else(|| missing("serviceType"))?;
    let service_id = child_text(entry, "serviceId").ok_or_else(|| missing("serviceId"))?;

    let mut service = Service::new(service_type, service_id);
    service.set_urls(
        child_text(entry, "SCPDURL"),
        child_text(entry, "controlURL"),
        child_text(entry, "eventSubURL"),
    );
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
   <specVersion><major>1</major><minor>0</minor></specVersion>
   <device>
      <deviceType>urn:schemas-upnp-org:device:MediaServer:1</deviceType>
      <friendlyName>Test Server</friendlyName>
      <manufacturer>PMOMusic</manufacturer>
      <UDN>uuid:00000000-0000-0000-0000-000000000001</UDN>
      <serviceList>
         <service>
            <serviceType>urn:schemas-upnp-org:service:ContentDirectory:1</serviceType>
            <serviceId>urn:upnp-org:serviceId:ContentDirectory</serviceId>
         </service>
         <service>
            <serviceType>urn:schemas-upnp-org:service:ConnectionManager:1</serviceType>
            <serviceId>urn:upnp-org:serviceId:ConnectionManager</serviceId>
            <SCPDURL>/cm/scpd.xml</SCPDURL>
         </service>
      </serviceList>
   </device>
</root>"#;

    #[test]
    fn test_parse_description() {
        let device = Device::from_description(DESCRIPTION).unwrap();

        assert_eq!(device.device_type(), "urn:schemas-upnp-org:device:MediaServer:1");
        assert_eq!(device.friendly_name(), "Test Server");
        assert_eq!(device.manufacturer(), Some("PMOMusic"));
        assert_eq!(device.model_name(), None);
        assert_eq!(device.udn(), "uuid:00000000-0000-0000-0000-000000000001");

        let types: Vec<_> = device.services().iter().map(|s| s.service_type()).collect();
        assert_eq!(
            types,
            vec![
                "urn:schemas-upnp-org:service:ContentDirectory:1",
                "urn:schemas-upnp-org:service:ConnectionManager:1",
            ]
        );
    }

    #[test]
    fn test_get_service_by_type() {
        let device = Device::from_description(DESCRIPTION).unwrap();

        let cm = device
            .get_service("urn:schemas-upnp-org:service:ConnectionManager:1")
            .unwrap();
        assert!(Arc::ptr_eq(&cm, &device.services()[1]));
        assert_eq!(cm.scpd_url(), "/cm/scpd.xml");

        let err = device
            .get_service("urn:schemas-upnp-org:service:AVTransport:1")
            .unwrap_err();
        assert!(matches!(err, DeviceError::ServiceNotFound(t) if t.contains("AVTransport")));
    }

    #[test]
    fn test_service_for_path() {
        let device = Device::from_description(DESCRIPTION).unwrap();
        let cd = device
            .service_for_path("/service/ContentDirectory/control")
            .unwrap();
        assert_eq!(cd.service_id(), "urn:upnp-org:serviceId:ContentDirectory");
        assert!(device.service_for_path("/nowhere").is_none());
    }

    #[test]
    fn test_missing_udn_is_generated() {
        let text = DESCRIPTION.replace(
            "<UDN>uuid:00000000-0000-0000-0000-000000000001</UDN>",
            "",
        );
        let device = Device::from_description(&text).unwrap();
        assert!(device.udn().starts_with("uuid:"));
    }

    #[test]
    fn test_invalid_descriptions() {
        let cases = [
            "not xml at all".to_string(),
            "<root><device>".to_string(),
            "<other/>".to_string(),
            "<root/>".to_string(),
            DESCRIPTION.replace("<friendlyName>Test Server</friendlyName>", ""),
            DESCRIPTION.replace(
                "<serviceId>urn:upnp-org:serviceId:ConnectionManager</serviceId>",
                "",
            ),
            DESCRIPTION.replace("ConnectionManager:1", "ContentDirectory:1"),
        ];

        for text in cases {
            let result = Device::from_description(&text);
            assert!(
                matches!(result, Err(DeviceError::InvalidDescriptor(_))),
                "expected InvalidDescriptor for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("description.xml");
        std::fs::write(&path, DESCRIPTION).unwrap();

        let device = Device::from_file(&path).unwrap();
        assert_eq!(device.services().len(), 2);

        let err = Device::from_file(dir.path().join("missing.xml")).unwrap_err();
        assert!(matches!(err, DeviceError::Io { .. }));
    }

    #[test]
    fn test_description_xml_round_trips_through_parser() {
        let device = Device::from_description(DESCRIPTION).unwrap();
        let xml = device.description_xml().unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<SCPDURL>/service/ContentDirectory/desc.xml</SCPDURL>"));

        let reparsed = Device::from_description(&xml).unwrap();
        assert_eq!(reparsed.udn(), device.udn());
        assert_eq!(reparsed.services()[1].scpd_url(), "/cm/scpd.xml");
    }
}
