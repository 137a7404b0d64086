//! Modèle du document SCPD (Service Control Protocol Description).

use crate::devices::errors::DeviceError;
use crate::xml::{child_text, named_children, parse_document};

/// Direction d'un argument d'action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentDirection {
    In,
    Out,
}

/// Argument déclaré par une action du SCPD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScpdArgument {
    pub name: String,
    pub direction: ArgumentDirection,
    pub related_state_variable: String,
}

/// Action déclarée par le SCPD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScpdAction {
    pub name: String,
    pub arguments: Vec<ScpdArgument>,
}

impl ScpdAction {
    /// Arguments IN, dans l'ordre de déclaration.
    pub fn in_arguments(&self) -> impl Iterator<Item = &ScpdArgument> {
        self.arguments
            .iter()
            .filter(|a| a.direction == ArgumentDirection::In)
    }

    /// Arguments OUT, dans l'ordre de déclaration.
    pub fn out_arguments(&self) -> impl Iterator<Item = &ScpdArgument> {
        self.arguments
            .iter()
            .filter(|a| a.direction == ArgumentDirection::Out)
    }
}

/// Variable d'état de la table `serviceStateTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScpdStateVariable {
    pub name: String,
    pub data_type: String,
    pub send_events: bool,
    pub default_value: Option<String>,
}

/// Document SCPD chargé dans un [`Service`](crate::services::Service).
///
/// Le texte source est conservé tel quel : c'est lui qui est servi aux
/// points de contrôle sur l'URL SCPD du service.
#[derive(Debug, Clone)]
pub struct Scpd {
    actions: Vec<ScpdAction>,
    state_variables: Vec<ScpdStateVariable>,
    source: String,
}

impl Scpd {
    /// Parse un document SCPD.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidDescriptor`] si le document est mal formé, si la
    /// racine n'est pas `scpd`, ou si une action, un argument ou une variable
    /// n'a pas ses éléments obligatoires.
    pub fn parse(text: &str) -> Result<Self, DeviceError> {
        let root = parse_document(text)
            .map_err(|e| DeviceError::InvalidDescriptor(format!("SCPD: {}", e)))?;

        if root.name != "scpd" {
            return Err(DeviceError::InvalidDescriptor(format!(
                "SCPD root element must be <scpd>, found <{}>",
                root.name
            )));
        }

        let mut actions = Vec::new();
        if let Some(action_list) = root.get_child("actionList") {
            for action in named_children(action_list, "action") {
                let name = child_text(action, "name").ok_or_else(|| {
                    DeviceError::InvalidDescriptor("SCPD action without <name>".to_string())
                })?;

                let mut arguments = Vec::new();
                if let Some(argument_list) = action.get_child("argumentList") {
                    for argument in named_children(argument_list, "argument") {
                        arguments.push(parse_argument(&name, argument)?);
                    }
                }

                actions.push(ScpdAction { name, arguments });
            }
        }

        let mut state_variables = Vec::new();
        if let Some(table) = root.get_child("serviceStateTable") {
            for variable in named_children(table, "stateVariable") {
                let name = child_text(variable, "name").ok_or_else(|| {
                    DeviceError::InvalidDescriptor("SCPD stateVariable without <name>".to_string())
                })?;
                let data_type = child_text(variable, "dataType").ok_or_else(|| {
                    DeviceError::InvalidDescriptor(format!(
                        "SCPD stateVariable '{}' without <dataType>",
                        name
                    ))
                })?;
                let send_events = variable
                    .attributes
                    .get("sendEvents")
                    .map(|v| !v.trim().eq_ignore_ascii_case("no"))
                    .unwrap_or(true);

                state_variables.push(ScpdStateVariable {
                    name,
                    data_type,
                    send_events,
                    default_value: child_text(variable, "defaultValue"),
                });
            }
        }

        Ok(Self {
            actions,
            state_variables,
            source: text.to_string(),
        })
    }

    pub fn actions(&self) -> &[ScpdAction] {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&ScpdAction> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn state_variables(&self) -> &[ScpdStateVariable] {
        &self.state_variables
    }

    pub fn state_variable(&self, name: &str) -> Option<&ScpdStateVariable> {
        self.state_variables.iter().find(|v| v.name == name)
    }

    /// Texte source du document.
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn parse_argument(action: &str, argument: &xmltree::Element) -> Result<ScpdArgument, DeviceError> {
    let missing = |what: &str| {
        DeviceError::InvalidDescriptor(format!(
            "SCPD argument of action '{}' without <{}>",
            action, what
        ))
    };

    let name = child_text(argument, "name").ok_or_else(|| missing("name"))?;
    let direction = match child_text(argument, "direction").ok_or_else(|| missing("direction"))? {
        d if d.eq_ignore_ascii_case("in") => ArgumentDirection::In,
        d if d.eq_ignore_ascii_case("out") => ArgumentDirection::Out,
        d => {
            return Err(DeviceError::InvalidDescriptor(format!(
                "SCPD argument '{}' of action '{}' has invalid direction '{}'",
                name, action, d
            )));
        }
    };
    let related_state_variable =
        child_text(argument, "relatedStateVariable").ok_or_else(|| missing("relatedStateVariable"))?;

    Ok(ScpdArgument {
        name,
        direction,
        related_state_variable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCPD: &str = r#"<?xml version="1.0"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <actionList>
    <action>
      <name>GetSystemUpdateID</name>
      <argumentList>
        <argument>
          <name>Id</name>
          <direction>out</direction>
          <relatedStateVariable>SystemUpdateID</relatedStateVariable>
        </argument>
      </argumentList>
    </action>
  </actionList>
  <serviceStateTable>
    <stateVariable sendEvents="yes">
      <name>SystemUpdateID</name>
      <dataType>ui4</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
      <name>A_ARG_TYPE_Count</name>
      <dataType>ui4</dataType>
      <defaultValue>0</defaultValue>
    </stateVariable>
  </serviceStateTable>
</scpd>"#;

    #[test]
    fn test_parse_actions_and_variables() {
        let scpd = Scpd::parse(SCPD).unwrap();

        let action = scpd.action("GetSystemUpdateID").unwrap();
        assert_eq!(action.out_arguments().count(), 1);
        assert_eq!(action.in_arguments().count(), 0);
        assert_eq!(action.arguments[0].related_state_variable, "SystemUpdateID");

        assert!(scpd.state_variable("SystemUpdateID").unwrap().send_events);
        let count = scpd.state_variable("A_ARG_TYPE_Count").unwrap();
        assert!(!count.send_events);
        assert_eq!(count.default_value.as_deref(), Some("0"));

        assert_eq!(scpd.source(), SCPD);
    }

    #[test]
    fn test_empty_scpd_is_valid() {
        let scpd = Scpd::parse("<scpd/>").unwrap();
        assert!(scpd.actions().is_empty());
        assert!(scpd.state_variables().is_empty());
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = Scpd::parse("<root/>").unwrap_err();
        assert!(matches!(err, DeviceError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_bad_direction_is_rejected() {
        let text = "<scpd><actionList><action><name>A</name><argumentList><argument>\
                    <name>X</name><direction>sideways</direction>\
                    <relatedStateVariable>V</relatedStateVariable>\
                    </argument></argumentList></action></actionList></scpd>";
        assert!(matches!(
            Scpd::parse(text),
            Err(DeviceError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(matches!(
            Scpd::parse("<scpd><actionList></scpd>"),
            Err(DeviceError::InvalidDescriptor(_))
        ));
    }
}
