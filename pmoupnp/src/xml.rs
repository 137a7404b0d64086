//! Outils XML partagés par les documents de description et les SCPD.

use std::io::Cursor;

use xmltree::{Element, EmitterConfig, XMLNode};

/// Objet UPnP sérialisable en XML.
pub trait UpnpXml {
    fn to_xml_element(&self) -> Element;

    /// Sérialise l'élément avec indentation et en-tête XML.
    fn to_xml(&self) -> Result<String, String> {
        let elem = self.to_xml_element();

        let config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string("  ")
            .write_document_declaration(false);

        let mut buf = Vec::new();
        elem.write_with_config(&mut buf, config)
            .map_err(|e| e.to_string())?;

        let body = String::from_utf8(buf).map_err(|e| e.to_string())?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", body))
    }
}

/// Parse un document XML complet.
pub(crate) fn parse_document(text: &str) -> Result<Element, String> {
    Element::parse(Cursor::new(text.as_bytes())).map_err(|e| e.to_string())
}

/// Itère sur les sous-éléments directs.
pub(crate) fn xml_children(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(XMLNode::as_element)
}

/// Itère sur les sous-éléments directs portant le nom donné.
pub(crate) fn named_children<'a>(
    element: &'a Element,
    name: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    xml_children(element).filter(move |child| child.name == name)
}

/// Texte (trimé) du premier enfant `name`, s'il existe et n'est pas vide.
pub(crate) fn child_text(element: &Element, name: &str) -> Option<String> {
    element
        .get_child(name)
        .and_then(|child| child.get_text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Ajoute `<name>text</name>` à `parent`.
pub(crate) fn push_text_child(parent: &mut Element, name: &str, text: &str) {
    let mut child = Element::new(name);
    child.children.push(XMLNode::Text(text.to_string()));
    parent.children.push(XMLNode::Element(child));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_text_trims_and_skips_empty() {
        let root = parse_document("<a><b>  x  </b><c>   </c></a>").unwrap();
        assert_eq!(child_text(&root, "b").as_deref(), Some("x"));
        assert_eq!(child_text(&root, "c"), None);
        assert_eq!(child_text(&root, "d"), None);
    }

    #[test]
    fn test_named_children_ignores_text_nodes() {
        let root = parse_document("<l><i>1</i>text<i>2</i><j/></l>").unwrap();
        assert_eq!(named_children(&root, "i").count(), 2);
        assert_eq!(xml_children(&root).count(), 3);
    }

    #[test]
    fn test_parse_document_rejects_garbage() {
        assert!(parse_document("<root><unclosed></root>").is_err());
        assert!(parse_document("").is_err());
    }
}
