//! Répertoires de contenu et plug-ins de formats.
//!
//! Un [`Directory`] est une source de contenu nommée, enregistrée dans le
//! ContentDirectory. Un [`Format`] déclare un type MIME que le serveur sait
//! exporter ; l'ensemble des formats alimente le `SourceProtocolInfo` du
//! ConnectionManager.

use async_trait::async_trait;

/// Contenu résolu par un répertoire, prêt à être exporté.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedContent {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ExportedContent {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Répertoire de contenu nommé.
///
/// Le nom est la clé d'enregistrement : deux répertoires de même nom ne
/// coexistent jamais dans un ContentDirectory.
#[async_trait]
pub trait Directory: Send + Sync {
    fn name(&self) -> &str;

    /// Rafraîchit le contenu du répertoire.
    ///
    /// Retourne `true` si le contenu a changé.
    async fn refresh(&self) -> bool {
        false
    }

    /// Résout un identifiant de contenu.
    async fn content(&self, id: &str) -> Option<ExportedContent>;
}

/// Plug-in de format, identifié par son type MIME.
pub trait Format: Send + Sync {
    fn mime_type(&self) -> &str;

    /// Classe UPnP des objets de ce format (`object.item.audioItem.musicTrack`, ...).
    fn media_class(&self) -> &str;
}
