//! Extension pour intégrer la configuration réseau UPnP dans pmoconfig
//!
//! Ce module fournit le trait `UpnpConfigExt` qui ajoute à
//! `pmoconfig::Config` la construction d'une [`NetworkConfig`].

use std::net::IpAddr;

use pmoconfig::Config;

use crate::network::NetworkConfig;

/// Trait d'extension pour ajouter la configuration réseau UPnP à pmoconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use std::net::IpAddr;
///
/// use pmoconfig::Config;
/// use pmoupnp::UpnpConfigExt;
///
/// let config = Config::load_config("")?;
/// let network = config.get_network_config();
/// println!("Device published on {}", network.base_url());
/// ```
pub trait UpnpConfigExt {
    /// Construit la configuration réseau du device.
    ///
    /// L'interface configurée est utilisée si elle est valide ; sinon la
    /// première interface IPv4 de la machine est retenue.
    fn get_network_config(&self) -> NetworkConfig;
}

impl UpnpConfigExt for Config {
    fn get_network_config(&self) -> NetworkConfig {
        network_config(self, || NetworkConfig::detect().interface)
    }
}

// La détection (énumération des interfaces, socket UDP) n'a lieu que si
// aucune interface n'est configurée.
fn network_config(config: &Config, detect: impl FnOnce() -> IpAddr) -> NetworkConfig {
    let interface = config.get_interface_address().unwrap_or_else(detect);
    NetworkConfig::new(interface, config.get_http_port())
}
