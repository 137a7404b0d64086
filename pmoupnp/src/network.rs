//! Configuration réseau d'un device.
//!
//! Le device ne choisit jamais son interface via un état global : la
//! [`NetworkConfig`] est construite par l'application (configuration,
//! détection) et transmise explicitement à la couche transport.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use pmoutils::{first_host_address, guess_local_ip};

/// Port HTTP réservé aux media servers de cette famille.
pub const DEFAULT_HTTP_PORT: u16 = pmoconfig::DEFAULT_HTTP_PORT;

/// Adresse d'interface et port HTTP sur lesquels le device est publié.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub interface: IpAddr,
    pub http_port: u16,
}

impl NetworkConfig {
    pub fn new(interface: IpAddr, http_port: u16) -> Self {
        Self {
            interface,
            http_port,
        }
    }

    /// Première interface IPv4 non-loopback de la machine, sur le port par défaut.
    ///
    /// À défaut d'interface énumérable, l'adresse est devinée via
    /// [`guess_local_ip`].
    pub fn detect() -> Self {
        let interface = first_host_address().unwrap_or_else(guess_local_ip);
        Self::new(interface, DEFAULT_HTTP_PORT)
    }

    pub fn with_interface(mut self, interface: IpAddr) -> Self {
        self.interface = interface;
        self
    }

    pub fn with_http_port(mut self, http_port: u16) -> Self {
        self.http_port = http_port;
        self
    }

    /// Adresse d'écoute du transport HTTP.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.interface, self.http_port)
    }

    /// URL de base annoncée aux points de contrôle (`http://addr:port`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.socket_addr())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_HTTP_PORT)
    }
}
