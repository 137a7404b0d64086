use get_if_addrs::get_if_addrs;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Adresse IPv4 d'une interface réseau locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAddress {
    /// Nom de l'interface (ex: `"eth0"`, `"en0"`)
    pub interface: String,
    /// Adresse IPv4 portée par l'interface
    pub address: Ipv4Addr,
}

/// Devine l'adresse IP locale de la machine.
///
/// Cette fonction crée un socket UDP et le « connecte » vers un serveur DNS
/// public (8.8.8.8) pour laisser le système choisir l'interface de sortie.
/// Aucun paquet n'est émis : UDP est sans connexion.
///
/// # Returns
///
/// L'adresse de l'interface de sortie, ou `127.0.0.1` en cas d'échec.
pub fn guess_local_ip() -> IpAddr {
    let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let Ok(socket) = UdpSocket::bind("0.0.0.0:0") else {
        return localhost;
    };
    if socket.connect("8.8.8.8:80").is_err() {
        return localhost;
    }
    socket
        .local_addr()
        .map(|addr| addr.ip())
        .unwrap_or(localhost)
}

/// Liste les adresses IPv4 non-loopback des interfaces réseau.
///
/// L'ordre est celui renvoyé par le système. Les adresses IPv6 sont ignorées :
/// le device n'est publié qu'en IPv4.
///
/// En cas d'erreur lors de l'énumération des interfaces, la liste est vide.
pub fn host_addresses() -> Vec<HostAddress> {
    let Ok(interfaces) = get_if_addrs() else {
        return Vec::new();
    };

    interfaces
        .into_iter()
        .filter_map(|iface| match iface.ip() {
            IpAddr::V4(address) if !address.is_loopback() => Some(HostAddress {
                interface: iface.name,
                address,
            }),
            _ => None,
        })
        .collect()
}

/// Retourne la première adresse IPv4 non-loopback, si elle existe.
pub fn first_host_address() -> Option<IpAddr> {
    host_addresses()
        .into_iter()
        .next()
        .map(|host| IpAddr::V4(host.address))
}
