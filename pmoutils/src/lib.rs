//! Utilitaires réseau partagés par les crates du media server.
//!
//! Ce module fournit les fonctions qui permettent de choisir l'adresse
//! d'interface sur laquelle le device UPnP sera publié.
//!
//! # Fonctions principales
//!
//! - [`guess_local_ip`] : Devine l'adresse IP locale utilisée pour les connexions sortantes
//! - [`host_addresses`] : Liste les adresses IPv4 non-loopback de la machine
//! - [`first_host_address`] : Première adresse IPv4 utilisable
//!
//! # Examples
//!
//! ```
//! use pmoutils::{first_host_address, guess_local_ip};
//!
//! let ip = first_host_address().unwrap_or_else(guess_local_ip);
//! println!("Adresse IP locale: {}", ip);
//! ```
mod ip_utils;

pub use ip_utils::{HostAddress, first_host_address, guess_local_ip, host_addresses};
