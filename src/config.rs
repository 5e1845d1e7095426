use crate::mac::MacAddress;
use crate::wol::{Builder, WakeOnLan};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not read config file")]
    Read(#[from] std::io::Error),
    #[error("Could not parse config file")]
    Parse(#[from] serde_json::Error),
    #[error("Config file is invalid")]
    Invalid(#[from] crate::Error),
}

/// A host to wake, as stored on disk:
///
/// ```json
/// {"mac_address": "24:4b:fe:55:78:94", "broadcast_ip_address": "192.168.86.255", "port": 9}
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub mac_address: MacAddress,
    pub broadcast_ip_address: Option<String>,
    pub port: Option<u16>,
}

// The MAC is kept as text until after parsing so a bad address surfaces as
// `Error::Invalid` rather than as a json error.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    mac_address: String,
    broadcast_ip_address: Option<String>,
    port: Option<u16>,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Config, Error> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Ok(Config {
            mac_address: MacAddress::parse(&raw.mac_address)?,
            broadcast_ip_address: raw.broadcast_ip_address,
            port: raw.port,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// A builder seeded from the file, for callers that layer overrides on top.
    pub fn builder(&self) -> Builder {
        let mut builder = WakeOnLan::builder().mac_address_value(self.mac_address.clone());
        if let Some(ip) = &self.broadcast_ip_address {
            builder = builder.broadcast_ip_address(ip.as_str());
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        builder
    }

    pub fn build(&self) -> Result<WakeOnLan, Error> {
        Ok(self.builder().build()?)
    }
}
