use crate::error::Error;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: &str = ":";

lazy_static! {
    // Six two-digit hex groups separated by ':' or '-', nothing before or after.
    static ref MAC_PATTERN: Regex =
        Regex::new(r"^((([0-9a-fA-F]){2}[-:]){5}([0-9a-fA-F]){2})$").unwrap();
}

/// A validated hardware address, kept both as octets and in its normalized
/// `xx:xx:xx:xx:xx:xx` text form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress {
    text: String,
    octets: [u8; 6],
}

impl MacAddress {
    /// Validates `raw` and normalizes it.
    ///
    /// Semicolons are read as colons. Groups may be separated by ':' or '-' and
    /// are always rejoined with ':'. If the address as a whole mixes upper and
    /// lower case it is lower-cased, otherwise the case is left as supplied.
    pub fn parse(raw: &str) -> Result<MacAddress, Error> {
        let candidate = raw.replace(';', ":");
        if !MAC_PATTERN.is_match(&candidate) {
            return Err(Error::InvalidMacAddress(raw.to_string()));
        }
        let groups: Vec<&str> = candidate.split(&[':', '-'][..]).collect();

        let joined = groups.concat();
        let mixed_case = joined.to_lowercase() != joined && joined.to_uppercase() != joined;
        let groups: Vec<String> = groups
            .iter()
            .map(|g| {
                if mixed_case {
                    g.to_lowercase()
                } else {
                    g.to_string()
                }
            })
            .collect();

        let mut octets = [0u8; 6];
        for (dst, group) in octets.iter_mut().zip(&groups) {
            *dst = u8::from_str_radix(group, 16)
                .map_err(|_| Error::InvalidMacAddress(raw.to_string()))?;
        }

        let text = groups.join(SEPARATOR);
        debug!("normalized mac address {:?} to {}", raw, text);
        Ok(MacAddress { text, octets })
    }

    pub fn octets(&self) -> [u8; 6] {
        self.octets
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MacAddress::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        MacAddress::parse(&s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.text
    }
}
