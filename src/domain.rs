use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WonderError;

pub const WONDER_BASE: &str = "https://wonder.cdc.gov";
pub const WONDER_HOST: &str = "wonder.cdc.gov";

/// Numeric dataset identifier behind the controller endpoint, e.g. `D176`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(u32);

impl DatasetId {
    pub fn from_ordinal(ordinal: u32) -> Self {
        Self(ordinal)
    }

    pub fn ordinal(&self) -> u32 {
        self.0
    }

    pub fn controller_url(&self) -> String {
        format!("{WONDER_BASE}/controller/datarequest/{self}")
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

impl FromStr for DatasetId {
    type Err = WonderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let digits = normalized
            .strip_prefix('D')
            .or_else(|| normalized.strip_prefix('d'))
            .ok_or_else(|| WonderError::InvalidDatasetId(value.to_string()))?;
        let ordinal = digits
            .parse::<u32>()
            .map_err(|_| WonderError::InvalidDatasetId(value.to_string()))?;
        if ordinal == 0 {
            return Err(WonderError::InvalidDatasetId(value.to_string()));
        }
        Ok(Self(ordinal))
    }
}

/// Numeric portion of a persisted dataset id, for ordering. Malformed ids
/// sort first instead of failing the pass.
pub fn dataset_ordinal(id: &str) -> u32 {
    let Some(rest) = id.strip_prefix('D') else {
        return 0;
    };
    let digits: String = rest.chars().take_while(|ch| ch.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// How a dataset's canonical page was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryKind {
    Direct,
    Redirect,
    Http(u16),
    Error,
}

impl fmt::Display for DiscoveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryKind::Direct => write!(f, "direct"),
            DiscoveryKind::Redirect => write!(f, "redirect"),
            DiscoveryKind::Http(status) => write!(f, "http_{status}"),
            DiscoveryKind::Error => write!(f, "error"),
        }
    }
}

impl FromStr for DiscoveryKind {
    type Err = WonderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "direct" => Ok(DiscoveryKind::Direct),
            "redirect" => Ok(DiscoveryKind::Redirect),
            "error" => Ok(DiscoveryKind::Error),
            other => {
                let status = other
                    .strip_prefix("http_")
                    .and_then(|code| code.parse::<u16>().ok())
                    .ok_or_else(|| WonderError::InvalidDiscoveryKind(value.to_string()))?;
                Ok(DiscoveryKind::Http(status))
            }
        }
    }
}

impl Serialize for DiscoveryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DiscoveryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(D::Error::custom)
    }
}

/// One audit row of the dataset map, written per probed identifier. The id is
/// kept as plain text so hand-edited historical rows still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetProbe {
    pub id: String,
    pub controller_url: String,
    pub http_status: String,
    pub discovery: DiscoveryKind,
    pub final_url: String,
    pub page_name: String,
    pub years: String,
    pub error: String,
}

impl DatasetProbe {
    /// Rows that resolved to a real dataset page and are eligible for topic
    /// classification.
    pub fn is_resolved(&self) -> bool {
        self.discovery == DiscoveryKind::Redirect && !self.page_name.is_empty()
    }
}
