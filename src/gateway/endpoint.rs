use crate::error::{Result, SwapDeskError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Public mainnet endpoints used when no custom list is configured.
pub const DEFAULT_ENDPOINTS: &[(&str, &str)] = &[
    ("Solana Mainnet Beta", "https://api.mainnet-beta.solana.com"),
    ("PublicNode", "https://solana-rpc.publicnode.com"),
    ("Ankr", "https://rpc.ankr.com/solana"),
];

/// One named URL for reaching the chain's RPC service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    url: String,
    name: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

pub fn default_endpoints() -> Vec<Endpoint> {
    DEFAULT_ENDPOINTS
        .iter()
        .map(|(name, url)| Endpoint::new(*name, *url))
        .collect()
}

/// Parses `name=url` pairs separated by commas. A bare URL gets a positional
/// name (`RPC 2`).
pub fn parse_endpoint_list(raw: &str) -> Result<Vec<Endpoint>> {
    let mut endpoints = Vec::new();
    for (i, entry) in raw.split(',').map(str::trim).filter(|e| !e.is_empty()).enumerate() {
        let (name, url) = match entry.split_once('=') {
            Some((name, url)) => (name.trim().to_string(), url.trim()),
            None => (format!("RPC {}", i + 1), entry),
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SwapDeskError::InvalidConfig(format!(
                "RPC endpoint '{}' must be an http(s) URL, got '{}'",
                name, url
            )));
        }
        endpoints.push(Endpoint::new(name, url));
    }
    Ok(endpoints)
}

/// Ordered endpoints plus the index of the one currently in use.
///
/// The index only changes through [`EndpointPool::select`] (a call succeeded
/// somewhere) and [`EndpointPool::reset`] (a call exhausted every endpoint).
#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
    current: Mutex<usize>,
}

impl EndpointPool {
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(SwapDeskError::InvalidConfig(
                "endpoint pool requires at least one endpoint".to_string(),
            ));
        }
        Ok(Self {
            endpoints,
            current: Mutex::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn get(&self, index: usize) -> &Endpoint {
        &self.endpoints[index % self.endpoints.len()]
    }

    pub fn current_index(&self) -> usize {
        *self.current.lock()
    }

    pub fn current(&self) -> &Endpoint {
        self.get(self.current_index())
    }

    pub(crate) fn select(&self, index: usize) {
        *self.current.lock() = index % self.endpoints.len();
    }

    pub(crate) fn reset(&self) {
        *self.current.lock() = 0;
    }
}
