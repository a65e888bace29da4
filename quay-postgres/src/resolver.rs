//! Host name resolution.
//!
//! Outbound connections normally use the platform resolver. Networks that
//! block or break plain DNS can switch to [`DohResolver`], which asks a
//! DNS-over-HTTPS endpoint instead.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Cloudflare's JSON DNS-over-HTTPS endpoint.
pub const CLOUDFLARE_DOH_URL: &str = "https://1.1.1.1/dns-query";

const RECORD_TYPE_A: u16 = 1;
const RECORD_TYPE_AAAA: u16 = 28;

/// Process-wide choice of name-resolution mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverMode {
    /// The operating system resolver.
    #[default]
    Native,
    /// DNS-over-HTTPS.
    Https,
}

impl ResolverMode {
    /// Parse a mode name (`native` or `https`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "native" => Some(Self::Native),
            "https" => Some(Self::Https),
            _ => None,
        }
    }

    /// The mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for ResolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from host resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The lookup request itself failed.
    #[error("lookup of {host} failed: {source}")]
    Lookup {
        /// Host being resolved.
        host: String,
        /// Underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The resolver answered with an error status.
    #[error("lookup of {host} returned DNS status {status}")]
    Status {
        /// Host being resolved.
        host: String,
        /// DNS RCODE.
        status: u16,
    },

    /// The resolver answered without any usable address.
    #[error("no addresses found for {0}")]
    NoAddresses(String),

    /// The HTTP client backing the resolver could not be created.
    #[error("failed to build DNS-over-HTTPS client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Resolves a host name to IP addresses.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Short name used in logs and debug output.
    fn name(&self) -> &str;

    /// Resolve `host`. Returned addresses are tried in order.
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// The platform resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeResolver;

#[async_trait]
impl HostResolver for NativeResolver {
    fn name(&self) -> &str {
        "native"
    }

    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| ResolveError::Lookup {
                host: host.to_string(),
                source: Box::new(e),
            })?
            .map(|addr| addr.ip())
            .collect();

        if addrs.is_empty() {
            return Err(ResolveError::NoAddresses(host.to_string()));
        }
        Ok(addrs)
    }
}

/// Resolver that queries a JSON DNS-over-HTTPS endpoint.
#[derive(Debug, Clone)]
pub struct DohResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl DohResolver {
    /// Create a resolver for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(ResolveError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a resolver for Cloudflare's public endpoint.
    pub fn cloudflare() -> Result<Self, ResolveError> {
        Self::new(CLOUDFLARE_DOH_URL)
    }

    async fn query(&self, host: &str, record_type: u16) -> Result<DohResponse, ResolveError> {
        let lookup_err = |e: reqwest::Error| ResolveError::Lookup {
            host: host.to_string(),
            source: Box::new(e),
        };

        let record_type = record_type.to_string();
        self.client
            .get(&self.endpoint)
            .query(&[("name", host), ("type", record_type.as_str())])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(lookup_err)?
            .json::<DohResponse>()
            .await
            .map_err(lookup_err)
    }
}

#[async_trait]
impl HostResolver for DohResolver {
    fn name(&self) -> &str {
        "https"
    }

    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        debug!(host = %host, endpoint = %self.endpoint, "Resolving over HTTPS");

        let mut addrs = self.query(host, RECORD_TYPE_A).await?.addresses(host)?;
        if addrs.is_empty() {
            addrs = self.query(host, RECORD_TYPE_AAAA).await?.addresses(host)?;
        }

        if addrs.is_empty() {
            return Err(ResolveError::NoAddresses(host.to_string()));
        }
        Ok(addrs)
    }
}

/// `application/dns-json` response body.
#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u16,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

impl DohResponse {
    // CNAME records in the chain are skipped; only A/AAAA data is kept.
    fn addresses(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        if self.status != 0 {
            return Err(ResolveError::Status {
                host: host.to_string(),
                status: self.status,
            });
        }

        Ok(self
            .answer
            .iter()
            .filter(|a| a.record_type == RECORD_TYPE_A || a.record_type == RECORD_TYPE_AAAA)
            .filter_map(|a| a.data.parse().ok())
            .collect())
    }
}
