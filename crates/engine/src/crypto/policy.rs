use std::net::IpAddr;

use openssl::error::ErrorStack;
use openssl::x509::verify::X509VerifyParamRef;
use url::Host;

use crate::domain::error::{EngineError, EngineResult};

/// Name the leaf certificate must be valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerName {
    Dns(String),
    Ip(IpAddr),
}

/// SSL server policy bound to one host, the equivalent of a platform
/// "SSL policy for hostname" object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SslPolicy {
    name: PeerName,
}

impl SslPolicy {
    pub fn peer_name(&self) -> &PeerName {
        &self.name
    }

    /// Bind verification to the policy's name: DNS names are checked against
    /// SAN dNSName entries, IP literals against SAN iPAddress entries.
    pub fn apply(&self, param: &mut X509VerifyParamRef) -> Result<(), ErrorStack> {
        match &self.name {
            PeerName::Dns(name) => param.set_host(name),
            PeerName::Ip(ip) => param.set_ip(*ip),
        }
    }
}

/// Build the host-scoped policy for the host of the current challenge.
pub fn build_ssl_policy(host: &str) -> EngineResult<SslPolicy> {
    let host = host.trim();
    if host.is_empty() {
        return Err(EngineError::Config("policy host is empty".into()));
    }
    // Bare IPv6 literals arrive without brackets from some transports.
    let parsed = match host.parse::<IpAddr>() {
        Ok(ip) => return Ok(SslPolicy { name: PeerName::Ip(ip) }),
        Err(_) => Host::parse(host)
            .map_err(|e| EngineError::Config(format!("invalid policy host '{host}': {e}")))?,
    };
    let name = match parsed {
        Host::Domain(d) => PeerName::Dns(d.trim_end_matches('.').to_string()),
        Host::Ipv4(a) => PeerName::Ip(IpAddr::V4(a)),
        Host::Ipv6(a) => PeerName::Ip(IpAddr::V6(a)),
    };
    Ok(SslPolicy { name })
}
