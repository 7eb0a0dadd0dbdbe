//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Listen and connect target resolution.
//!
//! A target is either a `telnet://` URL or a bare `host`/`host:port`/
//! `[v6]:port`. Resolution expands it to socket addresses filtered by
//! the requested IP version set.

use crate::{ServiceError, ServiceResult};
use std::net::SocketAddr;

/// The HLX wire protocol's default TCP port.
pub const DEFAULT_PORT: u16 = 23;

/// Which IP versions a listen or connect operation may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpVersions {
    /// Admit IPv4 addresses.
    pub v4: bool,
    /// Admit IPv6 addresses.
    pub v6: bool,
}

impl Default for IpVersions {
    fn default() -> Self {
        Self { v4: true, v6: true }
    }
}

impl IpVersions {
    /// Both versions, the default.
    pub fn both() -> Self {
        Self::default()
    }

    /// IPv4 only.
    pub fn v4_only() -> Self {
        Self { v4: true, v6: false }
    }

    /// IPv6 only.
    pub fn v6_only() -> Self {
        Self { v4: false, v6: true }
    }

    /// Returns whether `address` is admitted.
    pub fn admits(&self, address: &SocketAddr) -> bool {
        match address {
            SocketAddr::V4(_) => self.v4,
            SocketAddr::V6(_) => self.v6,
        }
    }

    /// The wildcard listen addresses for the admitted versions.
    pub fn wildcards(&self, port: u16) -> Vec<SocketAddr> {
        let mut addresses = Vec::new();
        if self.v4 {
            addresses.push(SocketAddr::new("0.0.0.0".parse().unwrap(), port));
        }
        if self.v6 {
            addresses.push(SocketAddr::new("::".parse().unwrap(), port));
        }
        addresses
    }
}

/// Parses a target into `(host, port)` without resolving it.
///
/// Accepted forms: `telnet://host[:port]`, `host[:port]`, `[v6][:port]`,
/// and a bare IPv6 address. A scheme other than `telnet` is rejected.
pub fn parse_target(target: &str) -> ServiceResult<(String, u16)> {
    let rest = match target.split_once("://") {
        Some(("telnet", rest)) => rest,
        Some((scheme, _)) => {
            return Err(ServiceError::InvalidUrl(format!(
                "unsupported scheme {scheme:?}"
            )));
        }
        None => target,
    };
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    if rest.is_empty() {
        return Err(ServiceError::InvalidUrl("empty host".to_string()));
    }

    if let Some(bracketed) = rest.strip_prefix('[') {
        // [v6] or [v6]:port
        let Some((host, tail)) = bracketed.split_once(']') else {
            return Err(ServiceError::InvalidUrl(target.to_string()));
        };
        let port = match tail.strip_prefix(':') {
            Some(port) => port
                .parse()
                .map_err(|_| ServiceError::InvalidUrl(target.to_string()))?,
            None if tail.is_empty() => DEFAULT_PORT,
            None => return Err(ServiceError::InvalidUrl(target.to_string())),
        };
        return Ok((host.to_string(), port));
    }

    match rest.matches(':').count() {
        0 => Ok((rest.to_string(), DEFAULT_PORT)),
        1 => {
            let (host, port) = rest.split_once(':').unwrap();
            let port = port
                .parse()
                .map_err(|_| ServiceError::InvalidUrl(target.to_string()))?;
            Ok((host.to_string(), port))
        }
        // A bare IPv6 address.
        _ => Ok((rest.to_string(), DEFAULT_PORT)),
    }
}

/// Resolves a target to socket addresses admitted by `versions`.
pub async fn resolve(target: &str, versions: IpVersions) -> ServiceResult<Vec<SocketAddr>> {
    let (host, port) = parse_target(target)?;

    let addresses: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(ServiceError::from)?
        .filter(|address| versions.admits(address))
        .collect();

    if addresses.is_empty() {
        return Err(ServiceError::InvalidUrl(format!(
            "no addresses for {host:?} admitted by the requested IP versions"
        )));
    }

    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_host() {
        assert_eq!(
            parse_target("hlx.local").unwrap(),
            ("hlx.local".to_string(), DEFAULT_PORT)
        );
    }

    #[test]
    fn test_parse_host_port() {
        assert_eq!(
            parse_target("127.0.0.1:9023").unwrap(),
            ("127.0.0.1".to_string(), 9023)
        );
    }

    #[test]
    fn test_parse_telnet_url() {
        assert_eq!(
            parse_target("telnet://127.0.0.1:9023").unwrap(),
            ("127.0.0.1".to_string(), 9023)
        );
        assert_eq!(
            parse_target("telnet://hlx.local/").unwrap(),
            ("hlx.local".to_string(), DEFAULT_PORT)
        );
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(matches!(
            parse_target("http://example.com"),
            Err(ServiceError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_ipv6_forms() {
        assert_eq!(
            parse_target("[::1]:9023").unwrap(),
            ("::1".to_string(), 9023)
        );
        assert_eq!(parse_target("[::1]").unwrap(), ("::1".to_string(), DEFAULT_PORT));
        assert_eq!(parse_target("::1").unwrap(), ("::1".to_string(), DEFAULT_PORT));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_target("").is_err());
        assert!(parse_target("host:port").is_err());
        assert!(parse_target("[::1").is_err());
    }

    #[test]
    fn test_version_filter() {
        let v4: SocketAddr = "127.0.0.1:23".parse().unwrap();
        let v6: SocketAddr = "[::1]:23".parse().unwrap();

        assert!(IpVersions::both().admits(&v4));
        assert!(IpVersions::both().admits(&v6));
        assert!(IpVersions::v4_only().admits(&v4));
        assert!(!IpVersions::v4_only().admits(&v6));
        assert!(!IpVersions::v6_only().admits(&v4));
        assert!(IpVersions::v6_only().admits(&v6));
    }

    #[test]
    fn test_wildcards() {
        let both = IpVersions::both().wildcards(23);
        assert_eq!(both.len(), 2);

        let v4 = IpVersions::v4_only().wildcards(23);
        assert_eq!(v4.len(), 1);
        assert!(v4[0].is_ipv4());
    }

    #[tokio::test]
    async fn test_resolve_loopback() {
        let addresses = resolve("127.0.0.1:9023", IpVersions::v4_only())
            .await
            .unwrap();
        assert_eq!(addresses, vec!["127.0.0.1:9023".parse().unwrap()]);
    }

    #[tokio::test]
    async fn test_resolve_version_mismatch() {
        let result = resolve("127.0.0.1:9023", IpVersions::v6_only()).await;
        assert!(matches!(result, Err(ServiceError::InvalidUrl(_))));
    }
}
