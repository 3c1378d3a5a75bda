//! Multiserver addresses.
//!
//! Peers advertise where they can be dialed as `net:<host>:<port>~shs:<key>`.
//! Several alternatives may be joined with `;`. Only the `net:` part matters
//! here: it names the host the web hand-off targets.

use std::fmt;

use super::identity::Identity;

/// A dialable peer address, kept verbatim.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MultiserverAddress(String);

/// Host and port extracted from a `net:` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetAddress {
    /// Hostname or IP literal.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl MultiserverAddress {
    /// Wrap an address string.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `net:` host/port in the address, if any.
    pub fn net_address(&self) -> Option<NetAddress> {
        self.0.split(';').find_map(|alternative| {
            let transport = alternative.split('~').next()?;
            let rest = transport.strip_prefix("net:")?;
            let (host, port) = rest.rsplit_once(':')?;
            if host.is_empty() {
                return None;
            }
            let port = port.parse().ok()?;
            Some(NetAddress {
                host: host.to_owned(),
                port,
            })
        })
    }

    /// True if the address names a reachable `net:` host.
    pub fn is_valid(&self) -> bool {
        self.net_address().is_some()
    }
}

impl fmt::Display for MultiserverAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MultiserverAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiserverAddress({})", self.0)
    }
}

impl From<&str> for MultiserverAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One entry of the connectivity collaborator's peer lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEntry {
    /// Where the peer can be dialed.
    pub address: MultiserverAddress,
    /// Who the peer is.
    pub identity: Identity,
}

impl PeerEntry {
    /// Create a peer entry.
    pub fn new(address: impl Into<MultiserverAddress>, identity: Identity) -> Self {
        Self {
            address: address.into(),
            identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_address() {
        let addr = MultiserverAddress::new("net:something.com:8008~shs:AAAA");
        assert_eq!(
            addr.net_address(),
            Some(NetAddress {
                host: "something.com".into(),
                port: 8008
            })
        );
    }

    #[test]
    fn test_net_address_picks_first_net_segment() {
        let addr = MultiserverAddress::new("onion:xyz.onion:8008~shs:AA;net:10.0.0.2:9000~shs:AA");
        assert_eq!(addr.net_address().unwrap().host, "10.0.0.2");
    }

    #[test]
    fn test_net_address_ipv6() {
        let addr = MultiserverAddress::new("net:[::1]:8008~shs:AA");
        assert_eq!(addr.net_address().unwrap().host, "[::1]");
    }

    #[test]
    fn test_bad_addresses() {
        assert!(!MultiserverAddress::new("garbage").is_valid());
        assert!(!MultiserverAddress::new("net::8008~shs:AA").is_valid());
        assert!(!MultiserverAddress::new("net:host:notaport~shs:AA").is_valid());
        assert!(!MultiserverAddress::new("").is_valid());
    }
}
