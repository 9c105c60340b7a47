//! Canonical client address keys
//!
//! Every per-client table in the admission pipeline is keyed by an
//! `AddressKey`. IPv4 hosts are tracked individually, IPv6 hosts by their
//! /64 subnet since a single client usually controls a whole /64.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum AddressKey {
	/// IPv4 individual (/32)
	Ipv4(Ipv4Addr),
	/// IPv6 /64 subnet
	Ipv6Subnet([u8; 8]),
}

impl AddressKey {
	/// Create the key for a remote address
	///
	/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) produce the same key as
	/// the plain IPv4 address, so dual-stack listeners stay consistent.
	pub fn from_ip(addr: &IpAddr) -> Self {
		match addr {
			IpAddr::V4(ip) => AddressKey::Ipv4(*ip),
			IpAddr::V6(ip) => {
				if let Some(v4) = ip.to_ipv4_mapped() {
					return AddressKey::Ipv4(v4);
				}
				let octets = ip.octets();
				let mut subnet = [0u8; 8];
				subnet.copy_from_slice(&octets[..8]);
				AddressKey::Ipv6Subnet(subnet)
			}
		}
	}

	pub fn is_ipv4(&self) -> bool {
		matches!(self, AddressKey::Ipv4(_))
	}

	/// Address level name for logging/responses
	pub fn level_name(&self) -> &'static str {
		match self {
			AddressKey::Ipv4(_) => "ipv4_individual",
			AddressKey::Ipv6Subnet(_) => "ipv6_subnet",
		}
	}
}

impl From<IpAddr> for AddressKey {
	fn from(addr: IpAddr) -> Self {
		Self::from_ip(&addr)
	}
}

impl From<Ipv4Addr> for AddressKey {
	fn from(addr: Ipv4Addr) -> Self {
		AddressKey::Ipv4(addr)
	}
}

impl fmt::Display for AddressKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AddressKey::Ipv4(ip) => write!(f, "{}", ip),
			AddressKey::Ipv6Subnet(prefix) => {
				let mut octets = [0u8; 16];
				octets[..8].copy_from_slice(prefix);
				write!(f, "{}/64", Ipv6Addr::from(octets))
			}
		}
	}
}

impl FromStr for AddressKey {
	type Err = Error;

	/// Parses an IP literal; a `/64` suffix is accepted for IPv6 keys
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		let literal = s.strip_suffix("/64").unwrap_or(s);
		literal
			.parse::<IpAddr>()
			.map(|ip| Self::from_ip(&ip))
			.map_err(|_| Error::ValidationError(format!("Invalid address: {}", s)))
	}
}

impl Serialize for AddressKey {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for AddressKey {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ipv4_key() {
		let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
		let key = AddressKey::from_ip(&ip);

		assert!(key.is_ipv4());
		assert_eq!(key, AddressKey::Ipv4(Ipv4Addr::new(10, 0, 0, 1)));
		assert_eq!(key.to_string(), "10.0.0.1");
		assert_eq!(key.level_name(), "ipv4_individual");
	}

	#[test]
	fn test_ipv6_hosts_share_subnet_key() {
		let a = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0x85a3, 0, 0, 0, 0, 1));
		let b = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0x85a3, 0, 0xdead, 0xbeef, 0, 2));
		let other = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0x85a3, 1, 0, 0, 0, 1));

		assert_eq!(AddressKey::from_ip(&a), AddressKey::from_ip(&b));
		assert_ne!(AddressKey::from_ip(&a), AddressKey::from_ip(&other));
		assert_eq!(AddressKey::from_ip(&a).to_string(), "2001:db8:85a3::/64");
	}

	#[test]
	fn test_ipv4_mapped_normalizes() {
		let mapped: IpAddr = "::ffff:192.168.1.100".parse().unwrap();
		let plain: IpAddr = "192.168.1.100".parse().unwrap();

		assert_eq!(AddressKey::from_ip(&mapped), AddressKey::from_ip(&plain));
	}

	#[test]
	fn test_parse_and_display_agree() {
		for s in ["10.0.0.2", "2001:db8::/64"] {
			let key: AddressKey = s.parse().unwrap();
			assert_eq!(key.to_string(), s);
			assert_eq!(key.to_string().parse::<AddressKey>().unwrap(), key);
		}
		assert!("not-an-ip".parse::<AddressKey>().is_err());
	}

	#[test]
	fn test_serde_as_string() {
		let key: AddressKey = "10.0.0.3".parse().unwrap();
		let json = serde_json::to_string(&key).unwrap();
		assert_eq!(json, "\"10.0.0.3\"");

		let keys: Vec<AddressKey> = serde_json::from_str("[\"10.0.0.3\", \"10.0.0.4\"]").unwrap();
		assert_eq!(keys.len(), 2);
		assert_eq!(keys[0], key);
	}
}

// vim: ts=4
