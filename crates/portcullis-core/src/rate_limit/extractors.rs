//! Client address extraction
//!
//! In standalone mode the peer address is authoritative. Behind a reverse
//! proxy the forwarding headers are consulted first, falling back to the
//! peer address when none of them carries a parsable IP.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Request};

use crate::app::{App, ServerMode};
use crate::prelude::*;

/// Client IP of a request according to the server mode
pub fn extract_client_ip<B>(req: &Request<B>, mode: ServerMode) -> Option<IpAddr> {
	client_ip(req.headers(), req.extensions(), mode)
}

fn client_ip(headers: &HeaderMap, extensions: &Extensions, mode: ServerMode) -> Option<IpAddr> {
	let peer = || extensions.get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip());
	match mode {
		ServerMode::Standalone => peer(),
		ServerMode::Proxy => forwarded_ip(headers).or_else(peer),
	}
}

/// Admission key of a request's client
pub fn client_key<B>(req: &Request<B>, mode: ServerMode) -> Option<AddressKey> {
	extract_client_ip(req, mode).map(|ip| AddressKey::from_ip(&ip))
}

// ClientKey //
//***********//
/// Admission key of the calling client, resolved with the app's server mode
#[derive(Debug, Clone, Copy)]
pub struct ClientKey(pub AddressKey);

impl FromRequestParts<App> for ClientKey {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
		client_ip(&parts.headers, &parts.extensions, state.opts.mode)
			.map(|ip| ClientKey(AddressKey::from_ip(&ip)))
			.ok_or_else(|| Error::ValidationError("Cannot determine client address".into()))
	}
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
	// "client, proxy1, proxy2": the leftmost entry is the original client
	header(headers, "x-forwarded-for")
		.and_then(|v| v.split(',').next())
		.and_then(parse_ip)
		.or_else(|| header(headers, "x-real-ip").and_then(parse_ip))
		.or_else(|| header(headers, "forwarded").and_then(parse_forwarded))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers.get(name).and_then(|h| h.to_str().ok())
}

/// RFC 7239: `for=192.0.2.60;proto=http` or `for="[2001:db8::1]:4711"`
fn parse_forwarded(value: &str) -> Option<IpAddr> {
	value
		.split(',')
		.next()?
		.split(';')
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(name, _)| name.eq_ignore_ascii_case("for"))
		.and_then(|(_, node)| {
			let node = node.trim_matches('"');
			match node.strip_prefix('[') {
				Some(rest) => rest.split(']').next().and_then(parse_ip),
				None => parse_ip(node).or_else(|| {
					node.rsplit_once(':').and_then(|(host, _port)| parse_ip(host))
				}),
			}
		})
}

fn parse_ip(value: &str) -> Option<IpAddr> {
	value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;

	fn request(headers: &[(&str, &str)], peer: Option<&str>) -> Request<Body> {
		let mut builder = Request::builder().uri("/api/contact");
		for (name, value) in headers {
			builder = builder.header(*name, *value);
		}
		let mut req = builder.body(Body::empty()).unwrap();
		if let Some(peer) = peer {
			req.extensions_mut().insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
		}
		req
	}

	#[test]
	fn test_standalone_uses_peer() {
		let req = request(&[("x-forwarded-for", "203.0.113.9")], Some("10.0.0.1:5555"));
		assert_eq!(
			extract_client_ip(&req, ServerMode::Standalone),
			Some("10.0.0.1".parse().unwrap())
		);
	}

	#[test]
	fn test_proxy_prefers_forwarded_for() {
		let req = request(
			&[("x-forwarded-for", "203.0.113.9, 10.0.0.2"), ("x-real-ip", "198.51.100.1")],
			Some("10.0.0.1:5555"),
		);
		assert_eq!(extract_client_ip(&req, ServerMode::Proxy), Some("203.0.113.9".parse().unwrap()));
	}

	#[test]
	fn test_proxy_header_fallbacks() {
		let req = request(&[("x-real-ip", " 198.51.100.1 ")], None);
		assert_eq!(extract_client_ip(&req, ServerMode::Proxy), Some("198.51.100.1".parse().unwrap()));

		let req = request(&[("forwarded", "for=\"[2001:db8::1]:4711\";proto=https")], None);
		assert_eq!(extract_client_ip(&req, ServerMode::Proxy), Some("2001:db8::1".parse().unwrap()));

		let req = request(&[("forwarded", "proto=http;For=192.0.2.60:8080")], None);
		assert_eq!(extract_client_ip(&req, ServerMode::Proxy), Some("192.0.2.60".parse().unwrap()));
	}

	#[test]
	fn test_proxy_falls_back_to_peer() {
		let req = request(&[("x-forwarded-for", "garbage")], Some("10.0.0.1:80"));
		assert_eq!(extract_client_ip(&req, ServerMode::Proxy), Some("10.0.0.1".parse().unwrap()));
	}

	#[test]
	fn test_client_key() {
		let req = request(&[], Some("[::ffff:10.0.0.7]:80"));
		assert_eq!(client_key(&req, ServerMode::Standalone), Some("10.0.0.7".parse().unwrap()));
		assert_eq!(client_key(&request(&[], None), ServerMode::Standalone), None);
	}
}

// vim: ts=4
