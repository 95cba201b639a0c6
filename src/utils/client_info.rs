//! Request metadata extraction and click enrichment helpers.
//!
//! Capturing happens on the request path and only copies headers. Hashing, parsing and
//! truncation run later on the click worker.

use axum::http::{HeaderMap, header};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::net::{IpAddr, SocketAddr};
use url::Url;

use crate::domain::click_event::RequestContext;

type HmacSha256 = Hmac<Sha256>;

pub const MAX_USER_AGENT_LENGTH: usize = 512;
pub const MAX_REFERRER_LENGTH: usize = 512;
pub const MAX_REFERRER_DOMAIN_LENGTH: usize = 255;

/// Builds a [`RequestContext`] from request headers and the peer address.
///
/// Forwarding and edge-country headers are client-controlled unless a trusted proxy
/// rewrites them, so they are read only when `behind_proxy` is set.
pub fn capture_request_context(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    behind_proxy: bool,
) -> RequestContext {
    RequestContext {
        client_ip: client_ip(headers, peer, behind_proxy),
        user_agent: header_string(headers, header::USER_AGENT.as_str()),
        referrer: header_string(headers, header::REFERER.as_str()),
        country_code: if behind_proxy {
            country_code(headers)
        } else {
            None
        },
    }
}

/// Resolves the client IP.
///
/// Behind a proxy: first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer.
/// Otherwise the peer address only.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> Option<IpAddr> {
    if behind_proxy {
        let forwarded = header_string(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next().and_then(|ip| ip.trim().parse().ok()));

        if let Some(ip) = forwarded {
            return Some(ip);
        }

        if let Some(ip) = header_string(headers, "x-real-ip").and_then(|v| v.trim().parse().ok()) {
            return Some(ip);
        }
    }

    peer.map(|addr| addr.ip())
}

/// Two-letter country code from edge headers.
///
/// `CF-IPCountry` wins unless it is `XX` (unknown), then `X-Country-Code`.
pub fn country_code(headers: &HeaderMap) -> Option<String> {
    let cloudflare = header_string(headers, "cf-ipcountry").filter(|c| c.trim() != "XX");

    cloudflare
        .or_else(|| header_string(headers, "x-country-code"))
        .and_then(|raw| {
            let code: String = raw.trim().chars().take(2).collect::<String>().to_uppercase();
            (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())).then_some(code)
        })
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Host of a referrer URL, lower-cased and capped at 255 characters.
pub fn referrer_domain(referrer: &str) -> Option<String> {
    let url = Url::parse(referrer).ok()?;
    let host = url.host_str()?.to_lowercase();

    Some(truncate_chars(&host, MAX_REFERRER_DOMAIN_LENGTH))
}

/// Cuts `value` to at most `max` characters without splitting a code point.
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

/// One-way hashing of client IPs.
///
/// With a secret the hash is HMAC-SHA256, so stored values cannot be reversed by
/// enumerating the address space. Without one it is plain SHA-256.
/// Output is always 64 lowercase hex characters.
#[derive(Clone)]
pub struct IpHasher {
    secret: Option<Vec<u8>>,
}

impl IpHasher {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.as_bytes().to_vec()),
        }
    }

    pub fn is_keyed(&self) -> bool {
        self.secret.is_some()
    }

    pub fn hash(&self, ip: &IpAddr) -> String {
        let input = ip.to_string();

        match &self.secret {
            Some(secret) => {
                let mut mac =
                    HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
                mac.update(input.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            }
            None => hex::encode(Sha256::digest(input.as_bytes())),
        }
    }
}
