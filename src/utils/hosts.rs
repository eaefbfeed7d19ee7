//! Host matching utilities for blocklist evaluation.
//!
//! Every URL or host string that reaches the policy layer goes through
//! `canonical_host` first, so policy entries and navigation targets compare
//! on the same form: lowercase hostname, no scheme, port, path or leading `www.`.

use url::Url;

/// Hosts used by development tooling that must never replace the homepage
/// when they show up as a launch URL.
const DEV_HOST_SUFFIXES: &[&str] = &[
    "expo.dev",
    "expo.app",
    "expo.run",
    "expo.test",
    "exp.host",
    "exp.direct",
];

/// Dev-server ports that mark a private-network URL as tooling noise.
const DEV_PORTS: &[u16] = &[19000, 19001, 19002, 19006, 8081];

/// Returns true if `value` starts with an `scheme://` prefix (letters only).
pub fn has_scheme(value: &str) -> bool {
    match value.find("://") {
        Some(idx) if idx > 0 => value[..idx].chars().all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// Returns true if `value` starts with `http://` or `https://` (any case).
pub fn is_http_url(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Reduce a URL or bare hostname to its canonical comparable host.
///
/// Never fails: input that does not parse as a URL is treated as a raw
/// hostname. The result may be empty.
pub fn canonical_host(input: &str) -> String {
    let trimmed = input.trim();
    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let host = match Url::parse(&candidate) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_string(),
        Err(_) => trimmed.to_string(),
    };

    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Whether a launch URL is development-tooling noise (or unparseable) and
/// should send the shell home instead of being opened.
pub fn is_internal_launch_url(url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return true,
    };

    if !parsed.scheme().starts_with("http") {
        return true;
    }

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    if DEV_HOST_SUFFIXES
        .iter()
        .any(|suffix| host == *suffix || host.ends_with(&format!(".{}", suffix)))
    {
        return true;
    }

    if is_private_dev_host(&host) {
        let port = parsed.port_or_known_default().unwrap_or(80);
        return DEV_PORTS.contains(&port);
    }

    false
}

fn is_private_dev_host(host: &str) -> bool {
    if host == "localhost"
        || host.starts_with("127.")
        || host.starts_with("10.")
        || host.starts_with("192.168.")
    {
        return true;
    }
    // 172.16.0.0/12
    host.strip_prefix("172.")
        .and_then(|rest| rest.split('.').next())
        .and_then(|octet| octet.parse::<u8>().ok())
        .map_or(false, |octet| (16..=31).contains(&octet))
}
