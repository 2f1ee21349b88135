//! Site identity based on registrable domains.
//!
//! Uses the Public Suffix List (`psl`) so `blog.example.co.uk` and
//! `www.example.co.uk` are recognised as the same site while `example.co.uk`
//! and `other.co.uk` are not. Hosts without a registrable domain (IP literals,
//! `localhost`) are compared by exact host instead.

use url::{Host, Url};

/// Extracts the registrable domain from a host name.
///
/// # Returns
///
/// The lowercase registrable domain (e.g. `example.com` for `www.Example.com`),
/// or `None` for IP literals and hosts that are themselves a public suffix.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.parse::<std::net::IpAddr>().is_ok() || host.starts_with('[') {
        return None;
    }
    psl::domain_str(&host).map(str::to_string)
}

/// Key identifying the site a URL belongs to.
///
/// The registrable domain when there is one, otherwise the bare host.
pub fn site_key(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => {
            registrable_domain(domain).or_else(|| Some(domain.to_ascii_lowercase()))
        }
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// Returns `true` if both URLs belong to the same site.
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (site_key(a), site_key(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
