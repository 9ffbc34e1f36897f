//! Credential and name grammars checked by [`Settings::verify`](super::Settings::verify).

use std::sync::LazyLock;

use regex::Regex;

/// RFC 1035 caps a full name at 253 characters.
const MAX_DOMAIN_LEN: usize = 253;

static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9_.-]+\.[a-zA-Z]{2,10}$"));
static NAMECHEAP_PASSWORD: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-f0-9]{32}$"));
static GODADDY_KEY: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z0-9]{10,14}_[A-Za-z0-9]{22}$"));
static GODADDY_SECRET: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z0-9]{22}$"));
static DUCKDNS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$")
});
static DREAMHOST_KEY: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-zA-Z0-9]{16}$"));
static CLOUDFLARE_KEY: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-zA-Z0-9]+$"));
static CLOUDFLARE_USER_SERVICE_KEY: LazyLock<Regex> = LazyLock::new(|| compile(r"^v1\.0.+$"));

fn compile(pattern: &str) -> Regex {
    // Patterns are literals above; a failure here is a programming error.
    Regex::new(pattern).unwrap_or_else(|e| unreachable!("grammar {pattern}: {e}"))
}

pub fn is_domain(s: &str) -> bool {
    s.len() <= MAX_DOMAIN_LEN && DOMAIN.is_match(s)
}

pub fn is_email(s: &str) -> bool {
    EMAIL.is_match(s)
}

pub fn is_namecheap_password(s: &str) -> bool {
    NAMECHEAP_PASSWORD.is_match(s)
}

pub fn is_godaddy_key(s: &str) -> bool {
    GODADDY_KEY.is_match(s)
}

pub fn is_godaddy_secret(s: &str) -> bool {
    GODADDY_SECRET.is_match(s)
}

pub fn is_duckdns_token(s: &str) -> bool {
    DUCKDNS_TOKEN.is_match(s)
}

pub fn is_dreamhost_key(s: &str) -> bool {
    DREAMHOST_KEY.is_match(s)
}

pub fn is_cloudflare_key(s: &str) -> bool {
    CLOUDFLARE_KEY.is_match(s)
}

pub fn is_cloudflare_user_service_key(s: &str) -> bool {
    CLOUDFLARE_USER_SERVICE_KEY.is_match(s)
}
