//! Immutable per-record configuration
//!
//! A [`Settings`] describes one DNS record to keep updated. The fields shared by every
//! provider live on the struct; the credentials live in [`Credentials`], one variant
//! per provider, so a record can only carry the fields its provider understands.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "provider": "cloudflare",
//!   "domain": "example.com",
//!   "host": "@",
//!   "ip_method": "duckduckgo",
//!   "delay": 300,
//!   "user_service_key": "v1.0-...",
//!   "zone_identifier": "...",
//!   "identifier": "...",
//!   "proxied": true
//! }
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::grammar;
use crate::error::{Field, ValidationError};

/// Default period between two checks of the same record
pub const DEFAULT_DELAY: Duration = Duration::from_secs(300);

/// Supported DNS providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Namecheap,
    GoDaddy,
    DuckDns,
    Dreamhost,
    Cloudflare,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Namecheap,
        Provider::GoDaddy,
        Provider::DuckDns,
        Provider::Dreamhost,
        Provider::Cloudflare,
    ];

    /// Configuration name of the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Namecheap => "namecheap",
            Provider::GoDaddy => "godaddy",
            Provider::DuckDns => "duckdns",
            Provider::Dreamhost => "dreamhost",
            Provider::Cloudflare => "cloudflare",
        }
    }

    /// Whether the provider can discover the caller's public IP itself
    pub fn supports_ip_discovery(&self) -> bool {
        matches!(self, Provider::Namecheap | Provider::DuckDns)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("provider {s} is not supported"))
    }
}

/// How the public IP of a record is discovered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpMethod {
    /// Let the provider's update API use the address the request came from
    #[default]
    Provider,
    DuckDuckGo,
    OpenDns,
}

impl IpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpMethod::Provider => "provider",
            IpMethod::DuckDuckGo => "duckduckgo",
            IpMethod::OpenDns => "opendns",
        }
    }
}

impl fmt::Display for IpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-specific credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Credentials {
    Namecheap {
        password: String,
    },
    GoDaddy {
        key: String,
        secret: String,
    },
    DuckDns {
        token: String,
    },
    Dreamhost {
        key: String,
    },
    Cloudflare {
        #[serde(flatten)]
        auth: CloudflareAuth,
        zone_identifier: String,
        identifier: String,
        #[serde(default)]
        proxied: bool,
    },
}

impl Credentials {
    pub fn provider(&self) -> Provider {
        match self {
            Credentials::Namecheap { .. } => Provider::Namecheap,
            Credentials::GoDaddy { .. } => Provider::GoDaddy,
            Credentials::DuckDns { .. } => Provider::DuckDns,
            Credentials::Dreamhost { .. } => Provider::Dreamhost,
            Credentials::Cloudflare { .. } => Provider::Cloudflare,
        }
    }
}

/// The two Cloudflare authentication schemes
///
/// In the file format the scheme is picked by whether `user_service_key` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CloudflareAuthFields", into = "CloudflareAuthFields")]
pub enum CloudflareAuth {
    /// Global API key plus account email
    ApiKey { key: String, email: String },
    /// Origin CA user service key
    UserServiceKey { user_service_key: String },
}

#[derive(Clone, Default, Serialize, Deserialize)]
struct CloudflareAuthFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_service_key: Option<String>,
}

impl From<CloudflareAuthFields> for CloudflareAuth {
    fn from(fields: CloudflareAuthFields) -> Self {
        match fields.user_service_key {
            Some(user_service_key) if !user_service_key.is_empty() => {
                CloudflareAuth::UserServiceKey { user_service_key }
            }
            _ => CloudflareAuth::ApiKey {
                key: fields.key.unwrap_or_default(),
                email: fields.email.unwrap_or_default(),
            },
        }
    }
}

impl From<CloudflareAuth> for CloudflareAuthFields {
    fn from(auth: CloudflareAuth) -> Self {
        match auth {
            CloudflareAuth::ApiKey { key, email } => CloudflareAuthFields {
                key: Some(key),
                email: Some(email),
                user_service_key: None,
            },
            CloudflareAuth::UserServiceKey { user_service_key } => CloudflareAuthFields {
                user_service_key: Some(user_service_key),
                ..Default::default()
            },
        }
    }
}

/// Configuration of one DNS record to keep updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Registered domain, e.g. `example.com`
    pub domain: String,

    /// Host within the domain: `@` for the domain itself, `*` for the wildcard
    pub host: String,

    /// Public IP discovery method
    #[serde(default)]
    pub ip_method: IpMethod,

    /// Period between two checks of this record (seconds in the file format)
    #[serde(default = "default_delay", with = "duration_secs")]
    pub delay: Duration,

    /// Skip the DNS lookup that avoids redundant updates
    #[serde(default)]
    pub no_dns_lookup: bool,

    /// Provider and its credentials
    #[serde(flatten)]
    pub credentials: Credentials,
}

fn default_delay() -> Duration {
    DEFAULT_DELAY
}

impl Settings {
    /// Create settings with the default IP method and delay
    pub fn new(domain: impl Into<String>, host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            domain: domain.into(),
            host: host.into(),
            ip_method: IpMethod::default(),
            delay: DEFAULT_DELAY,
            no_dns_lookup: false,
            credentials,
        }
    }

    /// Set the IP discovery method
    pub fn with_ip_method(mut self, ip_method: IpMethod) -> Self {
        self.ip_method = ip_method;
        self
    }

    /// Set the check period
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Enable or disable the pre-update DNS lookup
    pub fn with_no_dns_lookup(mut self, no_dns_lookup: bool) -> Self {
        self.no_dns_lookup = no_dns_lookup;
        self
    }

    pub fn provider(&self) -> Provider {
        self.credentials.provider()
    }

    /// Fully qualified name the record resolves as
    ///
    /// The wildcard host resolves as the bare domain: updating a random
    /// subdomain under the wildcard is not implemented.
    pub fn build_domain_name(&self) -> String {
        match self.host.as_str() {
            "@" | "*" => self.domain.clone(),
            host => format!("{host}.{}", self.domain),
        }
    }

    /// Stable key used to persist this record's history
    pub fn record_key(&self) -> String {
        format!("{}:{}.{}", self.provider(), self.host, self.domain)
    }

    /// Check that the settings can be reconciled
    ///
    /// Settings that fail this check must never be scheduled.
    pub fn verify(&self) -> Result<(), ValidationError> {
        if !grammar::is_domain(&self.domain) {
            return Err(self.invalid(
                Field::Domain,
                format!("the domain name {:?} is not valid", self.domain),
            ));
        }
        if self.host.is_empty() {
            return Err(self.invalid(Field::Host, "the host must have at least one character"));
        }

        match &self.credentials {
            Credentials::Namecheap { password } => {
                if !grammar::is_namecheap_password(password) {
                    return Err(self.invalid(Field::Password, "the Namecheap password is not valid"));
                }
            }
            Credentials::GoDaddy { key, secret } => {
                if !grammar::is_godaddy_key(key) {
                    return Err(self.invalid(Field::Key, "the GoDaddy key is not valid"));
                }
                if !grammar::is_godaddy_secret(secret) {
                    return Err(self.invalid(Field::Secret, "the GoDaddy secret is not valid"));
                }
                self.ensure_ip_method_supported()?;
            }
            Credentials::DuckDns { token } => {
                if !grammar::is_duckdns_token(token) {
                    return Err(self.invalid(Field::Token, "the DuckDNS token is not valid"));
                }
                self.ensure_bare_domain()?;
            }
            Credentials::Dreamhost { key } => {
                if !grammar::is_dreamhost_key(key) {
                    return Err(self.invalid(Field::Key, "the Dreamhost key is not valid"));
                }
                self.ensure_bare_domain()?;
                self.ensure_ip_method_supported()?;
            }
            Credentials::Cloudflare {
                auth,
                zone_identifier,
                identifier,
                ..
            } => {
                match auth {
                    CloudflareAuth::ApiKey { key, email } => {
                        if !grammar::is_cloudflare_key(key) {
                            return Err(self.invalid(Field::Key, "the Cloudflare key is not valid"));
                        }
                        if !grammar::is_email(email) {
                            return Err(self.invalid(
                                Field::Email,
                                format!("the Cloudflare email {email:?} is not valid"),
                            ));
                        }
                    }
                    CloudflareAuth::UserServiceKey { user_service_key } => {
                        if !grammar::is_cloudflare_user_service_key(user_service_key) {
                            return Err(self.invalid(
                                Field::UserServiceKey,
                                "the Cloudflare user service key is not valid",
                            ));
                        }
                    }
                }
                if zone_identifier.is_empty() {
                    return Err(self.invalid(
                        Field::ZoneIdentifier,
                        "the Cloudflare zone identifier was not provided",
                    ));
                }
                if identifier.is_empty() {
                    return Err(self.invalid(
                        Field::Identifier,
                        "the Cloudflare identifier was not provided",
                    ));
                }
                self.ensure_ip_method_supported()?;
            }
        }

        Ok(())
    }

    fn ensure_bare_domain(&self) -> Result<(), ValidationError> {
        if self.host != "@" {
            return Err(self.invalid(
                Field::Host,
                format!("the host {:?} can only be @ for {}", self.host, self.provider()),
            ));
        }
        Ok(())
    }

    fn ensure_ip_method_supported(&self) -> Result<(), ValidationError> {
        if self.ip_method == IpMethod::Provider && !self.provider().supports_ip_discovery() {
            return Err(self.invalid(
                Field::IpMethod,
                format!(
                    "the provider {} does not support the IP update method {}",
                    self.provider(),
                    self.ip_method
                ),
            ));
        }
        Ok(())
    }

    fn invalid(&self, field: Field, reason: impl Into<String>) -> ValidationError {
        ValidationError::new(field, reason, self)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.domain,
            self.host,
            self.provider(),
            self.ip_method
        )
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
