//! Display rows for the status page
//!
//! [`DisplayRow::from_snapshot`] is a pure projection of a [`RecordSnapshot`]:
//! it never takes a record lock and never mutates status or history. The
//! "no IP change for ..." wording of up-to-date records is computed here, at
//! render time, from the history's last success time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::{IpMethod, Provider, RecordSnapshot, Settings, Status, StatusCode};

/// Placeholder shown when there is no IP to display
pub const NOT_AVAILABLE: &str = "N/A";

/// One rendered record, HTML fragments ready for a table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    /// Link to the record's name, labelled with the domain
    pub domain: String,
    pub host: String,
    /// Link to the provider's site
    pub provider: String,
    /// Link to the IP discovery service
    pub ip_method: String,
    pub status: String,
    /// Link to the current IP's details, or `N/A`
    pub current_ip: String,
    /// Previous IPs, newest first, or a single `N/A`
    pub prior_ips: Vec<String>,
}

impl DisplayRow {
    /// Render `snapshot` as seen at `now`
    pub fn from_snapshot(snapshot: &RecordSnapshot, now: DateTime<Utc>) -> Self {
        let settings = &snapshot.settings;
        let history = &snapshot.history;

        let status = if snapshot.status.code == StatusCode::UpToDate {
            let since = history
                .last_success
                .map(|at| format_elapsed(at, now))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            status_html(&Status::new(StatusCode::UpToDate, format!("No IP change for {since}")))
        } else {
            status_html(&snapshot.status)
        };

        let current_ip = match history.current_ip() {
            Some(ip) => format!("<a href=\"https://ipinfo.io/{ip}\">{ip}</a>"),
            None => NOT_AVAILABLE.to_string(),
        };

        let prior_ips = if history.previous_ips().is_empty() {
            vec![NOT_AVAILABLE.to_string()]
        } else {
            history.previous_ips().iter().map(ToString::to_string).collect()
        };

        Self {
            domain: domain_html(settings),
            host: escape_html(&settings.host),
            provider: provider_html(settings.provider()),
            ip_method: ip_method_html(settings),
            status,
            current_ip,
            prior_ips,
        }
    }
}

fn domain_html(settings: &Settings) -> String {
    format!(
        "<a href=\"http://{}\">{}</a>",
        escape_html(&settings.build_domain_name()),
        escape_html(&settings.domain)
    )
}

fn provider_html(provider: Provider) -> String {
    let (url, label) = match provider {
        Provider::Namecheap => ("https://namecheap.com", "Namecheap"),
        Provider::GoDaddy => ("https://godaddy.com", "GoDaddy"),
        Provider::DuckDns => ("https://duckdns.org", "DuckDNS"),
        Provider::Dreamhost => ("https://www.dreamhost.com/", "Dreamhost"),
        Provider::Cloudflare => ("https://www.cloudflare.com", "Cloudflare"),
    };
    format!("<a href=\"{url}\">{label}</a>")
}

fn ip_method_html(settings: &Settings) -> String {
    match settings.ip_method {
        IpMethod::Provider => provider_html(settings.provider()),
        IpMethod::DuckDuckGo => "<a href=\"https://duckduckgo.com/?q=ip\">DuckDuckGo</a>".to_string(),
        IpMethod::OpenDns => "<a href=\"https://diagnostic.opendns.com/myip\">OpenDNS</a>".to_string(),
    }
}

fn status_html(status: &Status) -> String {
    let color = match status.code {
        StatusCode::Success => "green",
        StatusCode::Failure => "red",
        StatusCode::UpToDate => "#00CC66",
        StatusCode::Updating => "orange",
    };
    if status.message.is_empty() {
        format!("<span style=\"color:{color}\"><b>{}</b></span>", status.code)
    } else {
        format!(
            "<span style=\"color:{color}\"><b>{}</b>, {}</span>",
            status.code,
            escape_html(&status.message)
        )
    }
}

/// Coarse elapsed time: `42s`, `5m`, `3h`, `12d`
pub fn format_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(since).max(chrono::Duration::zero());
    if elapsed < chrono::Duration::minutes(1) {
        format!("{}s", elapsed.num_seconds())
    } else if elapsed < chrono::Duration::hours(1) {
        format!("{}m", elapsed.num_minutes())
    } else if elapsed < chrono::Duration::days(1) {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}d", elapsed.num_days())
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
