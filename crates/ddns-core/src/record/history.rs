use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of IPs kept per record, current one included
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Observed public IPs of a record and the time of its last successful update
///
/// `ips` is most-recent-first: `ips[0]` is the current IP, the rest is a
/// bounded trailing log of the IPs seen before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub ips: Vec<IpAddr>,
    #[serde(default)]
    pub last_success: Option<DateTime<Utc>>,
    /// IP the provider last accepted; `None` until a push succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_ip: Option<IpAddr>,
}

impl History {
    pub fn new(ips: Vec<IpAddr>, last_success: Option<DateTime<Utc>>) -> Self {
        Self {
            ips,
            last_success,
            accepted_ip: None,
        }
    }

    pub fn with_accepted_ip(mut self, ip: IpAddr) -> Self {
        self.accepted_ip = Some(ip);
        self
    }

    /// Whether the provider already points the record at `ip`
    ///
    /// A rejected push still becomes the current IP, so matching `ips[0]`
    /// alone is not enough.
    pub fn is_accepted(&self, ip: IpAddr) -> bool {
        self.current_ip() == Some(ip) && self.accepted_ip == Some(ip)
    }

    /// Most recently observed IP
    pub fn current_ip(&self) -> Option<IpAddr> {
        self.ips.first().copied()
    }

    /// IPs observed before the current one, newest first
    pub fn previous_ips(&self) -> &[IpAddr] {
        self.ips.get(1..).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    /// Record an observed IP
    ///
    /// Prepends `ip` unless it already is the current IP, then drops the oldest
    /// entries beyond `capacity`. Returns whether the history grew a new head.
    pub(crate) fn observe(&mut self, ip: IpAddr, capacity: usize) -> bool {
        if self.current_ip() == Some(ip) {
            return false;
        }
        self.ips.insert(0, ip);
        self.ips.truncate(capacity.max(1));
        true
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_success {
            Some(at) => write!(f, "Last success update: {}", at.to_rfc3339())?,
            None => write!(f, "Last success update: never")?,
        }
        let ips: Vec<String> = self.ips.iter().map(IpAddr::to_string).collect();
        write!(f, "; IPs: {}", ips.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn observe_prepends_only_new_ips() {
        let mut history = History::new(vec![ip("1.2.3.4")], None);

        assert!(!history.observe(ip("1.2.3.4"), DEFAULT_HISTORY_CAPACITY));
        assert_eq!(history.ips, vec![ip("1.2.3.4")]);

        assert!(history.observe(ip("5.6.7.8"), DEFAULT_HISTORY_CAPACITY));
        assert_eq!(history.ips, vec![ip("5.6.7.8"), ip("1.2.3.4")]);
        assert_eq!(history.previous_ips(), &[ip("1.2.3.4")]);
    }

    #[test]
    fn observe_drops_oldest_beyond_capacity() {
        let mut history = History::default();
        for i in 0..5u8 {
            history.observe(IpAddr::from([10, 0, 0, i]), 3);
        }
        assert_eq!(
            history.ips,
            vec![ip("10.0.0.4"), ip("10.0.0.3"), ip("10.0.0.2")]
        );
    }

    #[test]
    fn empty_history_has_no_current_ip() {
        let history = History::default();
        assert_eq!(history.current_ip(), None);
        assert!(history.previous_ips().is_empty());
        assert_eq!(history.to_string(), "Last success update: never; IPs: ");
    }

    #[test]
    fn current_ip_is_accepted_only_once_a_push_succeeded() {
        let rejected =
            History::new(vec![ip("5.6.7.8"), ip("1.2.3.4")], None).with_accepted_ip(ip("1.2.3.4"));
        assert!(!rejected.is_accepted(ip("5.6.7.8")));
        assert!(!rejected.is_accepted(ip("1.2.3.4")));

        let accepted = History::new(vec![ip("5.6.7.8")], None).with_accepted_ip(ip("5.6.7.8"));
        assert!(accepted.is_accepted(ip("5.6.7.8")));
    }

    #[test]
    fn histories_without_accepted_ip_still_load() {
        let history: History =
            serde_json::from_str(r#"{"ips":["1.2.3.4"],"last_success":null}"#).unwrap();
        assert_eq!(history.current_ip(), Some(ip("1.2.3.4")));
        assert_eq!(history.accepted_ip, None);
        assert!(!serde_json::to_string(&history).unwrap().contains("accepted_ip"));
    }
}
