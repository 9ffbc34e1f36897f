//! Contract Test: Status Page Rows
//!
//! Constraints verified:
//! - The up-to-date message is computed at render time from the last success
//! - Empty histories render `N/A` for the current and prior IPs
//! - Rendering never changes the record it reads
//!
//! If this test fails, the status page shows stale or misleading state.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::*;
use ddns_core::display::{DisplayRow, NOT_AVAILABLE};
use ddns_core::record::{History, RecordSet, RecordState, StatusCode};

#[test]
fn up_to_date_message_is_regenerated_at_render_time() {
    let last_success = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let record = RecordState::new(duckdns("@"), History::new(vec![ip("1.2.3.4")], Some(last_success)));
    record.apply_outcome_at(ip("1.2.3.4"), true, "stale text", last_success);
    let snapshot = record.snapshot();
    assert_eq!(snapshot.status.code, StatusCode::UpToDate);

    let row = DisplayRow::from_snapshot(&snapshot, last_success + Duration::minutes(5));
    assert!(row.status.contains("No IP change for 5m"), "{}", row.status);
    assert!(!row.status.contains("stale text"));

    let later = DisplayRow::from_snapshot(&snapshot, last_success + Duration::days(3));
    assert!(later.status.contains("No IP change for 3d"), "{}", later.status);
}

#[test]
fn up_to_date_without_success_time_is_not_available() {
    let record = RecordState::new(duckdns("@"), History::new(vec![ip("1.2.3.4")], None));
    record.mark_up_to_date();

    let row = DisplayRow::from_snapshot(&record.snapshot(), Utc::now());
    assert!(row.status.contains("No IP change for N/A"), "{}", row.status);
}

#[test]
fn empty_history_renders_placeholders() {
    let record = RecordState::new(namecheap("www"), History::default());
    let row = DisplayRow::from_snapshot(&record.snapshot(), Utc::now());

    assert_eq!(row.current_ip, NOT_AVAILABLE);
    assert_eq!(row.prior_ips, vec![NOT_AVAILABLE.to_string()]);
    assert_eq!(row.host, "www");
    assert!(row.domain.contains("http://www.example.com"));
    assert!(row.provider.contains("Namecheap"));
}

#[test]
fn current_and_prior_ips_are_split() {
    let history = History::new(vec![ip("5.6.7.8"), ip("1.2.3.4"), ip("9.9.9.9")], None);
    let record = RecordState::new(godaddy("www"), history);
    record.mark_failed("401 Unauthorized");

    let row = DisplayRow::from_snapshot(&record.snapshot(), Utc::now());

    assert!(row.current_ip.contains("https://ipinfo.io/5.6.7.8"));
    assert_eq!(row.prior_ips, vec!["1.2.3.4".to_string(), "9.9.9.9".to_string()]);
    assert!(row.status.contains("Failure"));
    assert!(row.status.contains("401 Unauthorized"));
    assert!(row.ip_method.contains("OpenDNS"));
}

#[test]
fn rendering_leaves_records_untouched() {
    let mut records = RecordSet::new();
    let id = records
        .insert(duckdns("@"), History::new(vec![ip("1.2.3.4")], Some(Utc::now())))
        .unwrap();
    let record = records.get(id).unwrap();
    record.apply_outcome(ip("1.2.3.4"), true, "ok");
    let before = record.snapshot();

    let rows = records.display_rows(Utc::now() + Duration::hours(2));
    assert_eq!(rows.len(), 1);
    assert!(rows[0].status.contains("No IP change for 2h"), "{}", rows[0].status);

    assert_eq!(record.snapshot(), before);
}
