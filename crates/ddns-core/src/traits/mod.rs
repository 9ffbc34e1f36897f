//! Collaborator interfaces consumed by the DDNS core
//!
//! The core never talks to a provider, an IP echo service or a disk itself.
//! It drives these traits instead:
//!
//! - [`Updater`]: push an IP to one provider's update API
//! - [`IpGetter`]: discover the current public IP with one method
//! - [`HistoryStore`]: persist each record's [`History`](crate::record::History)
//! - [`HostResolver`]: resolve a record's name before deciding to update it

pub mod history_store;
pub mod ip_getter;
pub mod resolver;
pub mod updater;

pub use history_store::HistoryStore;
pub use ip_getter::IpGetter;
pub use resolver::{HostResolver, SystemResolver};
pub use updater::{UpdateReport, Updater};
