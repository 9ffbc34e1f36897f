// # IP Getter Trait
//
// Defines the interface for discovering the current public IP address.

use async_trait::async_trait;
use std::net::IpAddr;

use crate::record::IpMethod;

/// A public IP discovery method
///
/// One implementation per [`IpMethod`] other than `IpMethod::Provider`, which
/// delegates discovery to the provider's update call.
///
/// Implementations must be thread-safe: one getter serves every record using its
/// method, possibly from several tasks at once.
#[async_trait]
pub trait IpGetter: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error)`: If unable to determine the current IP
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// The method this getter implements
    fn method(&self) -> IpMethod;
}
