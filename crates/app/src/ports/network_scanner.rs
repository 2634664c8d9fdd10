//! Network scanner port: lists WiFi networks visible to the host.

use std::future::Future;
use std::sync::Arc;

use matterhub_domain::error::MatterHubError;

/// Discovers SSIDs a device could be provisioned onto.
pub trait NetworkScanner: Send + Sync {
    /// Return the distinct, non-empty SSIDs currently in range, sorted.
    fn scan(&self) -> impl Future<Output = Result<Vec<String>, MatterHubError>> + Send;
}

impl<T: NetworkScanner> NetworkScanner for Arc<T> {
    fn scan(&self) -> impl Future<Output = Result<Vec<String>, MatterHubError>> + Send {
        (**self).scan()
    }
}
