//! Network bootstrap collaborators
//!
//! Provisioning and time synchronisation run once at startup. Both are
//! allowed to fail; neither failure stops the clock.

use crate::time::UnixTime;

/// Provisioning errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProvisionError {
    /// No credentials configured
    NotConfigured,
    /// Joining the access point failed after all retries
    JoinFailed,
    /// No address was obtained via DHCP
    NoAddress,
    /// Provisioning did not finish within the configured timeout
    Timeout,
}

/// Time synchronisation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeSyncError {
    /// Skipped because provisioning failed
    NoNetwork,
    /// Server address could not be resolved
    Resolve,
    /// No reply within the timeout
    Timeout,
    /// Reply was not a usable SNTP response
    InvalidResponse,
}

/// Brings the device onto the network
#[allow(async_fn_in_trait)]
pub trait Provisioner {
    /// Join the network and obtain an address
    ///
    /// Implementations enforce their own timeouts and return once the
    /// device is online or provisioning has been abandoned.
    async fn provision(&mut self) -> Result<(), ProvisionError>;
}

/// Source of absolute wall-clock time
#[allow(async_fn_in_trait)]
pub trait TimeSource {
    /// Query the current UTC time
    async fn sync(&mut self) -> Result<UnixTime, TimeSyncError>;
}
