//! One-time startup sequence
//!
//! Provisioning and time sync run before the time base is armed and the
//! loops start. Either may fail; the clock starts regardless.

use crate::time::UnixTime;
use crate::traits::{ProvisionError, Provisioner, TimeSource, TimeSyncError};

/// Outcome of the startup sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    pub network: Result<(), ProvisionError>,
    pub time: Result<UnixTime, TimeSyncError>,
}

impl BootReport {
    /// Check if the device came up on the network
    pub fn is_online(&self) -> bool {
        self.network.is_ok()
    }

    /// Check if any startup step failed
    pub fn is_degraded(&self) -> bool {
        self.network.is_err() || self.time.is_err()
    }
}

/// Provision the network, then query the time if that worked
pub async fn bootstrap<P, T>(provisioner: &mut P, time_source: &mut T) -> BootReport
where
    P: Provisioner,
    T: TimeSource,
{
    let network = provisioner.provision().await;

    let time = match network {
        Ok(()) => time_source.sync().await,
        Err(_) => Err(TimeSyncError::NoNetwork),
    };

    BootReport { network, time }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    struct FixedProvisioner(Result<(), ProvisionError>);

    impl Provisioner for FixedProvisioner {
        async fn provision(&mut self) -> Result<(), ProvisionError> {
            self.0
        }
    }

    struct CountingTimeSource {
        result: Result<UnixTime, TimeSyncError>,
        calls: u32,
    }

    impl TimeSource for CountingTimeSource {
        async fn sync(&mut self) -> Result<UnixTime, TimeSyncError> {
            self.calls += 1;
            self.result
        }
    }

    #[test]
    fn test_full_boot() {
        let mut provisioner = FixedProvisioner(Ok(()));
        let mut time = CountingTimeSource {
            result: Ok(UnixTime::from_secs(1_792_332_187)),
            calls: 0,
        };

        let report = block_on(bootstrap(&mut provisioner, &mut time));

        assert!(report.is_online());
        assert!(!report.is_degraded());
        assert_eq!(report.time, Ok(UnixTime::from_secs(1_792_332_187)));
        assert_eq!(time.calls, 1);
    }

    #[test]
    fn test_time_sync_skipped_without_network() {
        let mut provisioner = FixedProvisioner(Err(ProvisionError::Timeout));
        let mut time = CountingTimeSource {
            result: Ok(UnixTime::from_secs(0)),
            calls: 0,
        };

        let report = block_on(bootstrap(&mut provisioner, &mut time));

        assert!(!report.is_online());
        assert!(report.is_degraded());
        assert_eq!(report.network, Err(ProvisionError::Timeout));
        assert_eq!(report.time, Err(TimeSyncError::NoNetwork));
        assert_eq!(time.calls, 0);
    }

    #[test]
    fn test_time_sync_failure_is_degraded() {
        let mut provisioner = FixedProvisioner(Ok(()));
        let mut time = CountingTimeSource {
            result: Err(TimeSyncError::Timeout),
            calls: 0,
        };

        let report = block_on(bootstrap(&mut provisioner, &mut time));

        assert!(report.is_online());
        assert!(report.is_degraded());
        assert_eq!(report.time, Err(TimeSyncError::Timeout));
    }
}
