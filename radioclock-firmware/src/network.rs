//! Wi-Fi provisioning and SNTP time sync

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};

use radioclock_core::config::NetworkConfig;
use radioclock_core::time::sntp::{self, NTP_PORT, PACKET_LEN};
use radioclock_core::time::UnixTime;
use radioclock_core::traits::{ProvisionError, Provisioner, TimeSource, TimeSyncError};

/// Local port for SNTP queries
const SNTP_LOCAL_PORT: u16 = 12_300;

/// How long to wait for an SNTP reply
const SNTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Joins the configured access point and waits for DHCP
pub struct WifiProvisioner<'a> {
    control: &'a mut cyw43::Control<'static>,
    stack: Stack<'static>,
    config: &'a NetworkConfig,
}

impl<'a> WifiProvisioner<'a> {
    pub fn new(
        control: &'a mut cyw43::Control<'static>,
        stack: Stack<'static>,
        config: &'a NetworkConfig,
    ) -> Self {
        Self {
            control,
            stack,
            config,
        }
    }

    async fn join(&mut self) -> Result<(), ProvisionError> {
        let ssid = self.config.ssid.as_str();
        let attempt_timeout = Duration::from_secs(u64::from(self.config.connect_timeout_s));
        let attempts = u16::from(self.config.connect_retries) + 1;

        for attempt in 1..=attempts {
            info!("Joining {} (attempt {}/{})", ssid, attempt, attempts);

            let options = if self.config.password.is_empty() {
                cyw43::JoinOptions::new_open()
            } else {
                cyw43::JoinOptions::new(self.config.password.as_bytes())
            };

            match with_timeout(attempt_timeout, self.control.join(ssid, options)).await {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(e)) => warn!("Wi-Fi join failed: {:?}", e),
                Err(_) => warn!("Wi-Fi join timed out"),
            }
        }

        Err(ProvisionError::JoinFailed)
    }

    async fn configure(&mut self) -> Result<(), ProvisionError> {
        self.join().await?;
        info!("Wi-Fi joined, waiting for link");
        self.stack.wait_link_up().await;

        let dhcp_timeout = Duration::from_secs(u64::from(self.config.connect_timeout_s));
        with_timeout(dhcp_timeout, self.stack.wait_config_up())
            .await
            .map_err(|_| ProvisionError::NoAddress)?;

        if let Some(config) = self.stack.config_v4() {
            info!("Got IP: {}", config.address);
        }
        Ok(())
    }
}

impl Provisioner for WifiProvisioner<'_> {
    async fn provision(&mut self) -> Result<(), ProvisionError> {
        if !self.config.is_configured() {
            return Err(ProvisionError::NotConfigured);
        }

        let limit = Duration::from_secs(u64::from(self.config.provision_timeout_s));
        match with_timeout(limit, self.configure()).await {
            Ok(result) => result,
            Err(_) => Err(ProvisionError::Timeout),
        }
    }
}

/// One-shot SNTP query against a single server
pub struct SntpClient<'a> {
    stack: Stack<'static>,
    server: &'a str,
}

impl<'a> SntpClient<'a> {
    pub fn new(stack: Stack<'static>, server: &'a str) -> Self {
        Self { stack, server }
    }
}

impl TimeSource for SntpClient<'_> {
    async fn sync(&mut self) -> Result<UnixTime, TimeSyncError> {
        if !self.stack.is_config_up() {
            return Err(TimeSyncError::NoNetwork);
        }

        let addrs = self
            .stack
            .dns_query(self.server, DnsQueryType::A)
            .await
            .map_err(|_| TimeSyncError::Resolve)?;
        let addr = *addrs.first().ok_or(TimeSyncError::Resolve)?;
        debug!("SNTP server {} at {}", self.server, addr);

        let mut rx_meta = [PacketMetadata::EMPTY; 1];
        let mut rx_buf = [0u8; 2 * PACKET_LEN];
        let mut tx_meta = [PacketMetadata::EMPTY; 1];
        let mut tx_buf = [0u8; 2 * PACKET_LEN];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buf,
            &mut tx_meta,
            &mut tx_buf,
        );
        socket
            .bind(SNTP_LOCAL_PORT)
            .map_err(|_| TimeSyncError::NoNetwork)?;

        socket
            .send_to(&sntp::request(), (addr, NTP_PORT))
            .await
            .map_err(|_| TimeSyncError::NoNetwork)?;

        let mut reply = [0u8; PACKET_LEN];
        let (len, _) = with_timeout(SNTP_TIMEOUT, socket.recv_from(&mut reply))
            .await
            .map_err(|_| TimeSyncError::Timeout)?
            .map_err(|_| TimeSyncError::InvalidResponse)?;

        Ok(sntp::parse_response(&reply[..len])?)
    }
}
