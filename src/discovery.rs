//! mDNS discovery of Key Lights (`_elg._tcp`).
//!
//! The zeroconf event loop is blocking, so it runs on a blocking worker and
//! hands devices to the async side over a channel. The worker stops once it
//! is cancelled or the deadline passes, which closes the channel.

use std::any::Any;
use std::sync::mpsc::{self as std_mpsc, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::sync::mpsc;
use zeroconf::prelude::*;
use zeroconf::{MdnsBrowser, ServiceDiscovery, ServiceType};

use crate::error::{ElgatoError, Result};
use crate::keylight::Device;

const SERVICE_NAME: &str = "elg";
const SERVICE_PROTOCOL: &str = "tcp";
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const RESULT_BUFFER: usize = 16;

pub struct Discovery {
    timeout: Duration,
    name: Option<String>,
}

impl Discovery {
    pub fn new(timeout: Duration) -> Self {
        Discovery {
            timeout,
            name: None,
        }
    }

    /// Only report devices whose mDNS instance name is exactly `name`.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Start browsing in the background.
    pub fn start(self) -> DiscoveryHandle {
        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        let (ctx, crx) = std_mpsc::channel();
        let deadline = Instant::now() + self.timeout;
        let name = self.name;

        tokio::task::spawn_blocking(move || {
            if let Err(err) = browse(name, deadline, &tx, &crx) {
                if tx.blocking_send(Err(err)).is_err() {
                    debug!("discovery error dropped");
                }
            }
            debug!("discovery stopped");
        });

        DiscoveryHandle::new(rx, ctx, self.timeout)
    }
}

/// Whether a service named `service_name` passes the optional name filter.
fn accepts(filter: Option<&str>, service_name: &str) -> bool {
    filter.map_or(true, |name| name == service_name)
}

fn browse(
    name: Option<String>,
    deadline: Instant,
    tx: &mpsc::Sender<Result<Device>>,
    cancelled: &std_mpsc::Receiver<()>,
) -> Result<()> {
    let service_type =
        ServiceType::new(SERVICE_NAME, SERVICE_PROTOCOL).map_err(ElgatoError::DiscoveryInit)?;
    let mut browser = MdnsBrowser::new(service_type);

    let found = tx.clone();
    browser.set_service_discovered_callback(Box::new(
        move |result: zeroconf::Result<ServiceDiscovery>, _context: Option<Arc<dyn Any>>| {
            let outcome = match result {
                Ok(service) => {
                    if !accepts(name.as_deref(), service.name()) {
                        debug!("skipping light {:?}", service.name());
                        return;
                    }
                    Ok(Device::from(&service))
                }
                Err(err) => Err(ElgatoError::Discovery(err)),
            };

            // Fails only once the receiver is gone, and then nobody is listening.
            if found.blocking_send(outcome).is_err() {
                debug!("discovery result dropped");
            }
        },
    ));

    let event_loop = browser.browse_services().map_err(ElgatoError::Discovery)?;

    loop {
        event_loop.poll(POLL_INTERVAL).map_err(ElgatoError::Discovery)?;

        match cancelled.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return Ok(()),
            Err(TryRecvError::Empty) => {}
        }

        if Instant::now() >= deadline {
            warn!("discovery timed out");
            return Ok(());
        }
    }
}

/// The running side of a [`Discovery`].
pub struct DiscoveryHandle {
    results: mpsc::Receiver<Result<Device>>,
    cancel: std_mpsc::Sender<()>,
    deadline: tokio::time::Instant,
}

impl DiscoveryHandle {
    fn new(
        results: mpsc::Receiver<Result<Device>>,
        cancel: std_mpsc::Sender<()>,
        timeout: Duration,
    ) -> Self {
        DiscoveryHandle {
            results,
            cancel,
            deadline: tokio::time::Instant::now() + timeout,
        }
    }

    /// Wait for the first result and stop discovery.
    ///
    /// Fails with [`ElgatoError::NoLights`] if the channel closes or the
    /// deadline passes before anything is found.
    pub async fn first(mut self) -> Result<Device> {
        let received = tokio::time::timeout_at(self.deadline, self.results.recv()).await;
        self.cancel();

        match received {
            Ok(Some(result)) => result,
            Ok(None) | Err(_) => Err(ElgatoError::NoLights),
        }
    }

    /// Ask the worker to stop. It notices within one poll interval.
    pub fn cancel(&self) {
        if self.cancel.send(()).is_err() {
            debug!("discovery already stopped");
        }
    }
}

/// Find a single Key Light on the local network.
pub async fn discover_device(timeout: Duration, name: Option<&str>) -> Result<Device> {
    debug!("running discovery (timeout {:?})...", timeout);

    Discovery::new(timeout)
        .with_name(name.map(str::to_string))
        .start()
        .first()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(
        timeout: Duration,
    ) -> (
        mpsc::Sender<Result<Device>>,
        std_mpsc::Receiver<()>,
        DiscoveryHandle,
    ) {
        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        let (ctx, crx) = std_mpsc::channel();
        (tx, crx, DiscoveryHandle::new(rx, ctx, timeout))
    }

    fn light(name: &str) -> Device {
        Device {
            name: name.to_string(),
            host: "10.0.1.32".to_string(),
            port: 9123,
        }
    }

    #[test]
    fn test_accepts_without_filter() {
        assert!(accepts(None, "Key Light Left"));
        assert!(accepts(None, ""));
    }

    #[test]
    fn test_accepts_exact_name_only() {
        assert!(accepts(Some("Key Light Left"), "Key Light Left"));
        assert!(!accepts(Some("Key Light Left"), "Key Light Right"));
        assert!(!accepts(Some("Key Light"), "Key Light Left"));
        assert!(!accepts(Some("Key Light Left"), "Key Light"));
        assert!(!accepts(Some("key light left"), "Key Light Left"));
    }

    #[tokio::test]
    async fn test_first_result_wins() {
        let (tx, crx, handle) = handle(Duration::from_secs(10));
        tx.send(Ok(light("Key Light Left"))).await.unwrap();
        tx.send(Ok(light("Key Light Right"))).await.unwrap();

        let device = handle.first().await.unwrap();
        assert_eq!(device.name, "Key Light Left");
        assert!(crx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_closed_channel_is_no_lights() {
        let (tx, crx, handle) = handle(Duration::from_secs(10));
        drop(tx);

        let err = handle.first().await.unwrap_err();
        assert!(matches!(err, ElgatoError::NoLights));
        assert!(crx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_timeout_is_no_lights() {
        let (_tx, crx, handle) = handle(Duration::from_millis(1));

        let err = handle.first().await.unwrap_err();
        assert!(matches!(err, ElgatoError::NoLights));
        assert_eq!(err.exit_code(), 3);
        assert!(crx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_cancel_after_worker_stopped() {
        let (_tx, crx, handle) = handle(Duration::from_secs(10));
        drop(crx);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_error_is_reported() {
        let (tx, _crx, handle) = handle(Duration::from_secs(10));
        tx.send(Err(ElgatoError::UnknownPort("x".to_string())))
            .await
            .unwrap();

        let err = handle.first().await.unwrap_err();
        assert!(matches!(err, ElgatoError::UnknownPort(_)));
    }
}
