use std::time::Duration;

use anyhow::{anyhow, Result};
use log::debug;
use serde::Serialize;

use crate::validation::ValidatedVitals;

/// Wire document for one validated reading. The raw window rides along so
/// the collector can re-derive or audit the estimate independently.
#[derive(Debug, Serialize)]
pub struct VitalsDocument<'a> {
    pub device_id: &'a str,
    pub user_id: &'a str,
    pub heart_rate: i32,
    pub blood_oxygen: i32,
    /// Infrared channel of the window snapshot, oldest first.
    pub ppg_ir: &'a [u32],
    /// Red channel of the window snapshot, oldest first.
    pub ppg_red: &'a [u32],
}

/// Boundary to the delivery transport. `post` succeeds iff the remote
/// acknowledged within the configured timeout; it never retries and never
/// touches pipeline state.
pub trait Collector {
    fn post(&self, document: &VitalsDocument) -> Result<()>;
}

/// Blocking HTTP delivery with a bounded per-request timeout.
pub struct HttpCollector {
    endpoint: String,
    token: String,
    timeout: Duration,
}

impl HttpCollector {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            timeout,
        }
    }

    /// Boot-time reachability check. Any HTTP response counts: the
    /// endpoint may well reject a GET, but a status line proves the
    /// collector is there. Only transport-level failure is an error.
    pub fn probe(&self, timeout: Duration) -> Result<()> {
        match ureq::get(&self.endpoint).timeout(timeout).call() {
            Ok(_) | Err(ureq::Error::Status(_, _)) => Ok(()),
            Err(ureq::Error::Transport(t)) => {
                Err(anyhow!("collector unreachable at {}: {}", self.endpoint, t))
            }
        }
    }
}

impl Collector for HttpCollector {
    fn post(&self, document: &VitalsDocument) -> Result<()> {
        let mut request = ureq::post(&self.endpoint).timeout(self.timeout);
        if !self.token.is_empty() {
            request = request.set("Authorization", &format!("Bearer {}", self.token));
        }

        match request.send_json(document) {
            Ok(response) => {
                debug!("POST -> {}", response.status());
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => Err(anyhow!("collector returned status {}", code)),
            Err(ureq::Error::Transport(t)) => Err(anyhow!("POST failed: {}", t)),
        }
    }
}

/// Assembles the wire document for a validated reading and hands it to the
/// transport. Stateless beyond the configured identity.
pub struct Reporter<C> {
    device_id: String,
    user_id: String,
    collector: C,
}

impl<C: Collector> Reporter<C> {
    pub fn new(device_id: impl Into<String>, user_id: impl Into<String>, collector: C) -> Self {
        Self {
            device_id: device_id.into(),
            user_id: user_id.into(),
            collector,
        }
    }

    pub fn report(&self, vitals: &ValidatedVitals, ir: &[u32], red: &[u32]) -> Result<()> {
        let document = VitalsDocument {
            device_id: &self.device_id,
            user_id: &self.user_id,
            heart_rate: vitals.heart_rate,
            blood_oxygen: vitals.spo2,
            ppg_ir: ir,
            ppg_red: red,
        };
        self.collector.post(&document)
    }
}
