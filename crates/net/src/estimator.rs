//! Network quality estimator
//!
//! Issues header-only probes to small static assets, averages the
//! round-trip latency of the ones that succeed, and classifies the result
//! into a [`NetworkQualitySample`]. Samples are cached for a validity
//! window; a mutex serializes measurement so concurrent callers share one
//! in-flight detection instead of racing their own probe volleys.

use rand::Rng;
use splashtrack_config::EstimatorConfig;
use splashtrack_errors::{Error, NetworkError};
use splashtrack_events::{EventEmitter, EventSender, TrackerEvent};
use splashtrack_types::{NetworkQualitySample, SpeedTier};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::NetClient;

#[derive(Debug)]
struct CachedSample {
    sample: NetworkQualitySample,
    captured: Instant,
}

/// Connection speed and quality estimator
#[derive(Debug)]
pub struct QualityEstimator {
    client: NetClient,
    config: EstimatorConfig,
    cache: Mutex<Option<CachedSample>>,
    event_sender: Option<EventSender>,
}

impl EventEmitter for QualityEstimator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl QualityEstimator {
    /// Create a new estimator
    #[must_use]
    pub fn new(client: NetClient, config: EstimatorConfig) -> Self {
        Self {
            client,
            config,
            cache: Mutex::new(None),
            event_sender: None,
        }
    }

    /// Attach an event sender for probe/detection events
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Detect current network quality.
    ///
    /// Returns the cached sample while it is still within its validity
    /// window; otherwise runs a probe volley. This call never fails: if
    /// every probe fails the fixed fallback sample is returned and cached.
    /// Concurrent callers serialize on the in-flight measurement.
    pub async fn detect(&self) -> NetworkQualitySample {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.captured.elapsed() < self.config.cache_ttl() {
                debug!(
                    tier = %cached.sample.tier,
                    age = ?cached.captured.elapsed(),
                    "returning cached network sample"
                );
                return cached.sample.clone();
            }
        }

        let sample = self.measure().await;
        *cache = Some(CachedSample {
            sample: sample.clone(),
            captured: Instant::now(),
        });
        sample
    }

    /// Drop the cached sample so the next `detect` measures again.
    pub async fn reset(&self) {
        *self.cache.lock().await = None;
    }

    /// Run one probe volley and classify the result.
    async fn measure(&self) -> NetworkQualitySample {
        let urls = &self.config.probe_urls;
        self.emit(TrackerEvent::DetectionStarted {
            probe_count: urls.len(),
        });

        let results =
            futures::future::join_all(urls.iter().map(|url| self.probe(url.as_str()))).await;

        let mut latencies = Vec::with_capacity(urls.len());
        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(latency_ms) => {
                    debug!(url = %url, latency_ms, "probe completed");
                    self.emit(TrackerEvent::ProbeCompleted {
                        url: url.clone(),
                        latency_ms,
                    });
                    latencies.push(latency_ms);
                }
                Err(error) => {
                    warn!(url = %url, %error, "probe failed, discarding");
                    self.emit(TrackerEvent::ProbeFailed {
                        url: url.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        if latencies.is_empty() {
            warn!("all probes failed, using fallback sample");
            self.emit(TrackerEvent::DetectionFellBack {
                reason: "all probes failed".to_string(),
            });
            return NetworkQualitySample::fallback();
        }

        #[allow(clippy::cast_precision_loss)]
        let avg_latency = latencies.iter().sum::<f64>() / latencies.len() as f64;
        let tier = SpeedTier::from_latency_ms(avg_latency);
        let sample = NetworkQualitySample::from_latency(
            avg_latency.round(),
            pseudo_throughput_mbps(tier),
            self.config.assume_connection_kind,
        );

        debug!(tier = %sample.tier, latency_ms = sample.latency_ms, "network detection complete");
        self.emit(TrackerEvent::DetectionCompleted {
            sample: sample.clone(),
        });
        sample
    }

    /// Measure one probe round trip in milliseconds.
    async fn probe(&self, url: &str) -> Result<f64, Error> {
        let busted = cache_busted(url);
        let started = Instant::now();

        let response = tokio::time::timeout(self.config.probe_timeout(), self.client.head(&busted))
            .await
            .map_err(|_| NetworkError::Timeout {
                url: url.to_string(),
            })??;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        Ok(started.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Append a cache-busting query parameter so intermediaries cannot serve
/// the probe from cache.
fn cache_busted(url: &str) -> String {
    let nonce: u32 = rand::rng().random();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}cb={nonce}")
}

/// Presentation-only throughput pseudo-estimate drawn from a tier range.
fn pseudo_throughput_mbps(tier: SpeedTier) -> f64 {
    let mut rng = rand::rng();
    let mbps: f64 = match tier {
        SpeedTier::Fast => rng.random_range(45.0..=100.0),
        SpeedTier::Medium => rng.random_range(15.0..=45.0),
        SpeedTier::Slow => rng.random_range(3.0..=15.0),
    };
    mbps.round()
}
