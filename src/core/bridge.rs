use crate::core::filter::MessageFilter;
use crate::core::stats::RelayStats;
use crate::core::transformer::MessageTransformer;
use crate::domain::model::Message;
use crate::domain::ports::Endpoint;
use crate::utils::error::{Result, WhisperError};
use dashmap::DashMap;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What happened to a routed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A filter rejected the message.
    Filtered,
    /// Number of endpoints the message was delivered to.
    Delivered(usize),
}

/// Hub that fans messages out to every registered endpoint except the one
/// they came from.
///
/// Filters run first, in insertion order; a single rejection stops the
/// message. Transformers then run in insertion order. Dispatch is concurrent
/// and every eligible endpoint is attempted even if another one fails.
pub struct RelayBridge {
    endpoints: DashMap<String, Arc<dyn Endpoint>>,
    filters: RwLock<Vec<MessageFilter>>,
    transformers: RwLock<Vec<MessageTransformer>>,
    running: AtomicBool,
    stats: Arc<RelayStats>,
}

impl RelayBridge {
    pub fn new() -> Self {
        Self {
            endpoints: DashMap::new(),
            filters: RwLock::new(Vec::new()),
            transformers: RwLock::new(Vec::new()),
            running: AtomicBool::new(false),
            stats: Arc::new(RelayStats::default()),
        }
    }

    /// Registers an endpoint, replacing any endpoint with the same id.
    pub fn register_endpoint(&self, endpoint: Arc<dyn Endpoint>) {
        let id = endpoint.id().to_string();
        if self.endpoints.insert(id.clone(), endpoint).is_some() {
            tracing::debug!("Replaced endpoint {}", id);
        } else {
            tracing::debug!("Registered endpoint {}", id);
        }
    }

    pub fn unregister_endpoint(&self, endpoint_id: &str) {
        if self.endpoints.remove(endpoint_id).is_some() {
            tracing::debug!("Unregistered endpoint {}", endpoint_id);
        }
    }

    pub fn endpoint_ids(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.key().clone()).collect()
    }

    pub fn add_filter(&self, filter: MessageFilter) {
        write(&self.filters).push(filter);
    }

    pub fn add_transformer(&self, transformer: MessageTransformer) {
        write(&self.transformers).push(transformer);
    }

    pub fn start(&self) -> Result<()> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| WhisperError::AlreadyRunning)?;
        tracing::info!("🌉 Bridge started with {} endpoint(s)", self.endpoints.len());
        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        self.running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| WhisperError::NotRunning)?;
        tracing::info!("🌉 Bridge stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> Arc<RelayStats> {
        self.stats.clone()
    }

    pub async fn route_message(&self, message: Message) -> Result<RouteOutcome> {
        if !self.is_running() {
            return Err(WhisperError::NotRunning);
        }
        self.stats.record_routed();

        if !self.passes_filters(&message) {
            tracing::debug!("Message from {} rejected by filters", message.source);
            self.stats.record_filtered();
            return Ok(RouteOutcome::Filtered);
        }

        let message = self.apply_transformers(message);
        self.dispatch_to_endpoints(&message).await
    }

    fn passes_filters(&self, message: &Message) -> bool {
        read(&self.filters).iter().all(|filter| filter.test(message))
    }

    fn apply_transformers(&self, original: Message) -> Message {
        let transformers = read(&self.transformers).clone();
        transformers
            .iter()
            .fold(original, |current, transformer| transformer.transform(current))
    }

    async fn dispatch_to_endpoints(&self, message: &Message) -> Result<RouteOutcome> {
        // Snapshot so no map guard is held across an await.
        let targets: Vec<Arc<dyn Endpoint>> = self
            .endpoints
            .iter()
            .filter(|entry| !should_skip(entry.value().as_ref(), message))
            .map(|entry| entry.value().clone())
            .collect();

        let results = join_all(targets.iter().map(|endpoint| async move {
            (endpoint.id(), endpoint.send_message(message).await)
        }))
        .await;

        let mut delivered = 0;
        let mut first_failure = None;
        for (endpoint_id, result) in results {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!("❌ Delivery to {} failed: {}", endpoint_id, e);
                    if first_failure.is_none() {
                        first_failure = Some(WhisperError::DeliveryError {
                            endpoint: endpoint_id.to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        self.stats.record_delivered(delivered as u64);
        self.stats.record_failed((targets.len() - delivered) as u64);

        match first_failure {
            Some(err) => Err(err),
            None => {
                tracing::debug!(
                    "📨 Relayed message from {} to {} endpoint(s)",
                    message.source,
                    delivered
                );
                Ok(RouteOutcome::Delivered(delivered))
            }
        }
    }
}

impl Default for RelayBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// An endpoint never receives its own messages, and inactive ones receive nothing.
fn should_skip(endpoint: &dyn Endpoint, message: &Message) -> bool {
    endpoint.id().eq_ignore_ascii_case(&message.source) || !endpoint.is_active()
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
