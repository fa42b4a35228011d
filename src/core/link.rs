use crate::core::predicate::RelayPredicate;
use crate::domain::model::Message;
use crate::domain::ports::DuplexNode;
use crate::utils::error::{Result, WhisperError};
use futures_util::future::join_all;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A bidirectional relay between exactly two nodes. Direction is decided by
/// comparing ids, so the same link serves both ways.
#[derive(Clone)]
pub struct DuplexLink {
    node_a: Arc<dyn DuplexNode>,
    node_b: Arc<dyn DuplexNode>,
    predicate: RelayPredicate,
}

impl DuplexLink {
    pub fn new(node_a: Arc<dyn DuplexNode>, node_b: Arc<dyn DuplexNode>) -> Result<Self> {
        if node_a.id().trim().is_empty() || node_b.id().trim().is_empty() {
            return Err(WhisperError::BlankNodeId);
        }
        if node_a.id() == node_b.id() {
            return Err(WhisperError::IdenticalNodes(node_a.id().to_string()));
        }
        Ok(Self {
            node_a,
            node_b,
            predicate: RelayPredicate::allow_all(),
        })
    }

    pub fn with_predicate(mut self, predicate: RelayPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn node_a(&self) -> &Arc<dyn DuplexNode> {
        &self.node_a
    }

    pub fn node_b(&self) -> &Arc<dyn DuplexNode> {
        &self.node_b
    }

    /// Sends `message` to the node opposite `from`.
    ///
    /// Returns `Ok(false)` when the link predicate rejects the message.
    pub async fn forward(&self, from: &dyn DuplexNode, message: &Message) -> Result<bool> {
        let target = self.opposite_of(from)?;
        if !self.predicate.test(message) {
            return Ok(false);
        }
        target.send_message(message).await?;
        Ok(true)
    }

    pub fn contains(&self, node: &dyn DuplexNode) -> bool {
        self.contains_id(node.id())
    }

    fn contains_id(&self, id: &str) -> bool {
        self.node_a.id() == id || self.node_b.id() == id
    }

    /// True when this link joins `a` and `b`, in either orientation.
    pub fn connects(&self, a: &dyn DuplexNode, b: &dyn DuplexNode) -> bool {
        (self.node_a.id() == a.id() && self.node_b.id() == b.id())
            || (self.node_a.id() == b.id() && self.node_b.id() == a.id())
    }

    pub fn opposite_of(&self, node: &dyn DuplexNode) -> Result<&Arc<dyn DuplexNode>> {
        let id = node.id();
        if id == self.node_a.id() {
            Ok(&self.node_b)
        } else if id == self.node_b.id() {
            Ok(&self.node_a)
        } else {
            Err(WhisperError::UnknownNode(id.to_string()))
        }
    }
}

impl fmt::Debug for DuplexLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplexLink")
            .field("node_a", &self.node_a.id())
            .field("node_b", &self.node_b.id())
            .finish()
    }
}

/// Thread-safe registry of duplex links.
pub struct LinkManager {
    links: RwLock<Vec<DuplexLink>>,
    predicate: RelayPredicate,
}

impl LinkManager {
    pub fn new() -> Self {
        Self::with_predicate(RelayPredicate::allow_all())
    }

    /// The predicate applies to every relay, on top of each link's own.
    pub fn with_predicate(predicate: RelayPredicate) -> Self {
        Self {
            links: RwLock::new(Vec::new()),
            predicate,
        }
    }

    /// Returns false when the nodes share an id or are already linked.
    pub fn link(&self, a: Arc<dyn DuplexNode>, b: Arc<dyn DuplexNode>) -> bool {
        self.link_with(a, b, RelayPredicate::allow_all())
    }

    pub fn link_with(
        &self,
        a: Arc<dyn DuplexNode>,
        b: Arc<dyn DuplexNode>,
        predicate: RelayPredicate,
    ) -> bool {
        let mut links = self.links.write().unwrap_or_else(|p| p.into_inner());
        if links.iter().any(|link| link.connects(a.as_ref(), b.as_ref())) {
            return false;
        }

        match DuplexLink::new(a, b) {
            Ok(link) => {
                tracing::debug!("🔗 Linked {} <-> {}", link.node_a.id(), link.node_b.id());
                links.push(link.with_predicate(predicate));
                true
            }
            Err(e) => {
                tracing::debug!("Refusing link: {}", e);
                false
            }
        }
    }

    pub fn unlink(&self, a: &dyn DuplexNode, b: &dyn DuplexNode) -> bool {
        let mut links = self.links.write().unwrap_or_else(|p| p.into_inner());
        let before = links.len();
        links.retain(|link| !link.connects(a, b));
        before != links.len()
    }

    pub fn is_linked(&self, a: &dyn DuplexNode, b: &dyn DuplexNode) -> bool {
        self.links
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .any(|link| link.connects(a, b))
    }

    pub fn has_links(&self, node: &dyn DuplexNode) -> bool {
        self.links
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .any(|link| link.contains(node))
    }

    /// Sends `message` to the far side of every link that contains `source`.
    ///
    /// All sends are attempted; the first failure is reported afterwards.
    /// Returns how many nodes received the message.
    pub async fn relay(&self, source: &dyn DuplexNode, message: &Message) -> Result<usize> {
        if !self.predicate.test(message) {
            return Ok(0);
        }

        let links: Vec<DuplexLink> = self
            .links
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|link| link.contains(source))
            .cloned()
            .collect();

        let results = join_all(links.iter().map(|link| async move {
            let target = link.opposite_of(source).map(|node| node.id().to_string());
            (target, link.forward(source, message).await)
        }))
        .await;

        let mut delivered = 0;
        let mut first_failure = None;
        for (target, result) in results {
            match result {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(e) => {
                    let endpoint = target.unwrap_or_default();
                    tracing::warn!("❌ Link relay to {} failed: {}", endpoint, e);
                    first_failure.get_or_insert(WhisperError::DeliveryError {
                        endpoint,
                        reason: e.to_string(),
                    });
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(delivered),
        }
    }

    pub fn active_links(&self) -> Vec<DuplexLink> {
        self.links.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn reset(&self) {
        self.links.write().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

impl Default for LinkManager {
    fn default() -> Self {
        Self::new()
    }
}
