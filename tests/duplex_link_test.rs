use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use whisperwire::core::link::{DuplexLink, LinkManager};
use whisperwire::core::predicate::RelayPredicate;
use whisperwire::domain::ports::DuplexNode;
use whisperwire::{Message, WhisperError};

struct TestNode {
    id: String,
    received: Mutex<Vec<Message>>,
    fail: bool,
}

impl TestNode {
    fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            received: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            received: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    async fn received(&self) -> Vec<String> {
        self.received
            .lock()
            .await
            .iter()
            .map(|m| m.raw_message.clone())
            .collect()
    }
}

#[async_trait]
impl DuplexNode for TestNode {
    async fn send_message(&self, message: &Message) -> whisperwire::Result<()> {
        if self.fail {
            return Err(WhisperError::DeliveryError {
                endpoint: self.id.clone(),
                reason: "offline".to_string(),
            });
        }
        self.received.lock().await.push(message.clone());
        Ok(())
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[tokio::test]
async fn test_link_forwards_both_ways() -> Result<()> {
    let a = TestNode::new("a");
    let b = TestNode::new("b");
    let link = DuplexLink::new(a.clone(), b.clone())?;

    assert!(link.forward(a.as_ref(), &Message::of("a", "alice", "to b")).await?);
    assert!(link.forward(b.as_ref(), &Message::of("b", "bob", "to a")).await?);

    assert_eq!(b.received().await, vec!["to b"]);
    assert_eq!(a.received().await, vec!["to a"]);
    Ok(())
}

#[tokio::test]
async fn test_link_rejects_outsider() -> Result<()> {
    let a = TestNode::new("a");
    let b = TestNode::new("b");
    let c = TestNode::new("c");
    let link = DuplexLink::new(a, b)?;

    let err = link
        .forward(c.as_ref(), &Message::of("c", "carol", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, WhisperError::UnknownNode(id) if id == "c"));
    Ok(())
}

#[tokio::test]
async fn test_link_construction_errors() {
    assert!(matches!(
        DuplexLink::new(TestNode::new("a"), TestNode::new("a")),
        Err(WhisperError::IdenticalNodes(_))
    ));
    assert!(matches!(
        DuplexLink::new(TestNode::new(" "), TestNode::new("a")),
        Err(WhisperError::BlankNodeId)
    ));
}

#[tokio::test]
async fn test_link_predicate_blocks() -> Result<()> {
    let a = TestNode::new("a");
    let b = TestNode::new("b");
    let link = DuplexLink::new(a.clone(), b.clone())?.with_predicate(RelayPredicate::not_blank());

    assert!(!link.forward(a.as_ref(), &Message::of("a", "alice", "  ")).await?);
    assert!(b.received().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_manager_link_and_unlink() {
    let manager = LinkManager::new();
    let a = TestNode::new("a");
    let b = TestNode::new("b");

    assert!(manager.link(a.clone(), b.clone()));
    assert!(!manager.link(b.clone(), a.clone()), "duplicate in reverse order");
    assert!(!manager.link(a.clone(), a.clone()), "self link");
    assert!(manager.is_linked(b.as_ref(), a.as_ref()));
    assert!(manager.has_links(a.as_ref()));
    assert_eq!(manager.active_links().len(), 1);

    assert!(manager.unlink(b.as_ref(), a.as_ref()));
    assert!(!manager.unlink(a.as_ref(), b.as_ref()));
    assert!(!manager.has_links(a.as_ref()));
}

#[tokio::test]
async fn test_manager_relays_to_every_linked_node() -> Result<()> {
    let manager = LinkManager::new();
    let hub = TestNode::new("hub");
    let left = TestNode::new("left");
    let right = TestNode::new("right");
    let other = TestNode::new("other");
    manager.link(hub.clone(), left.clone());
    manager.link(hub.clone(), right.clone());
    manager.link(left.clone(), other.clone());

    let delivered = manager
        .relay(hub.as_ref(), &Message::of("hub", "alice", "hello"))
        .await?;

    assert_eq!(delivered, 2);
    assert_eq!(left.received().await, vec!["hello"]);
    assert_eq!(right.received().await, vec!["hello"]);
    assert!(other.received().await.is_empty());
    assert!(hub.received().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_manager_reports_failure_after_attempting_all() {
    let manager = LinkManager::new();
    let hub = TestNode::new("hub");
    let broken = TestNode::failing("broken");
    let healthy = TestNode::new("healthy");
    manager.link(hub.clone(), broken);
    manager.link(hub.clone(), healthy.clone());

    let result = manager
        .relay(hub.as_ref(), &Message::of("hub", "alice", "hello"))
        .await;

    assert!(matches!(result, Err(WhisperError::DeliveryError { endpoint, .. }) if endpoint == "broken"));
    assert_eq!(healthy.received().await, vec!["hello"]);
}

#[tokio::test]
async fn test_manager_predicate_and_reset() -> Result<()> {
    let manager = LinkManager::with_predicate(RelayPredicate::deny_all());
    let a = TestNode::new("a");
    let b = TestNode::new("b");
    manager.link(a.clone(), b.clone());

    assert_eq!(manager.relay(a.as_ref(), &Message::of("a", "alice", "hi")).await?, 0);
    assert!(b.received().await.is_empty());

    manager.reset();
    assert!(manager.active_links().is_empty());
    Ok(())
}
