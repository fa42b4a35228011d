use crate::domain::model::Message;
use std::fmt;
use std::sync::Arc;

/// Decides whether a message may enter the bridge.
///
/// Filters are cheap to clone and compose with [`and`](Self::and),
/// [`or`](Self::or) and [`negate`](Self::negate).
#[derive(Clone)]
pub struct MessageFilter {
    predicate: Arc<dyn Fn(&Message) -> bool + Send + Sync>,
}

impl MessageFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn accept_all() -> Self {
        Self::new(|_| true)
    }

    /// Matches messages whose source equals `source_id`, ignoring case.
    pub fn by_source(source_id: impl Into<String>) -> Self {
        let source_id = source_id.into();
        Self::new(move |message| message.source.eq_ignore_ascii_case(&source_id))
    }

    pub fn by_username<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::new(move |message| predicate(&message.username))
    }

    pub fn by_content<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::new(move |message| predicate(&message.raw_message))
    }

    pub fn test(&self, message: &Message) -> bool {
        (self.predicate)(message)
    }

    pub fn and(self, other: MessageFilter) -> Self {
        Self::new(move |message| self.test(message) && other.test(message))
    }

    pub fn or(self, other: MessageFilter) -> Self {
        Self::new(move |message| self.test(message) || other.test(message))
    }

    pub fn negate(self) -> Self {
        Self::new(move |message| !self.test(message))
    }
}

impl fmt::Debug for MessageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageFilter")
    }
}
