use crate::domain::model::Message;
use std::fmt;
use std::sync::Arc;

/// Decides whether a message is relayed across a duplex link. Applied either
/// by a [`LinkManager`](crate::core::link::LinkManager) to every link, or to a
/// single [`DuplexLink`](crate::core::link::DuplexLink).
#[derive(Clone)]
pub struct RelayPredicate {
    predicate: Arc<dyn Fn(&Message) -> bool + Send + Sync>,
}

impl RelayPredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn allow_all() -> Self {
        Self::new(|_| true)
    }

    pub fn deny_all() -> Self {
        Self::new(|_| false)
    }

    pub fn not_blank() -> Self {
        Self::new(|message| !message.is_blank())
    }

    pub fn test(&self, message: &Message) -> bool {
        (self.predicate)(message)
    }

    pub fn and(self, other: RelayPredicate) -> Self {
        Self::new(move |message| self.test(message) && other.test(message))
    }

    pub fn or(self, other: RelayPredicate) -> Self {
        Self::new(move |message| self.test(message) || other.test(message))
    }

    pub fn negate(self) -> Self {
        Self::new(move |message| !self.test(message))
    }
}

impl Default for RelayPredicate {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl fmt::Debug for RelayPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RelayPredicate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        let msg = Message::of("a", "b", "content");
        let blank = Message::of("a", "b", "  ");

        assert!(RelayPredicate::allow_all().test(&msg));
        assert!(!RelayPredicate::deny_all().test(&msg));
        assert!(RelayPredicate::not_blank().test(&msg));
        assert!(!RelayPredicate::not_blank().test(&blank));
    }

    #[test]
    fn test_combinators() {
        let msg = Message::of("a", "b", "content");
        assert!(!RelayPredicate::allow_all().and(RelayPredicate::deny_all()).test(&msg));
        assert!(RelayPredicate::deny_all().or(RelayPredicate::allow_all()).test(&msg));
        assert!(RelayPredicate::deny_all().negate().test(&msg));
    }
}
