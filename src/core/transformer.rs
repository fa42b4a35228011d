use crate::domain::model::Message;
use std::fmt;
use std::sync::Arc;

/// Discord rejects message content longer than this many characters.
pub const DISCORD_MAX_CONTENT: usize = 2000;

const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Rewrites a message on its way through the bridge. Transformers never drop
/// messages; use a filter for that.
#[derive(Clone)]
pub struct MessageTransformer {
    transform: Arc<dyn Fn(Message) -> Message + Send + Sync>,
}

impl MessageTransformer {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(Message) -> Message + Send + Sync + 'static,
    {
        Self {
            transform: Arc::new(transform),
        }
    }

    pub fn identity() -> Self {
        Self::new(|message| message)
    }

    pub fn trim() -> Self {
        Self::new(|message| {
            let trimmed = message.raw_message.trim().to_string();
            message.with_raw_message(trimmed)
        })
    }

    /// Cuts content to at most `max_chars` characters.
    pub fn truncate(max_chars: usize) -> Self {
        Self::new(move |message| {
            if message.raw_message.chars().count() <= max_chars {
                return message;
            }
            let cut: String = message.raw_message.chars().take(max_chars).collect();
            message.with_raw_message(cut)
        })
    }

    /// Breaks `@everyone` and `@here` so they render as plain text.
    pub fn strip_mentions() -> Self {
        Self::new(|message| {
            if !message.raw_message.contains('@') {
                return message;
            }
            let escaped = message
                .raw_message
                .replace("@everyone", &format!("@{ZERO_WIDTH_SPACE}everyone"))
                .replace("@here", &format!("@{ZERO_WIDTH_SPACE}here"));
            message.with_raw_message(escaped)
        })
    }

    pub fn transform(&self, message: Message) -> Message {
        (self.transform)(message)
    }

    /// Applies `self` first, then `next`.
    pub fn and_then(self, next: MessageTransformer) -> Self {
        Self::new(move |message| next.transform(self.transform(message)))
    }
}

impl fmt::Debug for MessageTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageTransformer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keeps_message() {
        let msg = Message::of("discord-1", "Alex", "  hi  ");
        assert_eq!(MessageTransformer::identity().transform(msg.clone()), msg);
    }

    #[test]
    fn test_and_then_order() {
        let shout = MessageTransformer::new(|m| {
            let upper = m.raw_message.to_uppercase();
            m.with_raw_message(upper)
        });
        let exclaim = MessageTransformer::new(|m| {
            let s = format!("{}!", m.raw_message);
            m.with_raw_message(s)
        });

        let chained = MessageTransformer::trim().and_then(shout).and_then(exclaim);
        let out = chained.transform(Message::of("a", "b", "  hey "));
        assert_eq!(out.raw_message, "HEY!");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let msg = Message::of("a", "b", "héllo wörld");
        let out = MessageTransformer::truncate(5).transform(msg);
        assert_eq!(out.raw_message, "héllo");
    }

    #[test]
    fn test_strip_mentions() {
        let msg = Message::of("a", "b", "ping @everyone and @here, mail me@x.io");
        let out = MessageTransformer::strip_mentions().transform(msg);
        assert!(!out.raw_message.contains("@everyone"));
        assert!(!out.raw_message.contains("@here"));
        assert!(out.raw_message.contains("me@x.io"));
    }
}
