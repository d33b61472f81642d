//! Automatic reply to a trigger string in received data

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::LineEnding;

/// Auto-reply settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoReplySettings {
    /// Enable auto-reply
    pub enabled: bool,
    /// Text to watch for in received data
    pub trigger: String,
    /// Text sent back when the trigger is seen
    pub reply: String,
    /// Line ending appended to the reply
    pub line_ending: LineEnding,
}

/// Sliding-window matcher for a trigger string
#[derive(Debug, Clone)]
pub struct AutoReply {
    trigger: Vec<u8>,
    reply: Vec<u8>,
    window: VecDeque<u8>,
}

impl AutoReply {
    /// Create a matcher; returns `None` when the settings are disabled
    pub fn from_settings(settings: &AutoReplySettings) -> Option<Self> {
        settings.enabled.then(|| {
            let mut reply = settings.reply.as_bytes().to_vec();
            reply.extend_from_slice(settings.line_ending.bytes());
            Self::new(settings.trigger.as_bytes(), reply)
        })
    }

    /// Create a matcher replying with `reply` (sent as is)
    pub fn new(trigger: &[u8], reply: Vec<u8>) -> Self {
        Self {
            trigger: trigger.to_vec(),
            window: VecDeque::with_capacity(trigger.len()),
            reply,
        }
    }

    /// Feed received bytes; returns one reply per trigger occurrence
    pub fn feed(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        let mut replies = Vec::new();
        if self.trigger.is_empty() {
            return replies;
        }

        for &byte in data {
            self.window.push_back(byte);
            while self.window.len() > self.trigger.len() {
                self.window.pop_front();
            }
            if self.window.iter().eq(self.trigger.iter()) {
                tracing::debug!(trigger = %String::from_utf8_lossy(&self.trigger), "Auto-reply triggered");
                replies.push(self.reply.clone());
                self.window.clear();
            }
        }

        replies
    }

    /// Forget partially matched input
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_across_chunks() {
        let mut auto = AutoReply::new(b"OK", b"ACK".to_vec());
        assert!(auto.feed(b"xxO").is_empty());
        assert_eq!(auto.feed(b"Kyy"), vec![b"ACK".to_vec()]);
    }

    #[test]
    fn test_multiple_matches() {
        let mut auto = AutoReply::new(b"ab", b"!".to_vec());
        assert_eq!(auto.feed(b"abab").len(), 2);
    }

    #[test]
    fn test_window_cleared_after_match() {
        let mut auto = AutoReply::new(b"aa", b"!".to_vec());
        // "aaa" only holds one non-overlapping match
        assert_eq!(auto.feed(b"aaa").len(), 1);
    }

    #[test]
    fn test_empty_trigger_never_matches() {
        let mut auto = AutoReply::new(b"", b"!".to_vec());
        assert!(auto.feed(b"anything").is_empty());
    }

    #[test]
    fn test_from_settings_appends_line_ending() {
        let settings = AutoReplySettings {
            enabled: true,
            trigger: "ping".to_string(),
            reply: "pong".to_string(),
            line_ending: LineEnding::CrLf,
        };
        let mut auto = AutoReply::from_settings(&settings).unwrap();
        assert_eq!(auto.feed(b"ping"), vec![b"pong\r\n".to_vec()]);

        let disabled = AutoReplySettings {
            enabled: false,
            ..settings
        };
        assert!(AutoReply::from_settings(&disabled).is_none());
    }
}
