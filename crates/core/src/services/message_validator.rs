//! Chat message validation and sanitization.
//!
//! Pure and side-effect free: the validator never touches persistence.
//! Markup is policy-recoverable (stripped, then the remainder is
//! judged); empty, oversized, and blocked-phrase input is rejected
//! outright.

use once_cell::sync::Lazy;
use regex::Regex;
use streamgate_common::config::ChatConfig;

/// Script blocks are removed wholesale, including their contents.
static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap()
});

/// Any remaining markup tag.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"<[^>]*>").unwrap()
});

/// Why a message was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRejection {
    /// Empty after trimming and sanitization.
    Empty,
    /// Exceeds the configured maximum length.
    TooLong {
        /// Configured maximum.
        max: usize,
        /// Actual length in characters.
        len: usize,
    },
    /// Contains a blocked phrase.
    DisallowedContent,
}

impl MessageRejection {
    /// Stable reason code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooLong { .. } => "too_long",
            Self::DisallowedContent => "disallowed_content",
        }
    }
}

impl std::fmt::Display for MessageRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Message is empty"),
            Self::TooLong { max, len } => {
                write!(f, "Message is {len} characters, maximum is {max}")
            }
            Self::DisallowedContent => write!(f, "Message contains disallowed content"),
        }
    }
}

/// An accepted, sanitized message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMessage {
    /// Sanitized text, safe to persist.
    pub text: String,
    /// Whether sanitization changed the input.
    pub sanitized: bool,
}

/// Stateless message validator. Limits and blocked phrases come from
/// configuration, not call sites.
#[derive(Clone)]
pub struct MessageValidator {
    max_length: usize,
    blocked_phrases: Vec<String>,
}

impl MessageValidator {
    /// Create a validator from chat policy configuration.
    #[must_use]
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            max_length: config.max_message_length,
            blocked_phrases: config
                .blocked_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Validate raw message text, returning the sanitized payload or a
    /// rejection reason.
    pub fn validate(&self, text: &str) -> Result<ValidatedMessage, MessageRejection> {
        let stripped = SCRIPT_RE.replace_all(text, "");
        let stripped = TAG_RE.replace_all(&stripped, "");
        let cleaned = stripped.trim();

        if cleaned.is_empty() {
            return Err(MessageRejection::Empty);
        }

        let len = cleaned.chars().count();
        if len > self.max_length {
            return Err(MessageRejection::TooLong {
                max: self.max_length,
                len,
            });
        }

        let lowered = cleaned.to_lowercase();
        if self
            .blocked_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase))
        {
            return Err(MessageRejection::DisallowedContent);
        }

        Ok(ValidatedMessage {
            sanitized: cleaned != text,
            text: cleaned.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn validator() -> MessageValidator {
        MessageValidator::new(&ChatConfig {
            max_message_length: 20,
            blocked_phrases: vec!["FreeCredits".to_string()],
        })
    }

    #[test]
    fn empty_and_whitespace_messages_reject_as_empty() {
        let v = validator();
        assert_eq!(v.validate("").unwrap_err(), MessageRejection::Empty);
        assert_eq!(v.validate("   ").unwrap_err(), MessageRejection::Empty);
    }

    #[test]
    fn markup_only_message_rejects_as_empty() {
        let v = validator();
        assert_eq!(
            v.validate("<b></b> <i> </i>").unwrap_err(),
            MessageRejection::Empty
        );
    }

    #[test]
    fn oversized_message_rejects_with_length() {
        let v = validator();
        let err = v.validate(&"x".repeat(21)).unwrap_err();
        assert_eq!(err, MessageRejection::TooLong { max: 20, len: 21 });
        assert_eq!(err.code(), "too_long");
    }

    #[test]
    fn markup_is_sanitized_not_rejected() {
        let v = validator();
        let ok = v.validate("hi <b>there</b>").unwrap();
        assert_eq!(ok.text, "hi there");
        assert!(ok.sanitized);
    }

    #[test]
    fn script_blocks_are_removed_with_contents() {
        let v = validator();
        let ok = v
            .validate("hello<script>alert('x')</script> world")
            .unwrap();
        assert_eq!(ok.text, "hello world");
    }

    #[test]
    fn blocked_phrases_reject_case_insensitively() {
        let v = validator();
        assert_eq!(
            v.validate("get freecredits now").unwrap_err(),
            MessageRejection::DisallowedContent
        );
    }

    #[test]
    fn length_is_measured_after_sanitization() {
        let v = validator();
        // 30 raw characters, well under 20 once tags are stripped
        let ok = v.validate("<span class=\"big\">short</span>").unwrap();
        assert_eq!(ok.text, "short");
    }

    #[test]
    fn clean_message_passes_unchanged() {
        let v = validator();
        let ok = v.validate("hello chat").unwrap();
        assert_eq!(ok.text, "hello chat");
        assert!(!ok.sanitized);
    }
}
