//! Token buffer for streamed response text.
//!
//! Fragments are only ever appended. The full text is rebuilt from the
//! fragments on every [`TokenBuffer::content`] call instead of being cached,
//! so it can never drift from the buffer.

use chrono::{DateTime, Utc};

/// Ordered sequence of text fragments received during a turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBuffer {
    tokens: Vec<String>,
    /// Running sum of fragment lengths in UTF-8 bytes.
    bytes_received: usize,
    first_token_at: Option<DateTime<Utc>>,
}

impl TokenBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one fragment.
    pub fn push(&mut self, token: String, now: DateTime<Utc>) {
        if self.first_token_at.is_none() {
            self.first_token_at = Some(now);
        }
        self.bytes_received += token.len();
        self.tokens.push(token);
    }

    /// Appends fragments in order, returning how many were appended.
    pub fn extend<I>(&mut self, tokens: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.tokens.len();
        for token in tokens {
            self.push(token, now);
        }
        self.tokens.len() - before
    }

    /// Concatenation of all fragments in arrival order.
    pub fn content(&self) -> String {
        self.tokens.concat()
    }

    #[inline]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of fragments. Always equal to `tokens().len()`.
    #[inline]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn bytes_received(&self) -> usize {
        self.bytes_received
    }

    /// When the first fragment arrived.
    #[inline]
    pub fn first_token_at(&self) -> Option<DateTime<Utc>> {
        self.first_token_at
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
        self.bytes_received = 0;
        self.first_token_at = None;
    }
}
