// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Look-ahead token scanner.
//!
//! Wraps the lexer with a pending-token queue so the parser can peek an
//! arbitrary number of tokens ahead without consuming them. End of input
//! surfaces as `scan()` returning `false` and `look_ahead()` returning the
//! empty string.

use crate::lexer::split_token;
use std::collections::VecDeque;

/// Token scanner with k-token look-ahead.
///
/// `look_ahead(0)` is the current token once `scan()` has been called at
/// least once. Peeking before the first `scan()` materializes tokens into
/// the queue; the first `scan()` then only commits the already-peeked
/// front token instead of discarding it.
pub struct LookAheadScanner<'a> {
    rest: &'a str,
    pending: VecDeque<&'a str>,
    first_scan: bool,
}

impl<'a> LookAheadScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        LookAheadScanner {
            rest: text,
            pending: VecDeque::new(),
            first_scan: true,
        }
    }

    /// Pull one more token from the input into the queue.
    fn pull(&mut self) -> bool {
        match split_token(self.rest) {
            Some((consumed, token)) => {
                self.rest = &self.rest[consumed..];
                self.pending.push_back(token);
                true
            }
            None => false,
        }
    }

    /// Advance to the next token. Returns `false` at end of input.
    pub fn scan(&mut self) -> bool {
        if !self.first_scan && !self.pending.is_empty() {
            self.pending.pop_front();
        }
        self.first_scan = false;

        if self.pending.is_empty() && !self.pull() {
            return false;
        }
        true
    }

    /// The current token, or `""` before the first `scan()` / at end of
    /// input.
    pub fn text(&self) -> &'a str {
        self.pending.front().copied().unwrap_or("")
    }

    /// Byte view of the current token.
    pub fn bytes(&self) -> &'a [u8] {
        self.text().as_bytes()
    }

    /// Peek `i` tokens ahead without consuming (0 = current token).
    /// Returns `""` when the input ends before that token.
    pub fn look_ahead(&mut self, i: usize) -> &'a str {
        while self.pending.len() <= i {
            if !self.pull() {
                return "";
            }
        }
        self.pending.get(i).copied().unwrap_or("")
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
