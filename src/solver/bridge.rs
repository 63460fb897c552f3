// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use super::transport::SolverTransport;
use crate::errors::{SolverError, SolverResult};
use crate::observability::messages::solver::{
    QueryFailed, QueryFinished, QueryRejected, QueryStarted, SolverRefreshed,
};
use crate::observability::messages::StructuredLog;

/// Printed by the solver after each query so the end of a response is known.
const RESPONSE_MARKER: &str = "[verification-worker] done";

/// Answer for a query the solver would never finish reading.
const UNBALANCED_RESPONSE: &str = "(error \"unbalanced parentheses in query\")";

/// Blocking request/response access to one solver process.
///
/// Queries are serialized by an internal lock, so a bridge can be shared
/// behind an `Arc`; the one-shot queue never issues two at once anyway.
///
/// A failed round trip can leave part of a response in the pipe, so after
/// one the bridge refuses every further query.
pub struct SolverBridge {
    transport: Mutex<Box<dyn SolverTransport>>,
    next_query: AtomicU64,
    desynchronized: AtomicBool,
}

impl SolverBridge {
    pub fn new(transport: Box<dyn SolverTransport>) -> Self {
        Self {
            transport: Mutex::new(transport),
            next_query: AtomicU64::new(0),
            desynchronized: AtomicBool::new(false),
        }
    }

    /// Send `query` and block until the solver has answered all of it.
    ///
    /// The response is every line the solver printed, joined by `\n`. Solver
    /// level errors such as `(error "...")` are part of the response; only a
    /// broken channel is an `Err`. A query whose parentheses do not balance
    /// is answered with an `(error ...)` response without reaching the solver.
    pub fn ask(&self, query: &str) -> SolverResult<String> {
        let id = self.next_query.fetch_add(1, Ordering::Relaxed);
        let span = QueryStarted { query: id }.span("ask");
        let _guard = span.enter();

        QueryStarted { query: id }.log();
        if !is_balanced(query) {
            QueryRejected {
                query: id,
                reason: "unbalanced parentheses",
            }
            .log();
            return Ok(UNBALANCED_RESPONSE.to_string());
        }
        let result = self.round_trip(id, query);
        match &result {
            Ok(lines) => QueryFinished {
                query: id,
                response_lines: lines.len(),
            }
            .log(),
            Err(error) => QueryFailed { query: id, error }.log(),
        }
        result.map(|lines| lines.join("\n"))
    }

    /// Drop every declaration and assertion, keeping the process and the
    /// options it was started with.
    pub fn refresh(&self) -> SolverResult<()> {
        let id = self.next_query.fetch_add(1, Ordering::Relaxed);
        self.round_trip(id, "(reset)")?;
        SolverRefreshed { query: id }.log();
        Ok(())
    }

    /// Ask `query` on a clean context and require `expected` as the answer.
    pub(crate) fn sanity_check(&self, query: &str, expected: &str) -> SolverResult<()> {
        let answer = self.ask(query)?;
        if answer.trim() != expected {
            return Err(SolverError::SanityCheckFailed {
                expected: expected.to_string(),
                actual: answer,
            });
        }
        self.refresh()
    }

    /// Number of round trips issued so far.
    pub fn queries_issued(&self) -> u64 {
        self.next_query.load(Ordering::Relaxed)
    }

    fn round_trip(&self, id: u64, query: &str) -> SolverResult<Vec<String>> {
        let mut transport = self.transport.lock().map_err(|_| SolverError::Poisoned)?;
        if self.desynchronized.load(Ordering::Acquire) {
            return Err(SolverError::Desynchronized { query: id });
        }

        let result = exchange(&mut **transport, id, query);
        if result.is_err() {
            self.desynchronized.store(true, Ordering::Release);
        }
        result
    }
}

fn exchange(transport: &mut dyn SolverTransport, id: u64, query: &str) -> SolverResult<Vec<String>> {
    let mut payload = String::with_capacity(query.len() + RESPONSE_MARKER.len() + 12);
    payload.push_str(query);
    if !query.ends_with('\n') {
        payload.push('\n');
    }
    payload.push_str("(echo \"");
    payload.push_str(RESPONSE_MARKER);
    payload.push_str("\")\n");
    transport.send(&payload).map_err(SolverError::WriteFailed)?;

    let mut lines = Vec::new();
    loop {
        match transport.read_line().map_err(SolverError::ReadFailed)? {
            Some(line) if line == RESPONSE_MARKER => return Ok(lines),
            Some(line) => lines.push(line),
            None => return Err(SolverError::ChannelClosed { query: id }),
        }
    }
}

/// Whether every `(` in `query` is closed, ignoring string literals,
/// `|quoted symbols|` and `;` comments.
fn is_balanced(query: &str) -> bool {
    let mut depth: usize = 0;
    let mut chars = query.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            '"' => loop {
                match chars.next() {
                    // `""` is an escaped quote inside a string literal
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                    }
                    Some('"') => break,
                    Some(_) => {}
                    None => return false,
                }
            },
            '|' => {
                if !chars.by_ref().any(|c| c == '|') {
                    return false;
                }
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    depth == 0
}
