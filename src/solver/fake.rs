// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! An in-memory stand-in for an SMT-LIB2 solver.
//!
//! Understands just enough to exercise the bridge: declarations (rejecting
//! redeclaration until reset), `(assert false)`, `(check-sat)`, `(reset)` and
//! `(echo "...")`. Every command must sit on its own line.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use super::transport::SolverTransport;

#[derive(Default)]
pub(crate) struct FakeSolver {
    declared: HashSet<String>,
    inconsistent: bool,
    output: VecDeque<String>,
    crash_on: Option<String>,
    crashed: bool,
    received: Arc<Mutex<Vec<String>>>,
}

impl FakeSolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Die without answering when a command contains `pattern`.
    pub(crate) fn crash_on(mut self, pattern: &str) -> Self {
        self.crash_on = Some(pattern.to_string());
        self
    }

    /// Every command line received, in order, shared with the caller.
    pub(crate) fn received(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.received)
    }

    fn execute(&mut self, command: &str) {
        if let Ok(mut received) = self.received.lock() {
            received.push(command.to_string());
        }
        if let Some(pattern) = &self.crash_on {
            if command.contains(pattern.as_str()) {
                self.crashed = true;
                self.output.clear();
                return;
            }
        }

        if let Some(name) = declared_name(command) {
            if !self.declared.insert(name.to_string()) {
                self.output.push_back(format!(
                    "(error \"invalid declaration, constant '{}' already declared\")",
                    name
                ));
            }
        } else if command == "(assert false)" {
            self.inconsistent = true;
        } else if command.starts_with("(assert") {
            // any other assertion keeps the context satisfiable
        } else if command == "(check-sat)" {
            let answer = if self.inconsistent { "unsat" } else { "sat" };
            self.output.push_back(answer.to_string());
        } else if command == "(reset)" {
            self.declared.clear();
            self.inconsistent = false;
        } else if let Some(text) = command
            .strip_prefix("(echo \"")
            .and_then(|rest| rest.strip_suffix("\")"))
        {
            self.output.push_back(text.to_string());
        } else {
            self.output
                .push_back(format!("(error \"unsupported command: {}\")", command));
        }
    }
}

fn declared_name(command: &str) -> Option<&str> {
    command
        .strip_prefix("(declare-const ")
        .or_else(|| command.strip_prefix("(declare-fun "))
        .and_then(|rest| rest.split_whitespace().next())
}

impl SolverTransport for FakeSolver {
    fn send(&mut self, text: &str) -> io::Result<()> {
        if self.crashed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "solver exited"));
        }
        for command in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            self.execute(command);
            if self.crashed {
                break;
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.output.pop_front())
    }
}
