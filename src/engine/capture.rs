// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Reassembles output chunks into lines.
///
/// Chunks may split lines anywhere; a trailing partial line is kept as the
/// final line when the buffer is finished.
#[derive(Debug, Default)]
pub struct LineBuffer {
    lines: Vec<String>,
    partial: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) {
        let mut rest = chunk;
        while let Some(newline) = rest.find('\n') {
            self.partial.push_str(&rest[..newline]);
            let mut line = std::mem::take(&mut self.partial);
            if line.ends_with('\r') {
                line.pop();
            }
            self.lines.push(line);
            rest = &rest[newline + 1..];
        }
        self.partial.push_str(rest);
    }

    pub fn finish(mut self) -> Vec<String> {
        if !self.partial.is_empty() {
            self.lines.push(self.partial);
        }
        self.lines
    }
}
