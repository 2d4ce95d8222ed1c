// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Line-oriented output to the pipeline console.
//!
//! Pipeline-visible progress and outcome lines are written through
//! [`OutputSink`], separately from diagnostic `tracing` output.

/// Destination for pipeline console lines.
pub trait OutputSink: Send {
    /// Write one line
    fn println(&mut self, line: &str);
}

/// Writes lines to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn println(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects lines in memory.
impl OutputSink for Vec<String> {
    fn println(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn println(&mut self, line: &str) {
        (**self).println(line);
    }
}
