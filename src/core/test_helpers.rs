//! Shared test utilities for core module tests
//!
//! Provides a scriptable in-memory engine so manager tests never touch real
//! nftables. This module is only compiled in test mode.

use crate::core::engine::{RulesetContext, RulesetEngine};
use crate::core::error::BufferSink;
use crate::core::flags::OutputFlags;
use std::cell::Cell;
use std::io;
use std::sync::Mutex;

/// Mutex for tests that need exclusive access to environment variables.
///
/// Hold the guard while mutating env vars and restore them before releasing
/// it, so parallel tests never observe each other's state.
pub static ENV_VAR_MUTEX: Mutex<()> = Mutex::new(());

/// Scriptable in-memory ruleset-control engine.
///
/// The default engine honors everything: buffers enable, dry-run transitions
/// stick, `add table` mutates a simulated table list that `list ruleset`
/// renders (as JSON when the flag is set). The builders below introduce the
/// failure modes the manager must handle.
#[derive(Debug, Default)]
pub struct MockEngine {
    fail_next_buffer: Cell<Option<BufferSink>>,
    pinned_dry_run: Option<bool>,
}

impl MockEngine {
    /// Engine whose NEXT created context refuses to enable the given buffer.
    /// Contexts created after that behave normally, so recovery via a second
    /// initialization is testable.
    pub fn fail_next_buffer(sink: BufferSink) -> Self {
        Self {
            fail_next_buffer: Cell::new(Some(sink)),
            ..Self::default()
        }
    }

    /// Engine whose contexts ignore dry-run change requests and stay at
    /// `value`.
    pub fn pinned_dry_run(value: bool) -> Self {
        Self {
            pinned_dry_run: Some(value),
            ..Self::default()
        }
    }
}

impl RulesetEngine for MockEngine {
    fn create_context(&self) -> Box<dyn RulesetContext> {
        Box::new(MockContext {
            fail_buffer: self.fail_next_buffer.take(),
            pinned_dry_run: self.pinned_dry_run,
            flags: OutputFlags::DEFAULT,
            dry_run: self.pinned_dry_run.unwrap_or(false),
            output: String::new(),
            error: String::new(),
            tables: Vec::new(),
        })
    }
}

#[derive(Debug)]
struct MockContext {
    fail_buffer: Option<BufferSink>,
    pinned_dry_run: Option<bool>,
    flags: OutputFlags,
    dry_run: bool,
    output: String,
    error: String,
    tables: Vec<String>,
}

impl MockContext {
    fn render_ruleset(&self) -> String {
        if self.flags.contains(OutputFlags::JSON) {
            let mut entries = vec![serde_json::json!({
                "metainfo": { "json_schema_version": 1 }
            })];
            for table in &self.tables {
                let (family, name) = table.split_once(' ').unwrap_or(("inet", table));
                entries.push(serde_json::json!({
                    "table": { "family": family, "name": name }
                }));
            }
            serde_json::json!({ "nftables": entries }).to_string()
        } else {
            self.tables
                .iter()
                .map(|table| format!("table {table} {{\n}}\n"))
                .collect()
        }
    }
}

impl RulesetContext for MockContext {
    fn output_flags(&self) -> OutputFlags {
        self.flags
    }

    fn set_output_flags(&mut self, flags: OutputFlags) {
        self.flags = flags;
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }

    fn set_dry_run(&mut self, enable: bool) {
        if self.pinned_dry_run.is_none() {
            self.dry_run = enable;
        }
    }

    fn buffer_output(&mut self) -> io::Result<()> {
        if self.fail_buffer == Some(BufferSink::Output) {
            return Err(io::Error::other("buffer rejected by engine"));
        }
        Ok(())
    }

    fn buffer_error(&mut self) -> io::Result<()> {
        if self.fail_buffer == Some(BufferSink::Error) {
            return Err(io::Error::other("buffer rejected by engine"));
        }
        Ok(())
    }

    fn run_command(&mut self, command: &str) -> i32 {
        self.output.clear();
        self.error.clear();

        let command = command.trim();
        if command.is_empty() {
            self.error = "Error: syntax error, unexpected end of file".to_string();
            return 1;
        }
        if let Some(table) = command.strip_prefix("add table ") {
            if !self.dry_run {
                self.tables.push(table.to_string());
            }
            if self.flags.contains(OutputFlags::ECHO) {
                self.output = format!("{command}\n");
            }
            return 0;
        }
        if command == "list ruleset" {
            self.output = self.render_ruleset();
            return 0;
        }
        self.error = format!(
            "Error: syntax error, unexpected {}",
            command.split_whitespace().next().unwrap_or(command)
        );
        1
    }

    fn output_buffer(&self) -> &str {
        &self.output
    }

    fn error_buffer(&self) -> &str {
        &self.error
    }
}
