//! The black-box seam over the ruleset-control engine
//!
//! The manager never talks to nftables directly; it drives a
//! [`RulesetContext`] obtained from a [`RulesetEngine`]. The trait surface
//! mirrors the underlying library's context API: flag get/set, dry-run
//! get/set, capture-buffer enablement, synchronous command dispatch, and
//! buffer read-back.
//!
//! The production implementation lives in [`crate::nft_cli`]; tests substitute
//! an in-memory engine.

use crate::core::flags::OutputFlags;
use std::fmt;
use std::io;

/// One live ruleset-control context.
///
/// Contexts are single-session state bundles: output flags, dry-run mode, and
/// the two capture buffers. They are not thread-safe; the owning manager
/// serializes access.
pub trait RulesetContext: fmt::Debug + Send {
    /// Returns the current output flag mask.
    fn output_flags(&self) -> OutputFlags;

    /// Overwrites the full flag state. Setters at this level have no failure
    /// mode; callers wanting certainty read the state back.
    fn set_output_flags(&mut self, flags: OutputFlags);

    /// Returns the actual dry-run state.
    fn dry_run(&self) -> bool;

    /// Requests a dry-run mode change. Implementations may refuse the
    /// transition; callers must verify via [`RulesetContext::dry_run`].
    fn set_dry_run(&mut self, enable: bool);

    /// Routes command output into a context-owned buffer instead of the
    /// process's stdout.
    fn buffer_output(&mut self) -> io::Result<()>;

    /// Routes engine diagnostics into a context-owned buffer instead of the
    /// process's stderr.
    fn buffer_error(&mut self) -> io::Result<()>;

    /// Executes one command synchronously. Returns 0 on success and the
    /// engine's non-zero code on failure, with the diagnostic text left in
    /// the error buffer. Implementations clear both buffers before dispatch,
    /// so read-back reflects only the most recent command.
    fn run_command(&mut self, command: &str) -> i32;

    /// Contents of the output buffer after the most recent command.
    fn output_buffer(&self) -> &str;

    /// Contents of the error buffer after the most recent command.
    fn error_buffer(&self) -> &str;
}

/// Factory for ruleset-control contexts.
pub trait RulesetEngine: fmt::Debug + Send {
    /// Allocates a fresh context with the engine's defaults: no output flags,
    /// dry-run disabled, both buffers unenabled.
    fn create_context(&self) -> Box<dyn RulesetContext>;
}
