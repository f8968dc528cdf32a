//! Context lifecycle and buffered command execution
//!
//! [`ContextManager`] owns zero-or-one live ruleset-control context and is the
//! only way commands reach the engine. It guarantees the invariants the raw
//! context API makes easy to violate:
//!
//! - a context is never dispatched to before both capture buffers are enabled
//! - output flags survive re-initialization; dry-run does not
//! - dry-run changes are verified by reading the state back
//! - the native context resource is released exactly once, including on
//!   initialization error paths
//!
//! All operations block the caller until the engine call completes. The
//! `&mut self` receivers serialize access within a thread; a multi-threaded
//! host should wrap the manager in a `Mutex` held for the full call.

use crate::core::engine::{RulesetContext, RulesetEngine};
use crate::core::error::{BufferSink, Error, Result};
use crate::core::flags::OutputFlags;
use serde_json::Value;
use tracing::{debug, warn};

/// Owns and drives one ruleset-control context.
#[derive(Debug)]
pub struct ContextManager {
    engine: Box<dyn RulesetEngine>,
    ctx: Option<Box<dyn RulesetContext>>,
}

impl ContextManager {
    /// Creates a manager with no live context. Every operation that touches
    /// the context fails with [`Error::Uninitialized`] until the first
    /// successful [`ContextManager::initialize`].
    pub fn new(engine: Box<dyn RulesetEngine>) -> Self {
        Self { engine, ctx: None }
    }

    /// Returns whether a live, buffer-enabled context exists.
    pub fn initialized(&self) -> bool {
        self.ctx.is_some()
    }

    /// Creates the context, or tears down and replaces the current one.
    ///
    /// Output flags set on the previous context are read before teardown and
    /// reapplied to the replacement; dry-run reverts to the engine default
    /// (disabled). Both capture buffers are enabled before the context is
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferEnable`] naming the failing sink if either
    /// buffer cannot be enabled. The just-created context is released on that
    /// path and the manager stays uninitialized until a later call succeeds.
    pub fn initialize(&mut self) -> Result<()> {
        // Read the sticky state, then release the old context before the
        // engine allocates its replacement.
        let previous_flags = self.ctx.take().map(|old| old.output_flags());

        let mut ctx = self.engine.create_context();
        if let Some(flags) = previous_flags {
            debug!(%flags, "restoring output flags on recreated context");
            ctx.set_output_flags(flags);
        }
        ctx.buffer_output().map_err(|source| Error::BufferEnable {
            sink: BufferSink::Output,
            source,
        })?;
        ctx.buffer_error().map_err(|source| Error::BufferEnable {
            sink: BufferSink::Error,
            source,
        })?;
        self.ctx = Some(ctx);
        Ok(())
    }

    /// Executes one command and returns the output buffer's contents.
    ///
    /// The buffers belong to the context and are reused: the returned string
    /// reflects only this command, and the next dispatch overwrites them.
    ///
    /// # Errors
    ///
    /// On a non-zero engine return code, fails with [`Error::Command`] whose
    /// message is the error buffer verbatim. The context stays usable for
    /// subsequent commands.
    pub fn run_command(&mut self, command: &str) -> Result<String> {
        let ctx = self.ctx.as_mut().ok_or(Error::Uninitialized)?;
        let code = ctx.run_command(command);
        if code != 0 {
            debug!(code, "command rejected by engine");
            return Err(Error::Command {
                message: ctx.error_buffer().to_owned(),
                code,
            });
        }
        Ok(ctx.output_buffer().to_owned())
    }

    /// Executes one command with [`OutputFlags::JSON`] OR-ed into the active
    /// flags for the duration of the call, and parses the output.
    ///
    /// The previous flag state is restored whether the command succeeds or
    /// not. Commands that produce no output (mutations without
    /// [`OutputFlags::ECHO`]) yield [`Value::Null`].
    pub fn run_json(&mut self, command: &str) -> Result<Value> {
        let ctx = self.ctx.as_mut().ok_or(Error::Uninitialized)?;
        let saved = ctx.output_flags();
        ctx.set_output_flags(saved | OutputFlags::JSON);
        let code = ctx.run_command(command);
        ctx.set_output_flags(saved);

        if code != 0 {
            return Err(Error::Command {
                message: ctx.error_buffer().to_owned(),
                code,
            });
        }
        let output = ctx.output_buffer().trim();
        if output.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(output)?)
    }

    /// Requests a dry-run mode change and verifies it took effect.
    ///
    /// The engine's setter is not trusted blindly: the actual state is read
    /// back and compared to the request. Returns the confirmed state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateVerification`] ("Dry Run mode change failed")
    /// when the engine silently refused the transition.
    pub fn set_dry_run(&mut self, enable: bool) -> Result<bool> {
        let ctx = self.ctx.as_mut().ok_or(Error::Uninitialized)?;
        ctx.set_dry_run(enable);
        let actual = ctx.dry_run();
        if actual != enable {
            warn!(requested = enable, actual, "dry-run change not honored");
            return Err(Error::StateVerification {
                change: "Dry Run mode",
            });
        }
        Ok(actual)
    }

    /// Returns the context's actual dry-run state.
    pub fn dry_run(&self) -> Result<bool> {
        let ctx = self.ctx.as_ref().ok_or(Error::Uninitialized)?;
        Ok(ctx.dry_run())
    }

    /// Combines the given values with bitwise OR and overwrites the context's
    /// entire flag state with the result.
    ///
    /// This is a full overwrite, not a merge: callers wanting cumulative
    /// flags read-modify-write via [`ContextManager::output_flags`]. Returns
    /// the authoritative value as read back from the context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when `values` is empty; the existing flag
    /// state is left unchanged.
    pub fn set_output_flags(&mut self, values: &[OutputFlags]) -> Result<OutputFlags> {
        if values.is_empty() {
            return Err(Error::Argument(
                "at least one flag value required".to_owned(),
            ));
        }
        let ctx = self.ctx.as_mut().ok_or(Error::Uninitialized)?;
        let combined = values
            .iter()
            .copied()
            .fold(OutputFlags::DEFAULT, |acc, value| acc | value);
        ctx.set_output_flags(combined);
        Ok(ctx.output_flags())
    }

    /// Returns the context's current output flag mask.
    pub fn output_flags(&self) -> Result<OutputFlags> {
        let ctx = self.ctx.as_ref().ok_or(Error::Uninitialized)?;
        Ok(ctx.output_flags())
    }
}
