//! nftctx - buffered command-execution contexts for nftables ruleset control
//!
//! A small library for driving the nftables ruleset-control engine through a
//! stateful context: textual commands go in, captured output or verbatim
//! engine errors come back.
//!
//! # Architecture
//!
//! - [`core`] - Context lifecycle, output flags, error taxonomy, and the
//!   engine seam
//! - [`nft_cli`] - Production engine backed by the `nft` binary
//!
//! # Safety Features
//!
//! - A context is only usable for command execution once both capture buffers
//!   are enabled; a failed enablement releases the context instead of leaking
//!   a half-initialized handle
//! - Output flags survive context re-initialization; dry-run deliberately
//!   does not
//! - Dry-run changes are verified by reading the state back, never trusted
//!
//! # Example
//!
//! ```no_run
//! use nftctx::{ContextManager, NftCli, OutputFlags};
//!
//! # fn main() -> nftctx::Result<()> {
//! let mut manager = ContextManager::new(Box::new(NftCli::new()));
//! manager.initialize()?;
//! manager.set_output_flags(&[OutputFlags::JSON, OutputFlags::HANDLE])?;
//! let listing = manager.run_command("list ruleset")?;
//! println!("{listing}");
//! # Ok(())
//! # }
//! ```

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod core;
pub mod nft_cli;

// Re-export commonly used types
pub use core::engine::{RulesetContext, RulesetEngine};
pub use core::error::{BufferSink, Error, Result};
pub use core::flags::{OutputFlag, OutputFlags};
pub use core::manager::ContextManager;
pub use nft_cli::{NftCli, NftCliOptions};
