//! Process-backed ruleset-control engine driving the `nft` binary
//!
//! Each command dispatch is one `nft` invocation: output flags become
//! command-line switches, dry-run becomes `--check`, and the command text
//! travels as a single trailing argument (the nft CLI joins non-option
//! arguments into one command line). stdout and stderr are captured into the
//! context's buffers; the process exit code is the context return code.
//!
//! # Environment Variables
//!
//! - `NFTCTX_NFT_COMMAND`: overrides the program executed for each dispatch.
//!   Useful for pointing contexts at a mock script in tests, or at a wrapper
//!   that handles privilege elevation.
//!
//! # Privileges
//!
//! The engine runs `nft` directly and leaves privilege handling to the host:
//! live ruleset mutation needs `CAP_NET_ADMIN`. A context warns once when it
//! dispatches live (non-dry-run) commands without root, since the kernel will
//! refuse the mutation.
//!
//! # Flag mapping
//!
//! | flag             | switch               |
//! |------------------|----------------------|
//! | reversedns       | `--reversedns`       |
//! | service          | `--service`          |
//! | stateless        | `--stateless`        |
//! | handle           | `--handle`           |
//! | json             | `--json`             |
//! | echo             | `--echo`             |
//! | guid             | `--guid`             |
//! | numeric-protocol | `--numeric-protocol` |
//! | numeric-priority | `--numeric-priority` |
//! | numeric-symbol   | `--numeric`          |
//! | numeric-time     | `--numeric-time`     |
//! | terse            | `--terse`            |

use crate::core::engine::{RulesetContext, RulesetEngine};
use crate::core::flags::{OutputFlag, OutputFlags};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Environment variable overriding the `nft` program path
pub const NFT_COMMAND_ENV: &str = "NFTCTX_NFT_COMMAND";

/// Configuration for the CLI-backed engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftCliOptions {
    /// Program executed for each command dispatch
    #[serde(default = "default_program")]
    pub program: PathBuf,
}

impl Default for NftCliOptions {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

fn default_program() -> PathBuf {
    std::env::var_os(NFT_COMMAND_ENV).map_or_else(|| PathBuf::from("nft"), PathBuf::from)
}

/// Ruleset-control engine backed by the `nft` binary
#[derive(Debug, Clone, Default)]
pub struct NftCli {
    options: NftCliOptions,
}

impl NftCli {
    /// Creates an engine using `nft` from `PATH`, honoring
    /// [`NFT_COMMAND_ENV`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with explicit options.
    pub fn with_options(options: NftCliOptions) -> Self {
        Self { options }
    }

    /// Creates an engine running the given program.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            options: NftCliOptions {
                program: program.into(),
            },
        }
    }
}

impl RulesetEngine for NftCli {
    fn create_context(&self) -> Box<dyn RulesetContext> {
        Box::new(NftCliContext {
            program: self.options.program.clone(),
            flags: OutputFlags::DEFAULT,
            dry_run: false,
            output_buffered: false,
            error_buffered: false,
            output: String::new(),
            error: String::new(),
            privilege_warned: false,
        })
    }
}

/// Maps a single output capability to its `nft` command-line switch.
const fn cli_switch(flag: OutputFlag) -> &'static str {
    match flag {
        OutputFlag::ReverseDns => "--reversedns",
        OutputFlag::ServiceName => "--service",
        OutputFlag::Stateless => "--stateless",
        OutputFlag::Handle => "--handle",
        OutputFlag::Json => "--json",
        OutputFlag::Echo => "--echo",
        OutputFlag::Guid => "--guid",
        OutputFlag::NumericProtocol => "--numeric-protocol",
        OutputFlag::NumericPriority => "--numeric-priority",
        // No dedicated switch; --numeric is the closest CLI surface.
        OutputFlag::NumericSymbol => "--numeric",
        OutputFlag::NumericTime => "--numeric-time",
        OutputFlag::Terse => "--terse",
    }
}

#[derive(Debug)]
struct NftCliContext {
    program: PathBuf,
    flags: OutputFlags,
    dry_run: bool,
    output_buffered: bool,
    error_buffered: bool,
    output: String,
    error: String,
    privilege_warned: bool,
}

impl NftCliContext {
    fn build_command(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        for flag in self.flags.iter() {
            cmd.arg(cli_switch(flag));
        }
        if self.dry_run {
            cmd.arg("--check");
        }
        cmd.arg(command);
        cmd.stdin(Stdio::null());
        // A stream without its buffer enabled stays on the parent's stdio,
        // matching the engine's unbuffered behavior.
        cmd.stdout(if self.output_buffered {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        cmd.stderr(if self.error_buffered {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        cmd
    }
}

impl RulesetContext for NftCliContext {
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
        self.dry_run = enable;
    }

    fn buffer_output(&mut self) -> io::Result<()> {
        self.output_buffered = true;
        Ok(())
    }

    fn buffer_error(&mut self) -> io::Result<()> {
        self.error_buffered = true;
        Ok(())
    }

    fn run_command(&mut self, command: &str) -> i32 {
        self.output.clear();
        self.error.clear();

        if !self.dry_run && !self.privilege_warned && !nix::unistd::geteuid().is_root() {
            warn!("dispatching live ruleset commands without root; the kernel will refuse mutations");
            self.privilege_warned = true;
        }

        debug!(program = %self.program.display(), command, "dispatching nft command");
        match self.build_command(command).output() {
            Ok(done) => {
                if self.output_buffered {
                    self.output = String::from_utf8_lossy(&done.stdout).into_owned();
                }
                if self.error_buffered {
                    self.error = String::from_utf8_lossy(&done.stderr).into_owned();
                }
                // A signal-terminated child has no exit code
                done.status.code().unwrap_or(-1)
            }
            Err(err) => {
                self.error = format!("failed to run {}: {err}", self.program.display());
                -1
            }
        }
    }

    fn output_buffer(&self) -> &str {
        &self.output
    }

    fn error_buffer(&self) -> &str {
        &self.error
    }
}
