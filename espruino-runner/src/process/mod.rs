//! Defines the espruino-cli process runner.
//!
//! An [`EspruinoCli`] starts one espruino-cli per [`Device`](crate::devices::Device) through a
//! [`ProcessLauncher`] and relays its output to a [`Console`].

mod console;
mod launcher;
mod relay;
mod runner;

pub use crate::process::console::{Console, OutputStream, StdConsole};
pub use crate::process::launcher::{
    Invocation, LaunchedProcess, OutputReader, ProcessLauncher, SystemLauncher,
};
pub use crate::process::relay::{prefix_chunk, relay_output};
pub use crate::process::runner::{
    run_espruino, ErrorReport, EspruinoCli, ExitReport, RunnerEvent, DEFAULT_PROGRAM,
    DEFAULT_SCRIPT, SCRIPT_ENV,
};
