#![doc(html_root_url = "https://docs.rs/espruino-runner/0.1.0")]

//! <h1 align="center">ESPRUINO-RUNNER</h1>
//! <div style="text-align:center;font-style:italic;">Runs the espruino-cli tool against every Espruino device attached to your machine.</div>
//!
//! # Features
//!
//! **Espruino-Runner** is a thin layer between a device discovery source and the
//! [espruino-cli](https://www.npmjs.com/package/espruino) command line tool.
//!
//! - Keep only the [`Device`](devices::Device)s running the Espruino firmware out of a discovered
//!   [`DeviceMapping`](devices::DeviceMapping) with [`filter_devices`](devices::filter_devices).
//! - Launch one espruino-cli per device with [`EspruinoCli`](process::EspruinoCli) and get its
//!   output relayed to your own stdout/stderr, each line prefixed by the device runtime.
//! - React to [`RunnerEvent`](process::RunnerEvent)s (spawned, exited, failed).
//!
//! # Prerequisites
//!
//! - `node` must be available in your `PATH`.
//! - The `espruino` npm package must be installed: by default the tool is expected in
//!   `node_modules/espruino/bin/espruino-cli.js` (override it with the `ESPRUINO_CLI_SCRIPT`
//!   environment variable or [`EspruinoCli::with_script`](process::EspruinoCli::with_script)).
//!
//! # Getting Started
//!
//! ```no_run
//! use espruino_runner::devices::{filter_devices, parse_devices};
//! use espruino_runner::process::EspruinoCli;
//!
//! #[espruino_runner::runtime]
//! async fn main() {
//!     // The mapping is handed over by your discovery source.
//!     let devices = parse_devices(r#"{
//!         "/dev/ttyACM0": { "runtime": "espruino", "baudRate": 9600 },
//!         "/dev/ttyACM1": { "runtime": "kinoma" }
//!     }"#).unwrap();
//!
//!     // Only "/dev/ttyACM0" is kept.
//!     let cli = EspruinoCli::default();
//!     for device in filter_devices(&devices) {
//!         cli.run(&device, &[]).unwrap();
//!     }
//!     // The runtime waits for every espruino-cli to exit.
//! }
//! ```
//!
//! # Feature flags
//!
//! - **mocks** -- Provides mocked launcher and console (useful for tests mostly).

#[cfg(test)]
extern crate self as espruino_runner;

pub mod devices;
pub mod errors;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod process;
pub mod utils;

pub use espruino_macros::runtime;
