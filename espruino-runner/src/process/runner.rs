use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::{debug, error, warn};

use crate::devices::{filter_devices, Device, DeviceMapping};
use crate::errors::{Error, ProcessError};
use crate::process::{
    relay_output, Console, Invocation, LaunchedProcess, OutputReader, OutputStream,
    ProcessLauncher, StdConsole, SystemLauncher,
};
use crate::utils::task::{self, TaskHandler};
use crate::utils::{EventHandler, EventManager};

/// The program the espruino-cli script runs with.
pub const DEFAULT_PROGRAM: &str = "node";

/// Where the espruino-cli script is expected by default (the `espruino` npm package).
pub const DEFAULT_SCRIPT: &str = "node_modules/espruino/bin/espruino-cli.js";

/// Environment variable overriding [`DEFAULT_SCRIPT`].
pub const SCRIPT_ENV: &str = "ESPRUINO_CLI_SCRIPT";

/// Lists all events an [`EspruinoCli`] can emit/listen.
pub enum RunnerEvent {
    /// Triggered when an espruino-cli process has been started.
    OnSpawn,
    /// Triggered when an espruino-cli process is done.
    OnExit,
    /// Triggered when an espruino-cli process could not start or failed.
    OnError,
}

/// Convert events to string to facilitate usage with [`EventManager`].
impl From<RunnerEvent> for String {
    fn from(value: RunnerEvent) -> Self {
        let event = match value {
            RunnerEvent::OnSpawn => "spawn",
            RunnerEvent::OnExit => "exit",
            RunnerEvent::OnError => "error",
        };
        event.into()
    }
}

/// Payload of [`RunnerEvent::OnExit`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExitReport {
    pub device: Device,
    /// The exit code: `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

/// Payload of [`RunnerEvent::OnError`].
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorReport {
    pub device: Device,
    pub message: String,
}

/// Runs the espruino-cli tool for Espruino devices.
///
/// Each [`run`](EspruinoCli::run) starts `<program> <script> <baud_rate> <port> [extra_args...]` in the
/// background and relays its output:
/// - stdout/stderr chunks ending with a newline are prefixed with `"<runtime>: "`,
/// - a failure (spawn or process) is written as `"Error: <message>"` on stderr.
///
/// Nothing is ever reported back to the caller but through [`RunnerEvent`]s.
#[derive(Clone, Debug)]
pub struct EspruinoCli {
    program: String,
    script: String,
    launcher: Arc<dyn ProcessLauncher>,
    console: Arc<dyn Console>,
    events: EventManager,
}

impl Default for EspruinoCli {
    /// Creates a runner for `node` and the espruino-cli script found in [`SCRIPT_ENV`] (or
    /// [`DEFAULT_SCRIPT`]), writing to the process stdout/stderr.
    fn default() -> Self {
        let script = std::env::var(SCRIPT_ENV).unwrap_or_else(|_| String::from(DEFAULT_SCRIPT));
        Self::new(DEFAULT_PROGRAM, script)
    }
}

impl EspruinoCli {
    /// Creates a runner for the given program and script.
    ///
    /// # Example
    /// ```
    /// use espruino_runner::process::EspruinoCli;
    ///
    /// let cli = EspruinoCli::new("node", "/opt/espruino/bin/espruino-cli.js");
    /// assert_eq!(cli.get_program(), "node");
    /// ```
    pub fn new<P: Into<String>, S: Into<String>>(program: P, script: S) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
            launcher: Arc::new(SystemLauncher),
            console: Arc::new(StdConsole),
            events: EventManager::default(),
        }
    }

    pub fn with_program<P: Into<String>>(mut self, program: P) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_script<S: Into<String>>(mut self, script: S) -> Self {
        self.script = script.into();
        self
    }

    /// Replaces the way processes are started.
    pub fn with_launcher<L: ProcessLauncher + 'static>(mut self, launcher: L) -> Self {
        self.launcher = Arc::new(launcher);
        self
    }

    /// Replaces where the output is relayed to.
    pub fn with_console<C: Console + 'static>(mut self, console: C) -> Self {
        self.console = Arc::new(console);
        self
    }

    pub fn get_program(&self) -> &str {
        &self.program
    }

    pub fn get_script(&self) -> &str {
        &self.script
    }

    /// Builds the command line for a device: `<program> <script> <baud_rate> <port> [extra_args...]`.
    pub fn invocation(&self, device: &Device, extra_args: &[&str]) -> Invocation {
        let mut args = vec![
            self.script.clone(),
            device.get_baud_rate().to_string(),
            device.get_port().to_string(),
        ];
        args.extend(extra_args.iter().map(|arg| arg.to_string()));
        Invocation {
            program: self.program.clone(),
            args,
        }
    }

    /// Starts an espruino-cli for the device in the background.
    ///
    /// Returns right away: the process is started, relayed and waited for by a task (see [`task::run`]).
    /// Failures to start or run the process are not returned: they are written on stderr and emitted
    /// as [`RunnerEvent::OnError`].
    ///
    /// # Errors
    /// `RuntimeError` if not called within `#[espruino_runner::runtime]`.
    ///
    /// # Example
    /// ```no_run
    /// use espruino_runner::devices::Device;
    /// use espruino_runner::process::EspruinoCli;
    ///
    /// #[espruino_runner::runtime]
    /// async fn main() {
    ///     let device = Device::new("/dev/ttyACM0").with_baud_rate(9600);
    ///     EspruinoCli::default().run(&device, &["-w", "code.js"]).unwrap();
    /// }
    /// ```
    pub fn run(&self, device: &Device, extra_args: &[&str]) -> Result<TaskHandler, Error> {
        let invocation = self.invocation(device, extra_args);
        let launcher = self.launcher.clone();
        let console = self.console.clone();
        let events = self.events.clone();
        let device = device.clone();

        task::run(async move {
            supervise(launcher.as_ref(), console.as_ref(), &events, device, invocation).await;
        })
    }

    /// Starts an espruino-cli for every Espruino device of the mapping (see [`filter_devices`]).
    ///
    /// # Errors
    /// `RuntimeError` if not called within `#[espruino_runner::runtime]`.
    pub fn run_all(
        &self,
        devices: &DeviceMapping,
        extra_args: &[&str],
    ) -> Result<Vec<TaskHandler>, Error> {
        filter_devices(devices)
            .iter()
            .map(|device| self.run(device, extra_args))
            .collect()
    }

    /// Registers a callback to be executed on a given event.
    ///
    /// Available events are defined by the enum: [`RunnerEvent`]:
    /// - **`OnSpawn` | `spawn`:** Triggered when an espruino-cli has started.
    ///    _The callback must receive the following parameter: `|_: Device| { ... }`_
    /// - **`OnExit` | `exit`:** Triggered when an espruino-cli is done.
    ///    _The callback must receive the following parameter: `|_: ExitReport| { ... }`_
    /// - **`OnError` | `error`:** Triggered when an espruino-cli could not start or failed.
    ///    _The callback must receive the following parameter: `|_: ErrorReport| { ... }`_
    ///
    /// # Example
    /// ```no_run
    /// use espruino_runner::devices::Device;
    /// use espruino_runner::process::{EspruinoCli, ExitReport, RunnerEvent};
    ///
    /// #[espruino_runner::runtime]
    /// async fn main() {
    ///     let cli = EspruinoCli::default();
    ///     cli.on(RunnerEvent::OnExit, |report: ExitReport| async move {
    ///         println!("{} exited with {:?}", report.device, report.code);
    ///         Ok(())
    ///     });
    ///     cli.run(&Device::new("/dev/ttyACM0"), &[]).unwrap();
    /// }
    /// ```
    pub fn on<S, F, T, Fut>(&self, event: S, callback: F) -> EventHandler
    where
        S: Into<String>,
        T: 'static + Send + Sync + Clone,
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.events.on(event, callback)
    }
}

impl Display for EspruinoCli {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EspruinoCli({} {})", self.program, self.script)
    }
}

/// Starts an espruino-cli for the device with the default [`EspruinoCli`].
///
/// # Errors
/// `RuntimeError` if not called within `#[espruino_runner::runtime]`.
pub fn run_espruino(device: &Device, extra_args: &[&str]) -> Result<TaskHandler, Error> {
    EspruinoCli::default().run(device, extra_args)
}

/// Launches the process, relays both its streams, then waits for its exit.
async fn supervise(
    launcher: &dyn ProcessLauncher,
    console: &dyn Console,
    events: &EventManager,
    device: Device,
    invocation: Invocation,
) {
    let LaunchedProcess {
        stdout,
        stderr,
        exit,
    } = match launcher.launch(&invocation) {
        Ok(process) => process,
        Err(err) => {
            error!(
                "{}",
                Error::from(ProcessError::SpawnFailed {
                    program: invocation.program.clone(),
                    info: err.to_string(),
                })
            );
            report_error(console, events, &device, err.to_string());
            return;
        }
    };
    debug!("{} is run by: {}", device, invocation);
    events.emit(RunnerEvent::OnSpawn, device.clone());

    let runtime = device.get_runtime();
    let (stdout_result, stderr_result) = tokio::join!(
        relay(stdout, runtime, OutputStream::Stdout, console),
        relay(stderr, runtime, OutputStream::Stderr, console),
    );
    for result in [stdout_result, stderr_result] {
        if let Err(err) = result {
            report_error(console, events, &device, err.to_string());
        }
    }

    match exit.await {
        Ok(code) => {
            debug!("{} exited with code {:?}", device, code);
            events.emit(RunnerEvent::OnExit, ExitReport { device, code });
        }
        Err(err) => report_error(console, events, &device, err.to_string()),
    }
}

async fn relay(
    reader: Option<OutputReader>,
    runtime: &str,
    stream: OutputStream,
    console: &dyn Console,
) -> std::io::Result<()> {
    match reader {
        Some(reader) => relay_output(reader, runtime, stream, console).await,
        None => Ok(()),
    }
}

/// Writes the failure on stderr as "Error: <message>" and emits it.
fn report_error(console: &dyn Console, events: &EventManager, device: &Device, message: String) {
    warn!("{} failed: {}", device, message);
    let line = format!("Error: {}\n", message);
    if let Err(err) = console.write(OutputStream::Stderr, line.as_bytes()) {
        warn!("Could not report error: {}", err);
    }
    events.emit(
        RunnerEvent::OnError,
        ErrorReport {
            device: device.clone(),
            message,
        },
    );
}
