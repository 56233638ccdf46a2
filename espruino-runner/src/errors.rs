use snafu::Snafu;

pub use crate::errors::Error::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Runtime error: Are you sure your code runs inside #[espruino_runner::runtime]?
    RuntimeError,
    /// Process error: {source}.
    ProcessError { source: ProcessError },
    /// Device error: {source}.
    DeviceError { source: DeviceError },
    /// Unknown error: {info}.
    Unknown { info: String },
}

impl From<ProcessError> for Error {
    fn from(value: ProcessError) -> Self {
        Self::ProcessError { source: value }
    }
}

impl From<DeviceError> for Error {
    fn from(value: DeviceError) -> Self {
        Self::DeviceError { source: value }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::DeviceError {
            source: DeviceError::InvalidMapping {
                info: value.to_string(),
            },
        }
    }
}

/// Failures around the espruino-cli child process.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProcessError {
    /// Failed to spawn '{program}': {info}
    SpawnFailed { program: String, info: String },
}

/// Reasons for a discovered entry not to be a runnable device.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DeviceError {
    /// Device on port '{port}' has no runtime
    MissingRuntime { port: String },
    /// Device on port '{port}' runs an unsupported runtime ({runtime})
    UnsupportedRuntime { port: String, runtime: String },
    /// Device has no port
    MissingPort,
    /// Invalid device mapping: {info}
    InvalidMapping { info: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let runtime_error = RuntimeError;
        assert_eq!(
            format!("{}", runtime_error),
            "Runtime error: Are you sure your code runs inside #[espruino_runner::runtime]?"
        );

        let process_error = Error::from(ProcessError::SpawnFailed {
            program: "node".to_string(),
            info: "No such file or directory".to_string(),
        });
        assert_eq!(
            format!("{}", process_error),
            "Process error: Failed to spawn 'node': No such file or directory."
        );

        let device_error = Error::from(DeviceError::UnsupportedRuntime {
            port: "port2".to_string(),
            runtime: "kinoma".to_string(),
        });
        assert_eq!(
            format!("{}", device_error),
            "Device error: Device on port 'port2' runs an unsupported runtime (kinoma)."
        );

        let unknown_error = Unknown {
            info: "Some unknown error".to_string(),
        };
        assert_eq!(
            format!("{}", unknown_error),
            "Unknown error: Some unknown error."
        );
    }

    #[test]
    fn test_from_device_error() {
        let error: Error = DeviceError::MissingPort.into();
        assert_eq!(format!("{}", error), "Device error: Device has no port.");
    }

    #[test]
    fn test_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).starts_with("Device error: Invalid device mapping: "));
    }
}
