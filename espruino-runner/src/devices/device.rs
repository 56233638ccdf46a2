use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::devices::{DEFAULT_BAUD_RATE, ESPRUINO_RUNTIME};
use crate::errors::DeviceError;

/// Discovered devices, keyed by the port they have been found on.
pub type DeviceMapping = HashMap<String, DeviceInfo>;

/// Descriptor keys owned by [`Device`]: never forwarded as attributes.
const RESERVED_KEYS: [&str; 4] = ["port", "runtime", "baudRate", "baud_rate"];

/// A raw device descriptor, as handed over by the discovery source.
///
/// Only `runtime` matters for the filter: any other field is kept as-is in `attributes` and
/// forwarded to the resulting [`Device`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct DeviceInfo {
    /// The firmware family running on the device ("espruino", "kinoma", etc.).
    /// A non-string value is read as no runtime at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Serial communication speed: accepted as a string or a number, under the `baudRate` key
    /// (or `baud_rate`, ignored when both are given).
    #[serde(rename = "baudRate", skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<String>,
    /// Any other descriptor field.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl From<Map<String, Value>> for DeviceInfo {
    fn from(mut fields: Map<String, Value>) -> Self {
        let runtime = fields
            .remove("runtime")
            .and_then(|runtime| runtime.as_str().map(String::from));
        let snake_baud_rate = fields.remove("baud_rate");
        let baud_rate = match fields.remove("baudRate") {
            Some(baud_rate) => baud_rate_to_string(baud_rate),
            None => snake_baud_rate.and_then(baud_rate_to_string),
        };
        Self {
            runtime,
            baud_rate,
            attributes: fields,
        }
    }
}

impl DeviceInfo {
    /// Creates a descriptor for the given runtime.
    pub fn new<S: Into<String>>(runtime: S) -> Self {
        Self {
            runtime: Some(runtime.into()),
            ..Default::default()
        }
    }

    pub fn with_baud_rate<B: ToString>(mut self, baud_rate: B) -> Self {
        self.baud_rate = Some(baud_rate.to_string());
        self
    }

    pub fn with_attribute<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// An Espruino device ready to be handed to the espruino-cli.
///
/// Built out of a [`DeviceInfo`] by the filter: it is the same descriptor with the port it has been
/// discovered on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Device {
    port: String,
    runtime: String,
    #[serde(rename = "baudRate", skip_serializing_if = "Option::is_none")]
    baud_rate: Option<String>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Device {
    /// Creates an Espruino device on the given port.
    ///
    /// # Example
    /// ```
    /// use espruino_runner::devices::Device;
    ///
    /// let device = Device::new("/dev/ttyACM0").with_baud_rate(115200);
    /// assert_eq!(device.get_runtime(), "espruino");
    /// assert_eq!(device.get_baud_rate(), "115200");
    /// ```
    pub fn new<P: Into<String>>(port: P) -> Self {
        Self {
            port: port.into(),
            runtime: String::from(ESPRUINO_RUNTIME),
            baud_rate: None,
            attributes: Map::new(),
        }
    }

    pub fn with_runtime<S: Into<String>>(mut self, runtime: S) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn with_baud_rate<B: ToString>(mut self, baud_rate: B) -> Self {
        self.baud_rate = Some(baud_rate.to_string());
        self
    }

    /// Builds the device discovered on `port` out of its raw descriptor.
    ///
    /// # Errors
    /// * `MissingPort` if the port is empty.
    /// * `MissingRuntime` if the descriptor has no (string) runtime.
    /// * `UnsupportedRuntime` if the runtime is not [`ESPRUINO_RUNTIME`].
    pub fn from_entry(port: &str, info: &DeviceInfo) -> Result<Self, DeviceError> {
        if port.is_empty() {
            return Err(DeviceError::MissingPort);
        }
        let runtime = info
            .runtime
            .as_deref()
            .ok_or_else(|| DeviceError::MissingRuntime {
                port: port.to_string(),
            })?;
        if runtime != ESPRUINO_RUNTIME {
            return Err(DeviceError::UnsupportedRuntime {
                port: port.to_string(),
                runtime: runtime.to_string(),
            });
        }

        let mut attributes = info.attributes.clone();
        for key in RESERVED_KEYS {
            attributes.remove(key);
        }

        Ok(Self {
            port: port.to_string(),
            runtime: runtime.to_string(),
            baud_rate: info.baud_rate.clone(),
            attributes,
        })
    }

    /// Retrieves the port the device has been discovered on.
    pub fn get_port(&self) -> &str {
        &self.port
    }

    /// Retrieves the device runtime.
    pub fn get_runtime(&self) -> &str {
        &self.runtime
    }

    /// Retrieves the device baud rate, or [`DEFAULT_BAUD_RATE`] if none was discovered.
    pub fn get_baud_rate(&self) -> &str {
        self.baud_rate.as_deref().unwrap_or(DEFAULT_BAUD_RATE)
    }

    /// Retrieves the descriptor fields forwarded from the discovery source.
    pub fn get_attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl Display for Device {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.runtime, self.port)
    }
}

fn baud_rate_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(baud_rate) => Some(baud_rate),
        Value::Number(baud_rate) => Some(baud_rate.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_device_new() {
        let device = Device::new("port1");
        assert_eq!(device.get_port(), "port1");
        assert_eq!(device.get_runtime(), ESPRUINO_RUNTIME);
        assert_eq!(
            device.get_baud_rate(),
            DEFAULT_BAUD_RATE,
            "Missing baud rate falls back to the default one"
        );
        assert!(device.get_attributes().is_empty());
        assert_eq!(device.to_string(), "espruino@port1");
    }

    #[test]
    fn test_device_from_entry() {
        let info = DeviceInfo::new("espruino")
            .with_baud_rate(9600)
            .with_attribute("board", "PICO");

        let device = Device::from_entry("port1", &info).unwrap();
        assert_eq!(device.get_port(), "port1");
        assert_eq!(device.get_runtime(), "espruino");
        assert_eq!(device.get_baud_rate(), "9600");
        assert_eq!(device.get_attributes().get("board"), Some(&json!("PICO")));

        // The source descriptor is untouched.
        assert_eq!(info.attributes.len(), 1);
        assert!(info.attributes.get("port").is_none());
    }

    #[test]
    fn test_device_from_entry_rejections() {
        let result = Device::from_entry("port2", &DeviceInfo::new("kinoma"));
        assert!(matches!(
            result,
            Err(DeviceError::UnsupportedRuntime { ref runtime, .. }) if runtime == "kinoma"
        ));

        let result = Device::from_entry("port3", &DeviceInfo::default());
        assert!(matches!(result, Err(DeviceError::MissingRuntime { .. })));

        let result = Device::from_entry("", &DeviceInfo::new("espruino"));
        assert!(matches!(result, Err(DeviceError::MissingPort)));
    }

    #[test]
    fn test_device_info_deserialize() {
        let info: DeviceInfo =
            serde_json::from_value(json!({"runtime": "espruino", "baudRate": 115200, "board": "PICO"}))
                .unwrap();
        assert_eq!(info.runtime.as_deref(), Some("espruino"));
        assert_eq!(info.baud_rate.as_deref(), Some("115200"));
        assert_eq!(info.attributes.get("board"), Some(&json!("PICO")));

        let info: DeviceInfo =
            serde_json::from_value(json!({"runtime": "espruino", "baud_rate": "9600"})).unwrap();
        assert_eq!(info.baud_rate.as_deref(), Some("9600"));
        assert!(info.attributes.is_empty());

        let info: DeviceInfo = serde_json::from_value(json!({"runtime": 42})).unwrap();
        assert_eq!(info.runtime, None, "A non-string runtime is no runtime");
    }

    #[test]
    fn test_device_serialize_has_port() {
        let info = DeviceInfo::new("espruino").with_attribute("serial", "1234");
        let device = Device::from_entry("port1", &info).unwrap();

        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(
            value,
            json!({"port": "port1", "runtime": "espruino", "serial": "1234"})
        );
    }

    #[test]
    fn test_device_info_deserialize_both_baud_rate_keys() {
        let info: DeviceInfo = serde_json::from_value(
            json!({"runtime": "espruino", "baudRate": 115200, "baud_rate": "9600"}),
        )
        .unwrap();
        assert_eq!(info.baud_rate.as_deref(), Some("115200"));
        assert!(info.attributes.is_empty());

        let info: DeviceInfo =
            serde_json::from_value(json!({"runtime": "espruino", "baudRate": null, "baud_rate": 9600}))
                .unwrap();
        assert_eq!(info.baud_rate, None, "baudRate wins even when unusable");
    }

    #[test]
    fn test_device_port_is_mapping_key() {
        let info: DeviceInfo =
            serde_json::from_value(json!({"runtime": "espruino", "port": "other"})).unwrap();
        let device = Device::from_entry("port1", &info).unwrap();

        assert_eq!(device.get_port(), "port1");
        assert!(device.get_attributes().get("port").is_none());
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            json!({"port": "port1", "runtime": "espruino"})
        );
        assert_eq!(
            serde_json::to_string(&device).unwrap(),
            r#"{"port":"port1","runtime":"espruino"}"#
        );

        let info = DeviceInfo::new("espruino")
            .with_attribute("runtime", "kinoma")
            .with_attribute("baudRate", 300);
        let device = Device::from_entry("port1", &info).unwrap();
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            json!({"port": "port1", "runtime": "espruino"})
        );
    }
}
