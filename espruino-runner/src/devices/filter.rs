use log::trace;

use crate::devices::{Device, DeviceMapping};
use crate::errors::Error;

/// Keeps the Espruino devices out of a discovered mapping.
///
/// Each kept device is a copy of its descriptor with the mapping key as port. Entries with any other
/// runtime, no runtime, or an empty key are dropped: this never fails and the mapping is left untouched.
///
/// The mapping has no order: the devices are returned sorted by port.
///
/// # Example
/// ```
/// use espruino_runner::devices::{filter_devices, DeviceInfo, DeviceMapping};
///
/// let mut devices = DeviceMapping::new();
/// devices.insert("port1".into(), DeviceInfo::new("espruino"));
/// devices.insert("port2".into(), DeviceInfo::new("kinoma"));
///
/// let results = filter_devices(&devices);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].get_port(), "port1");
/// ```
pub fn filter_devices(devices: &DeviceMapping) -> Vec<Device> {
    let mut results: Vec<Device> = devices
        .iter()
        .filter_map(|(port, info)| match Device::from_entry(port, info) {
            Ok(device) => Some(device),
            Err(reason) => {
                trace!("Skip device: {}", reason);
                None
            }
        })
        .collect();
    results.sort_by(|a, b| a.get_port().cmp(b.get_port()));
    results
}

/// Decodes a device mapping given as a JSON object (port -> descriptor).
///
/// # Errors
/// `InvalidMapping` if the json is not an object of objects.
pub fn parse_devices(json: &str) -> Result<DeviceMapping, Error> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use crate::devices::{DeviceInfo, ESPRUINO_RUNTIME};

    use super::*;

    #[test]
    fn test_keeps_only_espruino_runtime() {
        let mut devices = DeviceMapping::new();
        devices.insert("port1".into(), DeviceInfo::new("espruino"));
        devices.insert("port2".into(), DeviceInfo::new("kinoma"));

        let results = filter_devices(&devices);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get_runtime(), ESPRUINO_RUNTIME);
    }

    #[test]
    fn test_creates_a_new_device_with_port_assigned() {
        let mut devices = DeviceMapping::new();
        devices.insert("port1".into(), DeviceInfo::new("espruino"));

        let results = filter_devices(&devices);

        assert_eq!(results[0].get_port(), "port1");
        assert_eq!(
            devices.get("port1"),
            Some(&DeviceInfo::new("espruino")),
            "The mapping is not modified"
        );
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let mut devices = DeviceMapping::new();
        devices.insert("port1".into(), DeviceInfo::default());
        devices.insert("".into(), DeviceInfo::new("espruino"));
        devices.insert("port3".into(), DeviceInfo::new("Espruino"));

        assert!(filter_devices(&devices).is_empty());
        assert!(filter_devices(&DeviceMapping::new()).is_empty());
    }

    #[test]
    fn test_every_espruino_device_is_kept() {
        let mut devices = DeviceMapping::new();
        devices.insert("/dev/ttyACM1".into(), DeviceInfo::new("espruino"));
        devices.insert("/dev/ttyACM0".into(), DeviceInfo::new("espruino").with_baud_rate(115200));
        devices.insert("/dev/ttyUSB0".into(), DeviceInfo::new("kinoma"));

        let results = filter_devices(&devices);

        let ports: Vec<&str> = results.iter().map(|device| device.get_port()).collect();
        assert_eq!(ports, vec!["/dev/ttyACM0", "/dev/ttyACM1"]);
        assert_eq!(results[0].get_baud_rate(), "115200");
    }

    #[test]
    fn test_parse_devices() {
        let devices = parse_devices(
            r#"{
                "port1": {"runtime": "espruino", "baudRate": 9600},
                "port2": {"runtime": "kinoma"},
                "port3": {}
            }"#,
        )
        .unwrap();
        assert_eq!(devices.len(), 3);

        let results = filter_devices(&devices);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get_port(), "port1");
        assert_eq!(results[0].get_baud_rate(), "9600");
    }

    #[test]
    fn test_parse_devices_invalid() {
        assert!(parse_devices("[1, 2]").is_err());
        assert!(parse_devices("not json").is_err());
    }
}
