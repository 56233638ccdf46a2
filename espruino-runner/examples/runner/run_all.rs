use espruino_runner::devices::parse_devices;
use espruino_runner::process::EspruinoCli;

#[espruino_runner::runtime]
async fn main() {
    // The mapping is usually handed over by a discovery tool: only Espruino devices are kept.
    let devices = parse_devices(
        r#"{
            "/dev/ttyACM0": { "runtime": "espruino", "baudRate": 9600 },
            "/dev/ttyUSB0": { "runtime": "kinoma" }
        }"#,
    )
    .unwrap();

    // One espruino-cli per device: its output is prefixed with "espruino: ".
    EspruinoCli::default().run_all(&devices, &[]).unwrap();
}
