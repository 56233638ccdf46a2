use espruino_runner::devices::Device;
use espruino_runner::process::run_espruino;

#[espruino_runner::runtime]
async fn main() {
    let device = Device::new("/dev/ttyACM0").with_baud_rate(115200);

    // Runs: node node_modules/espruino/bin/espruino-cli.js 115200 /dev/ttyACM0 -e "print(2 + 2)"
    run_espruino(&device, &["-e", "print(2 + 2)"]).unwrap();
}
