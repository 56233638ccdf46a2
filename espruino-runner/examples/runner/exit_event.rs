use espruino_runner::devices::Device;
use espruino_runner::process::{ErrorReport, EspruinoCli, ExitReport, RunnerEvent};

#[espruino_runner::runtime]
async fn main() {
    let cli = EspruinoCli::default();

    cli.on(RunnerEvent::OnSpawn, |device: Device| async move {
        println!("espruino-cli started for {}", device);
        Ok(())
    });

    cli.on(RunnerEvent::OnExit, |report: ExitReport| async move {
        println!("{} is done: {:?}", report.device, report.code);
        Ok(())
    });

    cli.on(RunnerEvent::OnError, |report: ErrorReport| async move {
        println!("{} failed: {}", report.device, report.message);
        Ok(())
    });

    cli.run(&Device::new("/dev/ttyACM0"), &[]).unwrap();
}
