//! Stage A process: extrapolates 8 Hz `Track`s to 100 Hz `ExtrapTrack`s.
//!
//! No required arguments; pass `--dev` to bind the loopback development
//! profile instead of the production multicast addresses.

use anyhow::{anyhow, Context, Result};
use log::info;

use trackpipe::config::{extrapolator_rates, Profile};
use trackpipe::rt::PRIORITY_WORKER;
use trackpipe::stage_a;

fn main() -> Result<()> {
    env_logger::init();

    let profile = if std::env::args().any(|a| a == "--dev") {
        Profile::Development
    } else {
        Profile::Production
    };
    let (f_in, f_out) = extrapolator_rates();

    let (stage, process) = stage_a::build(profile, f_in, f_out);

    if !stage.start(Some(3), Some(PRIORITY_WORKER), process) {
        stage.stop();
        return Err(anyhow!("stage A failed to start, see log for the offending endpoint"));
    }
    info!("stage A running (f_in={} Hz, f_out={} Hz)", f_in, f_out);

    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, std::sync::atomic::Ordering::SeqCst))
        .context("failed to install signal handler")?;

    while running.load(std::sync::atomic::Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    info!("stage A shutting down");
    stage.stop();
    Ok(())
}
