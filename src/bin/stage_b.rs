//! Stage B process: measures the A→B hop delay and forwards `DelayTrack`s.

use anyhow::{anyhow, Context, Result};
use log::info;

use trackpipe::config::Profile;
use trackpipe::rt::PRIORITY_WORKER;
use trackpipe::stage_b;

fn main() -> Result<()> {
    env_logger::init();

    let profile = if std::env::args().any(|a| a == "--dev") {
        Profile::Development
    } else {
        Profile::Production
    };

    let (stage, process) = stage_b::build(profile);

    if !stage.start(Some(3), Some(PRIORITY_WORKER), process) {
        stage.stop();
        return Err(anyhow!("stage B failed to start, see log for the offending endpoint"));
    }
    info!("stage B running");

    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, std::sync::atomic::Ordering::SeqCst))
        .context("failed to install signal handler")?;

    while running.load(std::sync::atomic::Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    info!("stage B shutting down");
    stage.stop();
    Ok(())
}
