//! Stage C process: measures the B→C hop delay, the end-to-end total, and
//! exposes a moving average of the A→B delay over the last `W` samples.

use anyhow::{anyhow, Context, Result};
use log::info;

use trackpipe::config::{moving_average_window, Profile};
use trackpipe::rt::PRIORITY_WORKER;
use trackpipe::stage_c;

fn main() -> Result<()> {
    env_logger::init();

    let profile = if std::env::args().any(|a| a == "--dev") {
        Profile::Development
    } else {
        Profile::Production
    };
    let window = moving_average_window();

    let (stage, process, moving_average) = stage_c::build(profile, window);

    if !stage.start(Some(3), Some(PRIORITY_WORKER), process) {
        stage.stop();
        return Err(anyhow!("stage C failed to start, see log for the offending endpoint"));
    }
    info!("stage C running (moving average window = {})", window);

    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, std::sync::atomic::Ordering::SeqCst))
        .context("failed to install signal handler")?;

    while running.load(std::sync::atomic::Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(500));
        info!("average first-hop delay: {:.1} us", moving_average.average());
    }

    info!("stage C shutting down");
    stage.stop();
    Ok(())
}
