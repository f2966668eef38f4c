use std::error::Error;
use std::io;
use std::process;
use std::thread;

use clap::Parser;
use log::{error, info, warn};

use buildlamp::ci::{Interrupter, Subscription};
use buildlamp::{run_from_config, Config};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let subscription = Subscription::new();
    watch_ctrl_c(subscription.interrupter())?;

    run_from_config(config, subscription)?;
    Ok(())
}

/// Interrupts the subscription on Ctrl-C so the controller can shut the devices down.
/// A second Ctrl-C exits at once, for when a blocking call holds up the shutdown.
fn watch_ctrl_c(interrupter: Interrupter) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let _ = thread::Builder::new().name("ctrl-c".to_owned()).spawn(move || {
        if let Err(e) = runtime.block_on(tokio::signal::ctrl_c()) {
            error!("Can't listen for Ctrl-C: {}", e);
            return;
        }
        info!("Interrupted");
        interrupter.interrupt();

        if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            warn!("Interrupted again, exiting without shutting down");
            process::exit(130);
        }
    })?;
    Ok(())
}
