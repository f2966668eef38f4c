use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::ci::{CiProvider, Repository, Subscription, TravisClient, DEFAULT_API_URL};
use crate::core::Uid;
use crate::tcp::{TcpBrickBus, DEFAULT_PORT};
use crate::{Controller, ControllerError, Indicators};

/// Branch tracked when neither the configuration nor the repository names one.
pub const FALLBACK_BRANCH: &str = "master";

/// Settings for the `buildlamp` binary, read from flags or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "buildlamp", version, about = "Shows a Travis CI branch's build status on a lamp and an LCD")]
pub struct Config {
    /// Host running the brick daemon.
    #[arg(long, env = "TINKERFORGE_HOST", default_value = "localhost")]
    pub tinkerforge_host: String,

    /// Port of the brick daemon.
    #[arg(long, env = "TINKERFORGE_PORT", default_value_t = DEFAULT_PORT)]
    pub tinkerforge_port: u16,

    /// UID of the Dual Relay bricklet driving the lamp.
    #[arg(long, env = "TINKERFORGE_RELAY_UID")]
    pub relay_uid: Uid,

    /// UID of the LCD 20x4 bricklet.
    #[arg(long, env = "TINKERFORGE_LCD_UID")]
    pub lcd_uid: Uid,

    /// Travis CI API token.
    #[arg(long, env = "TRAVIS_PRO_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Repository to watch, as owner/name.
    #[arg(long, env = "REPOSITORY", value_parser = parse_slug)]
    pub repository: String,

    /// Branch to track. Defaults to the repository's default branch.
    #[arg(long, env = "BRANCH")]
    pub branch: Option<String>,

    /// Travis CI API endpoint.
    #[arg(long, env = "TRAVIS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Seconds between polls for new builds.
    #[arg(long, env = "POLL_INTERVAL", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,
}

fn parse_slug(slug: &str) -> Result<String, String> {
    lazy_static! {
        static ref SLUG: Regex = Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").unwrap(); // Regex is valid so safe to unwrap.
    }

    if SLUG.is_match(slug) {
        Ok(slug.to_owned())
    } else {
        Err(format!("{:?} is not an owner/name repository slug", slug))
    }
}

/// Picks the configured branch, then the repository's default branch, then [`FALLBACK_BRANCH`].
pub fn tracked_branch(config_branch: Option<String>, repository: &Repository) -> String {
    config_branch
        .or_else(|| repository.default_branch.clone())
        .unwrap_or_else(|| FALLBACK_BRANCH.to_owned())
}

/// Connects everything described by `config` and runs the controller until it stops.
///
/// The devices are brought up first, so they can show the disconnected message if
/// anything later in start-up fails.
///
/// # Errors
///
/// Returns the error that stopped the controller, after the indicators were shut down.
/// An interrupt during start-up stops it between steps with [`CiError::Interrupted`].
///
/// [`CiError::Interrupted`]: crate::ci::CiError::Interrupted
pub fn run_from_config(config: Config, subscription: Subscription) -> Result<(), ControllerError> {
    info!(
        "Connecting to brick daemon at {}:{}",
        config.tinkerforge_host, config.tinkerforge_port
    );
    let bus = TcpBrickBus::connect(&config.tinkerforge_host, config.tinkerforge_port)?;
    subscription.check_interrupted()?;
    // From here on, dropping the indicators on an early return shuts them down.
    let indicators = Indicators::new(Rc::new(RefCell::new(bus)), config.relay_uid, config.lcd_uid);
    indicators.display().init()?;
    subscription.check_interrupted()?;

    let ci = TravisClient::new(&config.api_url, &config.access_token)?
        .with_poll_interval(Duration::from_secs(config.poll_interval));
    let repository = ci.find_repository(&config.repository)?;
    subscription.check_interrupted()?;
    let branch = tracked_branch(config.branch, &repository);
    info!("Tracking {} on branch {}", repository.slug, branch);

    let mut controller = Controller::new(ci, indicators, repository, branch);
    controller.run(subscription)
}
