use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, info, warn};

use crate::ci::{Build, BuildFilter, CiProvider, Event, EventKind, Repository, Subscription};
use crate::core::{BrickBus, Uid};
use crate::{ControllerError, Display, Lamp, LampColor};

/// The hardware side of the bridge: the bus with its lamp and display.
///
/// Shutting down shows the disconnected message, turns the lamp off and disconnects the bus.
/// It happens at most once, either explicitly through [`shut_down`](Indicators::shut_down)
/// or when the value is dropped.
#[derive(Debug)]
pub struct Indicators {
    bus: Rc<RefCell<dyn BrickBus>>,
    lamp: Lamp,
    display: Display,
    shut_down: bool,
}

impl Indicators {
    /// Wraps the relay and LCD bricklets on `bus`.
    pub fn new(bus: Rc<RefCell<dyn BrickBus>>, relay: Uid, lcd: Uid) -> Self {
        Indicators {
            lamp: Lamp::new(bus.clone(), relay),
            display: Display::new(bus.clone(), lcd),
            bus,
            shut_down: false,
        }
    }

    /// Returns the lamp.
    pub fn lamp(&self) -> &Lamp {
        &self.lamp
    }

    /// Returns the display.
    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Returns whether the indicators have been shut down.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Leaves the devices in a neutral state and closes the bus.
    ///
    /// Every step is attempted even if an earlier one fails; failures are only logged.
    pub fn shut_down(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        info!("Shutting down indicators");

        if let Err(e) = self.display.print_disconnected() {
            warn!("Failed to show disconnected message: {}", e);
        }
        if let Err(e) = self.lamp.off() {
            warn!("Failed to turn lamp off: {}", e);
        }
        if let Err(e) = self.bus.borrow_mut().disconnect() {
            warn!("Failed to disconnect from brick bus: {}", e);
        }
    }
}

impl Drop for Indicators {
    fn drop(&mut self) {
        self.shut_down();
    }
}

/// Keeps the lamp and display in step with one branch of a repository.
///
/// # Examples
///
/// ```no_run
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use buildlamp::{Controller, Indicators, TcpBrickBus};
/// use buildlamp::ci::{CiProvider, Subscription, TravisClient, DEFAULT_API_URL};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let bus = Rc::new(RefCell::new(TcpBrickBus::connect("localhost", 4223)?));
/// let indicators = Indicators::new(bus, "Cwx".parse()?, "SCT31".parse()?);
///
/// let ci = TravisClient::new(DEFAULT_API_URL, "secret-token")?;
/// let repository = ci.find_repository("owner/project")?;
///
/// let mut controller = Controller::new(ci, indicators, repository, "master");
/// controller.run(Subscription::new())?;
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Controller<C: CiProvider> {
    ci: C,
    indicators: Indicators,
    repository: Repository,
    branch: String,
}

impl<C: CiProvider> Controller<C> {
    /// Creates a controller tracking `branch` of `repository`.
    pub fn new<S: Into<String>>(ci: C, indicators: Indicators, repository: Repository, branch: S) -> Self {
        Controller {
            ci,
            indicators,
            repository,
            branch: branch.into(),
        }
    }

    /// Returns the CI provider.
    pub fn ci(&self) -> &C {
        &self.ci
    }

    /// Returns the tracked branch.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the lamp and display.
    pub fn indicators(&self) -> &Indicators {
        &self.indicators
    }

    /// Shows the branch's current state.
    ///
    /// The display shows the newest running or finished build. The lamp follows the last
    /// finished build, unless that one failed, in which case it follows the newest build.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::NoBuilds`] if the branch has nothing to show, or whatever
    /// the CI provider or devices fail with.
    pub fn sync(&self) -> Result<(), ControllerError> {
        let builds = self.branch_builds()?;
        let current = builds
            .iter()
            .find(|build| build.is_finished() || build.is_running())
            .ok_or_else(|| ControllerError::NoBuilds {
                branch: self.branch.clone(),
            })?;

        self.indicators.display.print_build_info(current)?;
        info!("Build tracker running for {} on {}", self.repository.slug, self.branch);

        let color = match last_finished(&builds) {
            Some(finished) if !finished.is_red() => {
                info!("All good");
                finished.color()
            }
            Some(_) => {
                warn!("The last build failed");
                current.color()
            }
            None => current.color(),
        };
        self.indicators.lamp.set_color(color)?;
        Ok(())
    }

    /// Updates the indicators for one event.
    ///
    /// Events for other branches are ignored. Otherwise the event's build is shown, and
    /// the lamp takes its color if the event is `build:finished` or the last finished build
    /// failed; if not, the lamp keeps following the last finished build.
    pub fn handle_event(&self, event: &Event) -> Result<(), ControllerError> {
        info!("Build: {} just {} (build number {})", event.repository, event.build.state, event.build.number);

        let build = self.ci.build(event.build.id)?;
        if build.branch != self.branch {
            debug!("Ignoring build #{} on branch {}", build.number, build.branch);
            return Ok(());
        }

        let builds = self.branch_builds()?;
        self.indicators.display.print_build_info(&build)?;
        info!("Current build({}) -> {}", build.number, build.color());

        let color = match last_finished(&builds) {
            Some(finished) => {
                info!("Last finished build({}) -> {}", finished.number, finished.color());
                if event.kind == EventKind::BuildFinished || finished.is_red() {
                    build.color()
                } else {
                    finished.color()
                }
            }
            None => build.color(),
        };
        self.indicators.lamp.set_color(LampColor::from(color))?;
        Ok(())
    }

    /// Syncs, then handles events until something fails.
    ///
    /// Never returns `Ok`. Whatever stops the loop, including an interrupt, shuts the
    /// indicators down before the error is returned. An interrupt that is already pending
    /// stops the controller before it syncs.
    pub fn run(&mut self, subscription: Subscription) -> Result<(), ControllerError> {
        let result = self.listen(&subscription);
        if let Err(ref e) = result {
            error!("Build tracker stopped: {}", e);
            self.indicators.shut_down();
        }
        result
    }

    fn listen(&self, subscription: &Subscription) -> Result<(), ControllerError> {
        subscription.check_interrupted()?;
        self.sync()?;
        subscription.check_interrupted()?;
        self.ci.subscribe(&self.repository, &EventKind::ALL, subscription.publisher())?;
        loop {
            let event = subscription.next_event()?;
            self.handle_event(&event)?;
        }
    }

    fn branch_builds(&self) -> Result<Vec<Build>, ControllerError> {
        Ok(self.ci.list_builds(&self.repository, &BuildFilter::branch(self.branch.as_str()))?)
    }
}

fn last_finished(builds: &[Build]) -> Option<&Build> {
    builds.iter().find(|build| build.is_finished())
}
