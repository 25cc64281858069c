//! Main control loop.
//!
//! One iteration:
//!
//! 1. Make sure the feed is connected (blocks with a fixed retry interval)
//! 2. Handle at most one inbound message
//! 3. Run a controller [`tick`](crate::RigController::tick): indicator, tilt
//!    then pan moves, driver release, idle
//!
//! Everything is single-threaded and blocking. A message that arrives while
//! a move is running is picked up on the next iteration.

use core::convert::Infallible;

use tracing::info;

use crate::command::CommandOutcome;
use crate::controller::{RigController, TickReport};
use crate::error::RigError;
use crate::services::PositionFeed;
use crate::traits::{Clock, Delay, Gpio, MqttClient};

/// What one scheduler iteration did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Iteration {
    /// Connection attempts made before the session was up.
    pub connect_attempts: u32,
    /// Outcome of the message handled, if any.
    pub message: Option<CommandOutcome>,
    /// Controller work.
    pub tick: TickReport,
}

/// Owns the controller and the feed and runs the loop.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::{Config, RigController, Scheduler};
/// use rs_pantilt::axis::PanTilt;
/// use rs_pantilt::hal::{MockClock, MockGpio, MockMqtt};
/// use rs_pantilt::services::PositionFeed;
///
/// let config = Config::default();
/// let clock = MockClock::new();
/// let feed = PositionFeed::new(MockMqtt::disconnected(), &config.mqtt);
/// let rig = RigController::new(MockGpio::new(), clock.clone(), clock, config).unwrap();
///
/// let mut scheduler = Scheduler::new(rig, feed);
/// scheduler.startup().unwrap();
///
/// scheduler.feed_mut().client_mut().queue_message("stepper/position", "400/200");
/// let iteration = scheduler.iterate().unwrap();
///
/// assert_eq!(iteration.connect_attempts, 1);
/// assert!(iteration.tick.moved());
/// assert_eq!(scheduler.controller().position(), PanTilt::new(400, 200));
/// ```
pub struct Scheduler<G, C, D, M>
where
    G: Gpio,
    C: Clock,
    D: Delay,
    M: MqttClient,
{
    controller: RigController<G, C, D>,
    feed: PositionFeed<M>,
}

impl<G, C, D, M> Scheduler<G, C, D, M>
where
    G: Gpio,
    C: Clock,
    D: Delay,
    M: MqttClient,
{
    /// Create a scheduler. Call [`startup`](Self::startup) before iterating.
    pub fn new(controller: RigController<G, C, D>, feed: PositionFeed<M>) -> Self {
        Self { controller, feed }
    }

    /// Boot-time homing.
    pub fn startup(&mut self) -> Result<(), RigError<G::Error>> {
        info!("homing at startup");
        self.controller.home().map(|_| ())
    }

    /// Run one loop iteration.
    pub fn iterate(&mut self) -> Result<Iteration, RigError<G::Error>> {
        let connect_attempts = self.feed.ensure_connected(self.controller.delay_mut());
        let message = self.feed.poll(&mut self.controller)?;
        let tick = self.controller.tick()?;
        Ok(Iteration {
            connect_attempts,
            message,
            tick,
        })
    }

    /// Home, then iterate forever. Only returns on a hardware fault.
    pub fn run(mut self) -> Result<Infallible, RigError<G::Error>> {
        self.startup()?;
        loop {
            self.iterate()?;
        }
    }

    /// The controller.
    pub fn controller(&self) -> &RigController<G, C, D> {
        &self.controller
    }

    /// Mutable access to the controller.
    pub fn controller_mut(&mut self) -> &mut RigController<G, C, D> {
        &mut self.controller
    }

    /// The feed.
    pub fn feed(&self) -> &PositionFeed<M> {
        &self.feed
    }

    /// Mutable access to the feed.
    pub fn feed_mut(&mut self) -> &mut PositionFeed<M> {
        &mut self.feed
    }
}
