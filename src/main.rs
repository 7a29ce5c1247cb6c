//! # Tide Dial Entry Point
//!
//! Binary wiring for the tide dial: builds the concrete collaborators
//! (system clock, NOAA client, JSON file store, actuator) and runs wake
//! cycles. On a desktop or a timer-driven deployment `--once` runs a single
//! cycle and exits; the default mode loops, with `std::thread::sleep`
//! standing in for the device's deep sleep.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use log::info;
use std::env;
use std::thread;
use tide_dial_lib::actuator::{Actuator, ConsoleActuator};
use tide_dial_lib::config::Config;
use tide_dial_lib::cycle::{Orchestrator, SystemClock};
use tide_dial_lib::feed::NoaaClient;
use tide_dial_lib::schedule::{FileStore, ScheduleStore};

/// Pick the actuator for this build: real servo when the hardware feature
/// is enabled on Linux, ASCII gauge otherwise.
fn build_actuator() -> anyhow::Result<Box<dyn Actuator>> {
    #[cfg(all(target_os = "linux", feature = "hardware"))]
    {
        use rppal::pwm::Channel;
        use tide_dial_lib::actuator::servo::ServoActuator;

        let servo = ServoActuator::new(Channel::Pwm0).context("initialize servo")?;
        Ok(Box::new(servo))
    }

    #[cfg(not(all(target_os = "linux", feature = "hardware")))]
    {
        Ok(Box::new(ConsoleActuator))
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let run_once = env::args().any(|arg| arg == "--once");
    let reset = env::args().any(|arg| arg == "--reset");

    let config = Config::load();
    let store = FileStore::new(&config.store.path);

    if reset {
        store.clear().context("clear persisted schedule")?;
        info!("persisted schedule cleared");
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    let source = NoaaClient::new(&config, runtime).context("build NOAA client")?;
    let clock = SystemClock;
    let mut actuator = build_actuator()?;

    loop {
        let report = Orchestrator {
            config: &config,
            clock: &clock,
            store: &store,
            source: &source,
            actuator: &mut actuator,
        }
        .run_cycle();

        if run_once {
            return Ok(());
        }

        info!("sleeping {}s until next wake", report.sleep.as_secs());
        thread::sleep(report.sleep);
    }
}
