//! # Dial Actuator
//!
//! The indicator hardware behind a one-method trait: accept an angle in
//! [0, 180] and move the pointer there. Powering the servo rail up and down
//! around the move is the hardware's concern, not the cycle logic's.
//!
//! Two implementations, following the development-vs-hardware split used
//! for the display in earlier hardware projects:
//! - [`ConsoleActuator`] draws an ASCII gauge on stdout (default build)
//! - `ServoActuator` drives a hobby servo over hardware PWM (Linux with the
//!   `hardware` feature)

use anyhow::Result;

/// Dial positioning hardware.
pub trait Actuator {
    /// Move the pointer to `degrees` on the [0, 180] face. Implementations
    /// may block for the physical settle time.
    fn set_angle(&mut self, degrees: u8) -> Result<()>;
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn set_angle(&mut self, degrees: u8) -> Result<()> {
        (**self).set_angle(degrees)
    }
}

/// Development actuator: renders the dial as an ASCII gauge on stdout.
#[derive(Debug, Default)]
pub struct ConsoleActuator;

impl Actuator for ConsoleActuator {
    fn set_angle(&mut self, degrees: u8) -> Result<()> {
        println!("{}", render_gauge(degrees));
        Ok(())
    }
}

/// ASCII half-dial: one cell per 5 degrees, high water at both ends, low
/// water in the middle.
pub fn render_gauge(degrees: u8) -> String {
    let degrees = degrees.min(180);
    let cells = 37; // 0..=180 in 5° steps
    let pointer = (degrees as usize + 2) / 5;

    let mut face = String::with_capacity(cells);
    for cell in 0..cells {
        face.push(if cell == pointer { '|' } else { '·' });
    }

    let phase = match degrees {
        0 => "high water",
        180 => "high water",
        90 => "low water",
        d if d < 90 => "falling",
        _ => "rising",
    };

    format!("HIGH [{face}] HIGH  {degrees:>3}°  {phase}")
}

/// Hobby servo on the Pi's hardware PWM channel.
///
/// Standard servo timing: 20 ms frame, 500–2500 µs pulse mapped linearly
/// onto 0–180 degrees.
#[cfg(all(target_os = "linux", feature = "hardware"))]
pub mod servo {
    use super::Actuator;
    use anyhow::{Context, Result};
    use rppal::pwm::{Channel, Polarity, Pwm};
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(20);
    const PULSE_MIN_US: u64 = 500;
    const PULSE_MAX_US: u64 = 2500;
    /// Worst-case travel time for a typical hobby servo across the full arc
    const SETTLE: Duration = Duration::from_millis(600);

    pub struct ServoActuator {
        pwm: Pwm,
    }

    impl ServoActuator {
        pub fn new(channel: Channel) -> Result<Self> {
            let pwm = Pwm::with_period(
                channel,
                FRAME,
                Duration::from_micros(PULSE_MIN_US),
                Polarity::Normal,
                false,
            )
            .context("open hardware PWM channel")?;
            Ok(ServoActuator { pwm })
        }

        fn pulse_for(degrees: u8) -> Duration {
            let span = PULSE_MAX_US - PULSE_MIN_US;
            let us = PULSE_MIN_US + span * u64::from(degrees.min(180)) / 180;
            Duration::from_micros(us)
        }
    }

    impl Actuator for ServoActuator {
        fn set_angle(&mut self, degrees: u8) -> Result<()> {
            self.pwm
                .set_pulse_width(Self::pulse_for(degrees))
                .context("set servo pulse width")?;
            self.pwm.enable().context("enable PWM")?;
            std::thread::sleep(SETTLE);
            // Stop driving once settled; the dial holds position unpowered
            self.pwm.disable().context("disable PWM")?;
            Ok(())
        }
    }
}
