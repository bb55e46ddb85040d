//! Background controller polling via gilrs
//!
//! The polling thread owns both the gilrs context and the interpreter, so no
//! interpreter state is shared. Actions are handed to the caller's thread
//! over a channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gilrs::{Axis, Button, EventType, Gilrs};

use super::{Action, ControllerFamily, DeviceId, InputInterpreter, InterpreterConfig, RawEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// D-pad axes count as pressed past this magnitude.
const DPAD_AXIS_THRESHOLD: f32 = 0.5;

/// Handle to the polling thread. Stops it on drop.
pub struct ControllerDaemon {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ControllerDaemon {
    /// Starts polling. Interpreted actions arrive on the returned receiver.
    ///
    /// If gamepad support cannot be initialized the thread logs a warning and
    /// exits, and the receiver reports disconnection.
    pub fn start(config: InterpreterConfig) -> std::io::Result<(Self, Receiver<Action>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("controller-poll".to_string())
            .spawn(move || poll_loop(config, &thread_stop, &tx))?;

        Ok((
            Self {
                stop,
                handle: Some(handle),
            },
            rx,
        ))
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the thread and waits up to one second for it to exit.
    ///
    /// Returns `false` if the thread did not stop in time. It is then left
    /// running detached.
    pub fn stop(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        self.stop.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + STOP_TIMEOUT;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                tracing::warn!("Controller polling thread did not stop in time, leaked");
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }

        if handle.join().is_err() {
            tracing::error!("Controller polling thread panicked");
        }
        true
    }
}

impl Drop for ControllerDaemon {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop(config: InterpreterConfig, stop: &AtomicBool, tx: &Sender<Action>) {
    let mut gilrs = match Gilrs::new() {
        Ok(gilrs) => gilrs,
        Err(e) => {
            tracing::warn!(
                "Failed to initialize gamepad support: {}. Controller input is disabled.",
                e
            );
            return;
        }
    };
    let mut interpreter = InputInterpreter::new(config);

    // Pads connected before startup
    let initial: Vec<RawEvent> = gilrs
        .gamepads()
        .map(|(id, pad)| RawEvent::DeviceAdded {
            device: DeviceId(usize::from(id)),
            name: pad.name().to_string(),
        })
        .collect();
    for event in &initial {
        if !dispatch(&mut interpreter, event, tx) {
            return;
        }
    }

    tracing::debug!("Controller polling started");
    while !stop.load(Ordering::SeqCst) {
        while let Some(event) = gilrs.next_event() {
            let family = ControllerFamily::from_device_name(gilrs.gamepad(event.id).name());
            let name = gilrs.gamepad(event.id).name().to_string();
            let device = DeviceId(usize::from(event.id));

            for raw in translate(device, family, &name, event.event, Instant::now()) {
                if !dispatch(&mut interpreter, &raw, tx) {
                    tracing::debug!("Action receiver dropped, stopping controller polling");
                    return;
                }
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
    tracing::debug!("Controller polling stopped");
}

/// Feeds one event through the interpreter. `false` once the receiver is gone.
fn dispatch(interpreter: &mut InputInterpreter, event: &RawEvent, tx: &Sender<Action>) -> bool {
    interpreter
        .handle(event)
        .into_iter()
        .all(|action| tx.send(action).is_ok())
}

/// Converts a gilrs event into zero or more raw events.
fn translate(
    device: DeviceId,
    family: ControllerFamily,
    name: &str,
    event: EventType,
    at: Instant,
) -> Vec<RawEvent> {
    match event {
        EventType::ButtonPressed(button, _) => {
            if let Some((dx, dy)) = dpad_direction(button) {
                return vec![RawEvent::HatMove { device, dx, dy }];
            }
            button_index(family, button)
                .map(|button| RawEvent::ButtonDown { device, button, at })
                .into_iter()
                .collect()
        }
        EventType::ButtonReleased(button, _) => button_index(family, button)
            .map(|button| RawEvent::ButtonUp { device, button, at })
            .into_iter()
            .collect(),
        EventType::AxisChanged(axis, value, _) => match axis {
            Axis::DPadX => vec![RawEvent::HatMove {
                device,
                dx: axis_step(value),
                dy: 0,
            }],
            Axis::DPadY => vec![RawEvent::HatMove {
                device,
                dx: 0,
                dy: axis_step(value),
            }],
            _ => stick_axis(axis)
                .map(|(index, flip)| RawEvent::AxisMove {
                    device,
                    axis: index,
                    value: if flip { -value } else { value },
                })
                .into_iter()
                .collect(),
        },
        EventType::Connected => vec![RawEvent::DeviceAdded {
            device,
            name: name.to_string(),
        }],
        EventType::Disconnected => vec![RawEvent::DeviceRemoved { device }],
        _ => Vec::new(),
    }
}

fn axis_step(value: f32) -> i32 {
    if value > DPAD_AXIS_THRESHOLD {
        1
    } else if value < -DPAD_AXIS_THRESHOLD {
        -1
    } else {
        0
    }
}

/// `(dx, dy)` for a D-pad button, `dy > 0` is up.
fn dpad_direction(button: Button) -> Option<(i32, i32)> {
    match button {
        Button::DPadUp => Some((0, 1)),
        Button::DPadDown => Some((0, -1)),
        Button::DPadLeft => Some((-1, 0)),
        Button::DPadRight => Some((1, 0)),
        _ => None,
    }
}

/// Stick axis index and whether to flip it so positive Y is down.
fn stick_axis(axis: Axis) -> Option<(u32, bool)> {
    match axis {
        Axis::LeftStickX => Some((0, false)),
        Axis::LeftStickY => Some((1, true)),
        Axis::RightStickX => Some((2, false)),
        Axis::RightStickY => Some((3, true)),
        _ => None,
    }
}

/// Physical index the Linux kernel drivers report for `button`.
fn button_index(family: ControllerFamily, button: Button) -> Option<u32> {
    let index = match family {
        ControllerFamily::Xbox => match button {
            Button::South => 0,
            Button::East => 1,
            Button::West => 2,
            Button::North => 3,
            Button::LeftTrigger => 4,
            Button::RightTrigger => 5,
            Button::Select => 6,
            Button::Start => 7,
            Button::Mode => 8,
            Button::LeftThumb => 9,
            Button::RightThumb => 10,
            _ => return None,
        },
        ControllerFamily::PlayStation => match button {
            Button::South => 0,
            Button::East => 1,
            Button::North => 2,
            Button::West => 3,
            Button::LeftTrigger => 4,
            Button::RightTrigger => 5,
            Button::LeftTrigger2 => 6,
            Button::RightTrigger2 => 7,
            Button::Select => 8,
            Button::Start => 9,
            Button::Mode => 10,
            Button::LeftThumb => 11,
            Button::RightThumb => 12,
            _ => return None,
        },
    };
    Some(index)
}

/// A connected controller, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeviceInfo {
    pub id: usize,
    pub name: String,
    pub buttons: usize,
    pub axes: usize,
}

const PROBE_BUTTONS: [Button; 19] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::C,
    Button::Z,
    Button::LeftTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

const PROBE_AXES: [Axis; 8] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::LeftZ,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::RightZ,
    Axis::DPadX,
    Axis::DPadY,
];

/// Point-in-time list of connected controllers.
///
/// Returns an empty list if gamepad support cannot be initialized.
pub fn detect_devices() -> Vec<DeviceInfo> {
    let gilrs = match Gilrs::new() {
        Ok(gilrs) => gilrs,
        Err(e) => {
            tracing::warn!("Failed to initialize gamepad support: {}", e);
            return Vec::new();
        }
    };

    gilrs
        .gamepads()
        .map(|(id, pad)| DeviceInfo {
            id: usize::from(id),
            name: pad.name().to_string(),
            buttons: PROBE_BUTTONS
                .iter()
                .filter(|b| pad.button_code(**b).is_some())
                .count(),
            axes: PROBE_AXES
                .iter()
                .filter(|a| pad.axis_code(**a).is_some())
                .count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::grid::Direction;
    use crate::app::input::LogicalButton;

    const PAD: DeviceId = DeviceId(3);

    #[test]
    fn test_default_map_matches_driver_indices() {
        let config = InterpreterConfig::default();
        for family in ControllerFamily::ALL {
            assert_eq!(
                button_index(family, Button::South),
                Some(config.buttons.physical(family, LogicalButton::Select))
            );
            assert_eq!(
                button_index(family, Button::East),
                Some(config.buttons.physical(family, LogicalButton::Back))
            );
            assert_eq!(
                button_index(family, Button::Mode),
                Some(config.buttons.physical(family, LogicalButton::Guide))
            );
        }
    }

    #[test]
    fn test_unmapped_buttons() {
        assert_eq!(button_index(ControllerFamily::Xbox, Button::LeftTrigger2), None);
        assert_eq!(button_index(ControllerFamily::PlayStation, Button::C), None);
    }

    #[test]
    fn test_dpad_buttons_become_hat_moves() {
        assert_eq!(dpad_direction(Button::DPadLeft), Some((-1, 0)));
        assert_eq!(dpad_direction(Button::DPadUp), Some((0, 1)));
        assert_eq!(dpad_direction(Button::South), None);
    }

    #[test]
    fn test_stick_y_is_flipped() {
        assert_eq!(stick_axis(Axis::LeftStickX), Some((0, false)));
        assert_eq!(stick_axis(Axis::RightStickY), Some((3, true)));
        assert_eq!(stick_axis(Axis::LeftZ), None);

        // gilrs reports up as positive, the interpreter expects up negative
        let (axis, flip) = stick_axis(Axis::LeftStickY).unwrap();
        let value = if flip { -0.9 } else { 0.9 };
        let mut interpreter = InputInterpreter::new(InterpreterConfig::default());
        let actions = interpreter.handle(&RawEvent::AxisMove {
            device: PAD,
            axis,
            value,
        });
        assert_eq!(actions.as_slice(), &[Action::Move(Direction::Up)]);
    }

    #[test]
    fn test_translate_connection_events() {
        let added = translate(
            PAD,
            ControllerFamily::PlayStation,
            "DualSense",
            EventType::Connected,
            Instant::now(),
        );
        assert_eq!(
            added,
            vec![RawEvent::DeviceAdded {
                device: PAD,
                name: "DualSense".to_string()
            }]
        );
        let removed = translate(
            PAD,
            ControllerFamily::PlayStation,
            "DualSense",
            EventType::Disconnected,
            Instant::now(),
        );
        assert_eq!(removed, vec![RawEvent::DeviceRemoved { device: PAD }]);
    }

    #[test]
    fn test_axis_step() {
        assert_eq!(axis_step(1.0), 1);
        assert_eq!(axis_step(-1.0), -1);
        assert_eq!(axis_step(0.2), 0);
    }
}
