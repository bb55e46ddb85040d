//! Raw controller events to UI actions
//!
//! Confirm and cancel fire on button-down. The guide button only acts on
//! release, and only when it was held for at least the long-press duration.
//! Each device tracks a single pending press: a new press replaces the old one.

use std::time::Instant;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::app::grid::Direction;

use super::{ControllerFamily, InterpreterConfig, LogicalButton};

/// Stick axes reporting horizontal motion.
const X_AXES: [u32; 2] = [0, 2];
/// Stick axes reporting vertical motion, positive is down.
const Y_AXES: [u32; 2] = [1, 3];

/// Opaque per-session device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub usize);

/// A normalized device event.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    ButtonDown {
        device: DeviceId,
        button: u32,
        at: Instant,
    },
    ButtonUp {
        device: DeviceId,
        button: u32,
        at: Instant,
    },
    /// D-pad; `dy > 0` is up
    HatMove { device: DeviceId, dx: i32, dy: i32 },
    AxisMove {
        device: DeviceId,
        axis: u32,
        value: f32,
    },
    /// `name` decides the controller family
    DeviceAdded { device: DeviceId, name: String },
    DeviceRemoved { device: DeviceId },
}

/// What the presentation layer should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Confirm,
    Cancel,
    OverlayToggle,
    Move(Direction),
    ControllerListChanged,
}

pub type Actions = SmallVec<[Action; 2]>;

#[derive(Debug, Clone, Default)]
struct DeviceState {
    family: ControllerFamily,
    pending_press: Option<(u32, Instant)>,
}

/// Per-device state machine. Owned by a single task.
#[derive(Debug, Clone)]
pub struct InputInterpreter {
    config: InterpreterConfig,
    devices: HashMap<DeviceId, DeviceState>,
}

impl InputInterpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self {
            config,
            devices: HashMap::new(),
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Devices currently tracked, in id order.
    pub fn devices(&self) -> Vec<(DeviceId, ControllerFamily)> {
        let mut devices: Vec<_> = self.devices.iter().map(|(id, s)| (*id, s.family)).collect();
        devices.sort_by_key(|(id, _)| *id);
        devices
    }

    /// Consumes one event. Malformed events produce no actions.
    pub fn handle(&mut self, event: &RawEvent) -> Actions {
        let mut actions = Actions::new();

        match event {
            RawEvent::ButtonDown { device, button, at } => {
                let state = self.devices.entry(*device).or_default();
                state.pending_press = Some((*button, *at));

                match self.config.buttons.logical(state.family, *button) {
                    Some(LogicalButton::Select) => actions.push(Action::Confirm),
                    Some(LogicalButton::Back) => actions.push(Action::Cancel),
                    Some(LogicalButton::Guide) | None => {}
                }
            }
            RawEvent::ButtonUp { device, button, at } => {
                let Some(state) = self.devices.get_mut(device) else {
                    return actions;
                };
                // The release is timed against whatever press is pending.
                if let Some((_, pressed_at)) = state.pending_press.take() {
                    let held = at.saturating_duration_since(pressed_at);
                    let guide = self
                        .config
                        .buttons
                        .physical(state.family, LogicalButton::Guide);
                    if *button == guide {
                        if held >= self.config.long_press {
                            tracing::info!("Guide long press ({:?}) on {:?}", held, device);
                            actions.push(Action::OverlayToggle);
                        } else {
                            tracing::debug!("Guide released after {:?}, ignored", held);
                        }
                    }
                }
            }
            RawEvent::HatMove { dx, dy, .. } => {
                if *dx > 0 {
                    actions.push(Action::Move(Direction::Right));
                } else if *dx < 0 {
                    actions.push(Action::Move(Direction::Left));
                }
                if *dy > 0 {
                    actions.push(Action::Move(Direction::Up));
                } else if *dy < 0 {
                    actions.push(Action::Move(Direction::Down));
                }
            }
            RawEvent::AxisMove {
                device,
                axis,
                value,
            } => {
                if !value.is_finite() {
                    tracing::warn!("Ignoring non-finite axis {} value on {:?}", axis, device);
                    return actions;
                }
                let deadzone = self.config.axis_deadzone;
                let (positive, negative) = if X_AXES.contains(axis) {
                    (Direction::Right, Direction::Left)
                } else if Y_AXES.contains(axis) {
                    (Direction::Down, Direction::Up)
                } else {
                    return actions;
                };
                // Level-triggered: every sample past the deadzone moves.
                if *value > deadzone {
                    actions.push(Action::Move(positive));
                } else if *value < -deadzone {
                    actions.push(Action::Move(negative));
                }
            }
            RawEvent::DeviceAdded { device, name } => {
                if !self.devices.contains_key(device) {
                    let family = ControllerFamily::from_device_name(name);
                    tracing::info!("Controller {:?} added: {} ({:?})", device, name, family);
                    self.devices.insert(
                        *device,
                        DeviceState {
                            family,
                            pending_press: None,
                        },
                    );
                }
                actions.push(Action::ControllerListChanged);
            }
            RawEvent::DeviceRemoved { device } => {
                if self.devices.remove(device).is_some() {
                    tracing::info!("Controller {:?} removed", device);
                }
                actions.push(Action::ControllerListChanged);
            }
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const PAD: DeviceId = DeviceId(0);

    fn interpreter() -> InputInterpreter {
        InputInterpreter::new(InterpreterConfig::default())
    }

    fn down(button: u32, at: Instant) -> RawEvent {
        RawEvent::ButtonDown {
            device: PAD,
            button,
            at,
        }
    }

    fn up(button: u32, at: Instant) -> RawEvent {
        RawEvent::ButtonUp {
            device: PAD,
            button,
            at,
        }
    }

    fn added(name: &str) -> RawEvent {
        RawEvent::DeviceAdded {
            device: PAD,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_short_guide_press_is_swallowed() {
        let mut interp = interpreter();
        let t0 = Instant::now();
        assert!(interp.handle(&down(8, t0)).is_empty());
        assert!(interp.handle(&up(8, t0 + Duration::from_millis(600))).is_empty());
    }

    #[test]
    fn test_long_guide_press_toggles_once() {
        let mut interp = interpreter();
        let t0 = Instant::now();
        interp.handle(&down(8, t0));
        let actions = interp.handle(&up(8, t0 + Duration::from_millis(1200)));
        assert_eq!(actions.as_slice(), &[Action::OverlayToggle]);

        // pending press was consumed
        let again = interp.handle(&up(8, t0 + Duration::from_millis(1500)));
        assert!(again.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut interp = interpreter();
        let t0 = Instant::now();
        interp.handle(&down(8, t0));
        let actions = interp.handle(&up(8, t0 + Duration::from_secs(1)));
        assert_eq!(actions.as_slice(), &[Action::OverlayToggle]);
    }

    #[test]
    fn test_confirm_and_cancel_on_press() {
        let mut interp = interpreter();
        let t0 = Instant::now();
        assert_eq!(interp.handle(&down(0, t0)).as_slice(), &[Action::Confirm]);
        assert!(interp.handle(&up(0, t0)).is_empty());
        assert_eq!(interp.handle(&down(1, t0)).as_slice(), &[Action::Cancel]);
        assert!(interp.handle(&down(5, t0)).is_empty());
    }

    #[test]
    fn test_newer_press_replaces_pending() {
        let mut interp = interpreter();
        let t0 = Instant::now();
        interp.handle(&down(8, t0));
        interp.handle(&down(3, t0 + Duration::from_millis(900)));
        // timed from the newer press, so too short
        let actions = interp.handle(&up(8, t0 + Duration::from_millis(1500)));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_playstation_guide_index() {
        let mut interp = interpreter();
        interp.handle(&added("Sony Interactive Entertainment DualSense"));
        let t0 = Instant::now();

        interp.handle(&down(8, t0));
        assert!(interp.handle(&up(8, t0 + Duration::from_secs(2))).is_empty());

        interp.handle(&down(10, t0));
        let actions = interp.handle(&up(10, t0 + Duration::from_secs(2)));
        assert_eq!(actions.as_slice(), &[Action::OverlayToggle]);
    }

    #[test]
    fn test_hat_moves_both_axes() {
        let mut interp = interpreter();
        let actions = interp.handle(&RawEvent::HatMove {
            device: PAD,
            dx: 1,
            dy: -1,
        });
        assert_eq!(
            actions.as_slice(),
            &[Action::Move(Direction::Right), Action::Move(Direction::Down)]
        );
        let centered = interp.handle(&RawEvent::HatMove {
            device: PAD,
            dx: 0,
            dy: 0,
        });
        assert!(centered.is_empty());
    }

    #[test]
    fn test_axis_deadzone() {
        let mut interp = interpreter();
        let axis = |axis, value| RawEvent::AxisMove {
            device: PAD,
            axis,
            value,
        };

        assert!(interp.handle(&axis(0, 0.5)).is_empty());
        assert_eq!(
            interp.handle(&axis(0, 0.8)).as_slice(),
            &[Action::Move(Direction::Right)]
        );
        assert_eq!(
            interp.handle(&axis(3, -0.9)).as_slice(),
            &[Action::Move(Direction::Up)]
        );
        assert_eq!(
            interp.handle(&axis(1, 0.9)).as_slice(),
            &[Action::Move(Direction::Down)]
        );
        assert!(interp.handle(&axis(4, 1.0)).is_empty());
        assert!(interp.handle(&axis(0, f32::NAN)).is_empty());
    }

    #[test]
    fn test_held_stick_repeats_per_sample() {
        let mut interp = interpreter();
        let sample = RawEvent::AxisMove {
            device: PAD,
            axis: 0,
            value: -1.0,
        };
        let moves: usize = (0..5).map(|_| interp.handle(&sample).len()).sum();
        assert_eq!(moves, 5);
    }

    #[test]
    fn test_device_add_remove_idempotent() {
        let mut interp = interpreter();
        assert_eq!(
            interp.handle(&added("Xbox Wireless Controller")).as_slice(),
            &[Action::ControllerListChanged]
        );
        assert_eq!(
            interp.handle(&added("Sony DualShock 4")).as_slice(),
            &[Action::ControllerListChanged]
        );
        // re-adding did not change the family
        assert_eq!(interp.devices(), vec![(PAD, ControllerFamily::Xbox)]);

        let removed = RawEvent::DeviceRemoved { device: PAD };
        assert_eq!(interp.handle(&removed).as_slice(), &[Action::ControllerListChanged]);
        assert_eq!(interp.handle(&removed).as_slice(), &[Action::ControllerListChanged]);
        assert!(interp.devices().is_empty());
    }

    #[test]
    fn test_removal_drops_pending_press() {
        let mut interp = interpreter();
        let t0 = Instant::now();
        interp.handle(&down(8, t0));
        interp.handle(&RawEvent::DeviceRemoved { device: PAD });
        assert!(interp.handle(&up(8, t0 + Duration::from_secs(3))).is_empty());
    }
}
