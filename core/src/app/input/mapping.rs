//! Logical button map and validated interpreter settings

use std::time::Duration;

use hashbrown::HashMap;

use super::ControllerConfig;

/// Button indices at or above this are rejected.
const MAX_BUTTON_INDEX: u32 = 32;

/// Controller layout family. Decides which physical indices the logical
/// buttons live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControllerFamily {
    #[default]
    Xbox,
    PlayStation,
}

impl ControllerFamily {
    pub const ALL: [ControllerFamily; 2] = [ControllerFamily::Xbox, ControllerFamily::PlayStation];

    /// Guesses the family from a device name. Anything not recognisably
    /// Sony is treated as an Xbox-style pad.
    pub fn from_device_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if ["playstation", "sony", "dualshock", "dualsense"]
            .iter()
            .any(|marker| name.contains(marker))
        {
            ControllerFamily::PlayStation
        } else {
            ControllerFamily::Xbox
        }
    }

    pub fn default_index(self, button: LogicalButton) -> u32 {
        match (self, button) {
            (_, LogicalButton::Select) => 0,
            (_, LogicalButton::Back) => 1,
            (ControllerFamily::Xbox, LogicalButton::Guide) => 8,
            (ControllerFamily::PlayStation, LogicalButton::Guide) => 10,
        }
    }

    fn config_name(self) -> &'static str {
        match self {
            ControllerFamily::Xbox => "xbox",
            ControllerFamily::PlayStation => "playstation",
        }
    }
}

/// Buttons the interpreter gives meaning to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalButton {
    /// Confirms the highlighted item on press
    Select,
    /// Cancels/hides on press
    Back,
    /// Toggles the overlay on long press
    Guide,
}

impl LogicalButton {
    pub const ALL: [LogicalButton; 3] = [LogicalButton::Select, LogicalButton::Back, LogicalButton::Guide];
}

/// `(family, logical button) -> physical index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMap {
    indices: HashMap<(ControllerFamily, LogicalButton), u32>,
}

impl Default for ButtonMap {
    fn default() -> Self {
        let mut indices = HashMap::new();
        for family in ControllerFamily::ALL {
            for button in LogicalButton::ALL {
                indices.insert((family, button), family.default_index(button));
            }
        }
        Self { indices }
    }
}

impl ButtonMap {
    pub fn physical(&self, family: ControllerFamily, button: LogicalButton) -> u32 {
        self.indices
            .get(&(family, button))
            .copied()
            .unwrap_or_else(|| family.default_index(button))
    }

    /// The logical button bound to `index` for `family`, if any.
    pub fn logical(&self, family: ControllerFamily, index: u32) -> Option<LogicalButton> {
        LogicalButton::ALL
            .into_iter()
            .find(|&button| self.physical(family, button) == index)
    }
}

/// Validated settings the interpreter runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    pub long_press: Duration,
    pub axis_deadzone: f32,
    pub buttons: ButtonMap,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            long_press: Duration::from_secs(1),
            axis_deadzone: 0.5,
            buttons: ButtonMap::default(),
        }
    }
}

impl InterpreterConfig {
    /// Validates `config`, replacing bad values with defaults.
    ///
    /// Returns warnings for each replaced value. A family with an out-of-range
    /// or duplicated index falls back to its default indices as a whole.
    pub fn from_config(config: &ControllerConfig) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let defaults = Self::default();

        let long_press = match Duration::try_from_secs_f32(config.long_press_duration) {
            Ok(duration) if !duration.is_zero() => duration,
            _ => {
                warnings.push(format!(
                    "controller.long_press_duration {} is not a positive number, using {}s",
                    config.long_press_duration,
                    defaults.long_press.as_secs_f32()
                ));
                defaults.long_press
            }
        };

        let axis_deadzone = if config.axis_deadzone > 0.0 && config.axis_deadzone < 1.0 {
            config.axis_deadzone
        } else {
            warnings.push(format!(
                "controller.axis_deadzone {} is outside (0.0, 1.0), using {}",
                config.axis_deadzone, defaults.axis_deadzone
            ));
            defaults.axis_deadzone
        };

        let mut buttons = ButtonMap::default();
        for family in ControllerFamily::ALL {
            let configured = config.button_mapping.family(family);
            let resolved: Vec<(LogicalButton, u32)> = LogicalButton::ALL
                .into_iter()
                .map(|b| (b, configured.get(b).unwrap_or_else(|| family.default_index(b))))
                .collect();

            if let Some(problem) = family_problem(&resolved) {
                warnings.push(format!(
                    "controller.button_mapping.{}: {}, using defaults",
                    family.config_name(),
                    problem
                ));
                continue;
            }
            for (button, index) in resolved {
                buttons.indices.insert((family, button), index);
            }
        }

        (
            Self {
                long_press,
                axis_deadzone,
                buttons,
            },
            warnings,
        )
    }
}

fn family_problem(resolved: &[(LogicalButton, u32)]) -> Option<String> {
    if let Some((button, index)) = resolved.iter().find(|(_, i)| *i >= MAX_BUTTON_INDEX) {
        return Some(format!("{:?} index {} is out of range", button, index));
    }
    for (i, (a, index)) in resolved.iter().enumerate() {
        if let Some((b, _)) = resolved[i + 1..].iter().find(|(_, other)| other == index) {
            return Some(format!("{:?} and {:?} share index {}", a, b, index));
        }
    }
    None
}
