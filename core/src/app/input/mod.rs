//! Controller input handling
//!
//! Raw device events are normalized into [`RawEvent`]s, then the
//! [`InputInterpreter`] turns them into navigation and activation [`Action`]s.
//! With the `gamepad` feature, [`ControllerDaemon`] feeds it from gilrs on a
//! background thread.

#[cfg(feature = "gamepad")]
mod daemon;
mod interpreter;
mod mapping;

#[cfg(feature = "gamepad")]
pub use daemon::{ControllerDaemon, DeviceInfo, detect_devices};
pub use interpreter::{Action, DeviceId, InputInterpreter, RawEvent};
pub use mapping::{ButtonMap, ControllerFamily, InterpreterConfig, LogicalButton};

use serde::{Deserialize, Serialize};

/// Controller configuration (`[controller]` section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Seconds the guide button must be held to toggle the overlay
    #[serde(default = "default_long_press_duration")]
    pub long_press_duration: f32,

    /// Stick magnitude below which motion is ignored (0.0-1.0)
    #[serde(default = "default_axis_deadzone")]
    pub axis_deadzone: f32,

    /// Physical button indices per controller family
    #[serde(default)]
    pub button_mapping: ButtonMappingConfig,
}

fn default_long_press_duration() -> f32 {
    1.0
}
fn default_axis_deadzone() -> f32 {
    0.5
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            long_press_duration: default_long_press_duration(),
            axis_deadzone: default_axis_deadzone(),
            button_mapping: ButtonMappingConfig::default(),
        }
    }
}

/// `[controller.button_mapping]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonMappingConfig {
    #[serde(default)]
    pub xbox: FamilyButtons,
    #[serde(default)]
    pub playstation: FamilyButtons,
}

impl Default for ButtonMappingConfig {
    fn default() -> Self {
        Self {
            xbox: FamilyButtons::defaults_for(ControllerFamily::Xbox),
            playstation: FamilyButtons::defaults_for(ControllerFamily::PlayStation),
        }
    }
}

/// Physical indices for one family. Unset entries use the family default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyButtons {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide: Option<u32>,
}

impl FamilyButtons {
    pub fn defaults_for(family: ControllerFamily) -> Self {
        Self {
            select: Some(family.default_index(LogicalButton::Select)),
            back: Some(family.default_index(LogicalButton::Back)),
            guide: Some(family.default_index(LogicalButton::Guide)),
        }
    }

    pub fn get(&self, button: LogicalButton) -> Option<u32> {
        match button {
            LogicalButton::Select => self.select,
            LogicalButton::Back => self.back,
            LogicalButton::Guide => self.guide,
        }
    }
}

impl ButtonMappingConfig {
    pub fn family(&self, family: ControllerFamily) -> &FamilyButtons {
        match family {
            ControllerFamily::Xbox => &self.xbox,
            ControllerFamily::PlayStation => &self.playstation,
        }
    }
}
