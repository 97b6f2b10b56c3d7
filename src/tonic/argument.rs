use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cinema::manifest::CinemaArgument;

/// Tonic argument declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TonicArgument {
    /// Discrete values, copied from Cinema.
    pub values: Vec<Value>,
    /// Index of the default value; omitted when it is the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<usize>,
    /// Widget hint (`slider` for Cinema `range` arguments).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<String>,
    /// Display label when it differs from the argument name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Interaction binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<Binding>,
    /// Looping mode.
    #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
    pub looping: Option<LoopMode>,
}

/// Interaction binding of an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Mouse binding.
    pub mouse: MouseBinding,
}

/// Mouse gestures driving an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseBinding {
    /// Drag gesture.
    pub drag: DragBinding,
}

/// Drag gesture parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragBinding {
    /// Required modifier keys bitmask.
    pub modifier: u8,
    /// Screen axis: `0` horizontal, `1` vertical.
    pub coordinate: u8,
    /// Pixels per value step.
    pub step: u32,
    /// Direction.
    pub orientation: i8,
}

/// Argument looping mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Wrap around at both ends.
    Modulo,
}

fn drag(coordinate: u8, step: u32) -> Binding {
    Binding {
        mouse: MouseBinding {
            drag: DragBinding {
                modifier: 0,
                coordinate,
                step,
                orientation: 1,
            },
        },
    }
}

/// Default interaction for camera arguments.
pub fn default_binding(name: &str) -> Option<Binding> {
    match name {
        "theta" => Some(drag(1, 30)),
        "phi" => Some(drag(0, 10)),
        _ => None,
    }
}

// Numbers compare by value so `90` and `90.0` name the same default.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

impl TonicArgument {
    /// Translate the Cinema argument `name`.
    pub fn from_cinema(name: &str, arg: &CinemaArgument) -> Self {
        let default = arg
            .default
            .as_ref()
            .and_then(|d| arg.values.iter().position(|v| same_value(v, d)))
            .filter(|&idx| idx > 0);
        let ui = (arg.ui_type.as_deref() == Some("range")).then(|| "slider".to_string());
        let label = arg.label.clone().filter(|l| l != name);
        Self {
            values: arg.values.clone(),
            default,
            ui,
            label,
            bind: default_binding(name),
            looping: (name == "phi").then_some(LoopMode::Modulo),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tonic/argument.rs"]
mod tests;
