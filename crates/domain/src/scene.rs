//! Scene: a named, ordered list of steps applied to every registered device.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::command::Command;
use crate::id::NodeId;

/// One per-device command template within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneStep {
    Power { on: bool },
    Level { level: u8 },
    HueSaturation { hue: u8, saturation: u8 },
}

impl SceneStep {
    /// Instantiate the step for a concrete device.
    #[must_use]
    pub fn command(self, node_id: NodeId) -> Command {
        match self {
            Self::Power { on } => Command::OnOff { node_id, on },
            Self::Level { level } => Command::MoveToLevel { node_id, level },
            Self::HueSaturation { hue, saturation } => Command::MoveToHueAndSaturation {
                node_id,
                hue,
                saturation,
            },
        }
    }
}

impl fmt::Display for SceneStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power { on: true } => f.write_str("ON"),
            Self::Power { on: false } => f.write_str("OFF"),
            Self::Level { level } => write!(f, "LEVEL {level}"),
            Self::HueSaturation { hue, saturation } => write!(f, "COLOR {hue}/{saturation}"),
        }
    }
}

/// A named automation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scene {
    pub label: String,
    pub steps: Vec<SceneStep>,
    /// Pause after every step, in milliseconds.
    pub step_delay_ms: u64,
}

const WARM: SceneStep = SceneStep::HueSaturation {
    hue: 20,
    saturation: 200,
};

impl Scene {
    /// Labels of the scenes returned by [`Scene::builtin`].
    pub const BUILTIN_LABELS: [&'static str; 5] = ["all_on", "all_off", "warm", "night_dim", "cycle"];

    /// Look up one of the predefined scenes.
    ///
    /// | Label | Steps | Delay |
    /// |-------|-------|-------|
    /// | `all_on` | on | 150 ms |
    /// | `all_off` | off | 150 ms |
    /// | `warm` | on, level 200, hue 20 / sat 200 | 150 ms |
    /// | `night_dim` | on, level 30, hue 20 / sat 200 | 150 ms |
    /// | `cycle` | on, off | 2 s |
    #[must_use]
    pub fn builtin(label: &str) -> Option<Self> {
        let (steps, step_delay_ms) = match label {
            "all_on" => (vec![SceneStep::Power { on: true }], 150),
            "all_off" => (vec![SceneStep::Power { on: false }], 150),
            "warm" => (
                vec![
                    SceneStep::Power { on: true },
                    SceneStep::Level { level: 200 },
                    WARM,
                ],
                150,
            ),
            "night_dim" => (
                vec![
                    SceneStep::Power { on: true },
                    SceneStep::Level { level: 30 },
                    WARM,
                ],
                150,
            ),
            "cycle" => (
                vec![SceneStep::Power { on: true }, SceneStep::Power { on: false }],
                2_000,
            ),
            _ => return None,
        };
        Some(Self {
            label: label.to_string(),
            steps,
            step_delay_ms,
        })
    }

    /// All predefined scenes, in [`Scene::BUILTIN_LABELS`] order.
    #[must_use]
    pub fn builtins() -> Vec<Self> {
        Self::BUILTIN_LABELS
            .iter()
            .filter_map(|label| Self::builtin(label))
            .collect()
    }

    #[must_use]
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Override the per-step pause.
    #[must_use]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
