use serde::{Deserialize, Serialize};

use crate::error::RiskyPathError;
use crate::layout::{self, Layout};
use crate::rewards::RewardSpec;
use crate::types::Pos;

pub const MIN_ROOM_SIZE: i32 = 6;
/// Upper bound on either side of the room.
pub const MAX_ROOM_SIZE: i32 = 256;

/// Construction-time parameters of a Risky Path room.
///
/// `lava_positions` and `spiky_positions` fall back to the height-relative
/// default pattern when `None`. Everything is checked in [`EnvConfig::resolve`];
/// an environment is never built from an unchecked config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    pub width: i32,
    pub height: i32,
    pub agent_start_pos: Pos,
    pub goal_positions: Vec<Pos>,
    #[serde(default)]
    pub lava_positions: Option<Vec<Pos>>,
    #[serde(default)]
    pub spiky_positions: Option<Vec<Pos>>,
    pub reward_spec: RewardSpec,
    /// Accepted and range-checked, never consumed: movement is deterministic.
    pub slip_proba: f64,
    pub max_steps: u32,
    pub show_agent_dir: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            width: 11,
            height: 11,
            agent_start_pos: (2, 9),
            goal_positions: layout::default_goal_positions(),
            lava_positions: None,
            spiky_positions: None,
            reward_spec: RewardSpec::default(),
            slip_proba: 0.0,
            max_steps: 150,
            show_agent_dir: true,
        }
    }
}

impl EnvConfig {
    /// Validates the config and expands the position defaults.
    pub fn resolve(&self) -> Result<Layout, RiskyPathError> {
        let (width, height) = (self.width, self.height);
        if width < MIN_ROOM_SIZE || height < MIN_ROOM_SIZE {
            return Err(RiskyPathError::config(format!(
                "room must be at least {MIN_ROOM_SIZE}x{MIN_ROOM_SIZE}, got {width}x{height}"
            )));
        }
        if width > MAX_ROOM_SIZE || height > MAX_ROOM_SIZE {
            return Err(RiskyPathError::config(format!(
                "room must be at most {MAX_ROOM_SIZE}x{MAX_ROOM_SIZE}, got {width}x{height}"
            )));
        }
        if !(self.slip_proba >= 0.0 && self.slip_proba < 1.0) {
            return Err(RiskyPathError::config(format!("slip_proba must be in [0, 1), got {}", self.slip_proba)));
        }
        if self.max_steps == 0 {
            return Err(RiskyPathError::config("max_steps must be positive"));
        }
        self.reward_spec.validate()?;

        let start = self.agent_start_pos;
        if !layout::interior(width, height, start) {
            return Err(RiskyPathError::config(format!(
                "agent_start_pos {start:?} is not inside the {width}x{height} room"
            )));
        }

        let lava = match &self.lava_positions {
            Some(v) => v.clone(),
            None => layout::default_lava_positions(width, height),
        };
        let spiky = match &self.spiky_positions {
            Some(v) => v.clone(),
            None => layout::default_spiky_positions(width, height),
        };
        let goals = self.goal_positions.clone();

        for (name, set) in [("goal", &goals), ("lava", &lava), ("spiky", &spiky)] {
            if let Some(p) = set.iter().find(|&&p| !layout::interior(width, height, p)) {
                return Err(RiskyPathError::config(format!("{name} position {p:?} is not inside the room")));
            }
        }
        if goals.contains(&start) {
            return Err(RiskyPathError::config(format!("agent_start_pos {start:?} is a goal position")));
        }
        if lava.contains(&start) {
            return Err(RiskyPathError::config(format!("agent_start_pos {start:?} is a lava position")));
        }

        Ok(Layout {
            width,
            height,
            agent_start_pos: start,
            goal_positions: goals,
            lava_positions: lava,
            spiky_positions: spiky,
        })
    }
}
