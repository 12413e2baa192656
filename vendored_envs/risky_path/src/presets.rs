use crate::config::EnvConfig;
use crate::engine::RiskyPathEnv;
use crate::error::RiskyPathError;
use crate::layout;
use crate::rewards::RewardSpec;

/// Named argument bundles exposed to harnesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Legacy directional room with the fixed hazard layout and no spiky floor.
    LegacyV0,
    /// Default room, direction shown.
    V1,
    /// Default room, direction hidden.
    V2,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::LegacyV0, Preset::V1, Preset::V2];

    pub fn name(self) -> &'static str {
        match self {
            Preset::LegacyV0 => "MiniGrid-RiskyPath-v0",
            Preset::V1 => "MiniGrid-RiskyPath-v1",
            Preset::V2 => "MiniGrid-RiskyPath-v2",
        }
    }

    /// Accepts the full registration name or the short `v0`/`v1`/`v2` alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MiniGrid-RiskyPath-v0" | "v0" | "legacy" => Some(Preset::LegacyV0),
            "MiniGrid-RiskyPath-v1" | "v1" => Some(Preset::V1),
            "MiniGrid-RiskyPath-v2" | "v2" => Some(Preset::V2),
            _ => None,
        }
    }

    pub fn config(self) -> EnvConfig {
        match self {
            Preset::LegacyV0 => {
                let base = EnvConfig::default();
                EnvConfig {
                    lava_positions: Some(layout::legacy_lava_positions(base.width, base.height)),
                    spiky_positions: Some(Vec::new()),
                    // lava ends the episode without a penalty, the goal pays 1
                    reward_spec: RewardSpec { lava_reward: 0.0, ..RewardSpec::default() },
                    ..base
                }
            }
            Preset::V1 => EnvConfig::default(),
            Preset::V2 => EnvConfig { show_agent_dir: false, ..EnvConfig::default() },
        }
    }

    pub fn build(self) -> Result<RiskyPathEnv, RiskyPathError> {
        RiskyPathEnv::new(self.config())
    }
}
