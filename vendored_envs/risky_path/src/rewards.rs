use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::RiskyPathError;

pub const STEP_PENALTY: &str = "step_penalty";
pub const GOAL_REWARD: &str = "goal_reward";
pub const ABSORBING_STATES: &str = "absorbing_states";
pub const ABSORBING_REWARD_GOAL: &str = "absorbing_reward_goal";
pub const ABSORBING_REWARD_LAVA: &str = "absorbing_reward_lava";
pub const RISKY_TILE_REWARD: &str = "risky_tile_reward";
pub const LAVA_REWARD: &str = "lava_reward";

/// Every key a reward specification must carry, no more, no less.
pub const REQUIRED_KEYS: [&str; 7] = [
    STEP_PENALTY,
    GOAL_REWARD,
    ABSORBING_STATES,
    ABSORBING_REWARD_GOAL,
    ABSORBING_REWARD_LAVA,
    RISKY_TILE_REWARD,
    LAVA_REWARD,
];

/// Reward contributions and the absorbing-states switch.
///
/// Deserialization is strict: no field has a default and unknown fields are
/// rejected, so a JSON object must name exactly [`REQUIRED_KEYS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewardSpec {
    /// Added on every step.
    pub step_penalty: f64,
    pub goal_reward: f64,
    /// When set, goal and lava pay their absorbing reward and do not end the episode.
    pub absorbing_states: bool,
    pub absorbing_reward_goal: f64,
    pub absorbing_reward_lava: f64,
    pub risky_tile_reward: f64,
    pub lava_reward: f64,
}

impl Default for RewardSpec {
    fn default() -> Self {
        Self {
            step_penalty: 0.0,
            goal_reward: 1.0,
            absorbing_states: false,
            absorbing_reward_goal: 0.0,
            absorbing_reward_lava: 0.0,
            risky_tile_reward: 0.0,
            lava_reward: -1.0,
        }
    }
}

impl RewardSpec {
    /// Parses a JSON object carrying exactly the required keys.
    pub fn from_json(value: Json) -> Result<Self, RiskyPathError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RiskyPathError::config("reward_spec must be an object"))?;
        let missing: Vec<&str> = REQUIRED_KEYS.iter().copied().filter(|k| !obj.contains_key(*k)).collect();
        if !missing.is_empty() {
            return Err(RiskyPathError::config(format!("reward_spec missing keys: {}", missing.join(", "))));
        }
        let extra: Vec<&str> = obj.keys().map(String::as_str).filter(|k| !REQUIRED_KEYS.contains(k)).collect();
        if !extra.is_empty() {
            return Err(RiskyPathError::config(format!("reward_spec has unknown keys: {}", extra.join(", "))));
        }
        let spec: RewardSpec = serde_json::from_value(value)
            .map_err(|e| RiskyPathError::config(format!("bad reward_spec: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), RiskyPathError> {
        let amounts = [
            (STEP_PENALTY, self.step_penalty),
            (GOAL_REWARD, self.goal_reward),
            (ABSORBING_REWARD_GOAL, self.absorbing_reward_goal),
            (ABSORBING_REWARD_LAVA, self.absorbing_reward_lava),
            (RISKY_TILE_REWARD, self.risky_tile_reward),
            (LAVA_REWARD, self.lava_reward),
        ];
        for (key, v) in amounts {
            if !v.is_finite() {
                return Err(RiskyPathError::config(format!("reward_spec.{key} must be finite, got {v}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full() -> Json {
        json!({
            "step_penalty": -0.01,
            "goal_reward": 1.0,
            "absorbing_states": true,
            "absorbing_reward_goal": 0.5,
            "absorbing_reward_lava": -0.5,
            "risky_tile_reward": -0.1,
            "lava_reward": -1.0,
        })
    }

    #[test]
    fn parses_complete_spec() {
        let spec = RewardSpec::from_json(full()).unwrap();
        assert!(spec.absorbing_states);
        assert_eq!(spec.absorbing_reward_lava, -0.5);
        assert_eq!(spec.risky_tile_reward, -0.1);
    }

    #[test]
    fn missing_key_is_rejected() {
        let mut v = full();
        v.as_object_mut().unwrap().remove(RISKY_TILE_REWARD);
        let err = RewardSpec::from_json(v).unwrap_err();
        match err {
            RiskyPathError::InvalidConfiguration(msg) => assert!(msg.contains("risky_tile_reward"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extra_key_is_rejected() {
        let mut v = full();
        v.as_object_mut().unwrap().insert("bonus".into(), json!(3));
        assert!(matches!(RewardSpec::from_json(v), Err(RiskyPathError::InvalidConfiguration(_))));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut v = full();
        v.as_object_mut().unwrap().insert(ABSORBING_STATES.into(), json!("yes"));
        assert!(RewardSpec::from_json(v).is_err());
        assert!(RewardSpec::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn default_round_trips_through_required_keys() {
        let v = serde_json::to_value(RewardSpec::default()).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), REQUIRED_KEYS.len());
        assert_eq!(RewardSpec::from_json(v).unwrap(), RewardSpec::default());
    }
}
