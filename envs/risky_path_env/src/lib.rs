use async_trait::async_trait;
use riskpath_core::{make_snapshot, EngineError, EnvRegistry, Environment, Observation, ReproducibleEngine, Snapshot, ToolCall};
use risky_path::{Action, EnvConfig, GridObservation, Pos, Preset, RewardSpec, RiskyPathEnv, RiskyPathError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::sync::Arc;

/// Registry name of the config-driven environment.
pub const ENV_NAME: &str = "RiskyPath";
pub const ENGINE_NAME: &str = "risky_path";
pub const SNAPSHOT_VERSION: u32 = 1;

/// JSON config accepted by the factory. Every field overrides the chosen
/// preset (`MiniGrid-RiskyPath-v1` when unset).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub preset: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub agent_start_pos: Option<Pos>,
    pub goal_positions: Option<Vec<Pos>>,
    pub lava_positions: Option<Vec<Pos>>,
    pub spiky_positions: Option<Vec<Pos>>,
    /// Raw object, checked for the exact reward key set.
    pub reward_spec: Option<Json>,
    pub slip_proba: Option<f64>,
    pub max_steps: Option<u32>,
    pub show_agent_dir: Option<bool>,
}

impl Config {
    pub fn from_json(cfg: Option<Json>) -> Result<Self, EngineError> {
        match cfg {
            Some(Json::Null) | None => Ok(Config::default()),
            Some(v) => serde_json::from_value(v).map_err(|e| EngineError::Validation(format!("bad config: {e}"))),
        }
    }

    pub fn to_env_config(&self) -> Result<EnvConfig, EngineError> {
        let preset = match self.preset.as_deref() {
            None => Preset::V1,
            Some(name) => Preset::from_name(name)
                .ok_or_else(|| EngineError::Validation(format!("unsupported preset: {name}")))?,
        };
        let mut cfg = preset.config();
        if let Some(w) = self.width { cfg.width = w; }
        if let Some(h) = self.height { cfg.height = h; }
        if let Some(p) = self.agent_start_pos { cfg.agent_start_pos = p; }
        if let Some(g) = &self.goal_positions { cfg.goal_positions = g.clone(); }
        if let Some(l) = &self.lava_positions { cfg.lava_positions = Some(l.clone()); }
        if let Some(s) = &self.spiky_positions { cfg.spiky_positions = Some(s.clone()); }
        if let Some(r) = &self.reward_spec { cfg.reward_spec = RewardSpec::from_json(r.clone()).map_err(map_engine_err)?; }
        if let Some(p) = self.slip_proba { cfg.slip_proba = p; }
        if let Some(m) = self.max_steps { cfg.max_steps = m; }
        if let Some(d) = self.show_agent_dir { cfg.show_agent_dir = d; }
        Ok(cfg)
    }
}

pub fn map_engine_err(err: RiskyPathError) -> EngineError {
    EngineError::Validation(err.to_string())
}

fn action_from_json(v: &Json) -> Result<Action, EngineError> {
    if let Some(name) = v.as_str() {
        return Action::from_name(name).ok_or_else(|| EngineError::Validation(format!("invalid action '{name}'")));
    }
    if let Some(code) = v.as_i64() {
        return Action::try_from(code).map_err(map_engine_err);
    }
    Err(EngineError::Validation(format!("action must be a name or an integer, got {v}")))
}

pub struct RiskyPathEnvironment {
    env: RiskyPathEnv,
    /// Observation produced by the engine for the most recent reset or step.
    last_obs: GridObservation,
    /// Reward summed over the actions applied by the last `step` call.
    batch_reward: f64,
    batch_len: usize,
}

impl RiskyPathEnvironment {
    pub fn new(cfg: Config) -> Result<Self, EngineError> {
        let env_cfg = cfg.to_env_config()?;
        Self::from_env_config(env_cfg)
    }

    pub fn from_env_config(cfg: EnvConfig) -> Result<Self, EngineError> {
        let env = RiskyPathEnv::new(cfg).map_err(map_engine_err)?;
        let last_obs = env.observe();
        Ok(Self { env, last_obs, batch_reward: 0.0, batch_len: 0 })
    }

    pub fn engine(&self) -> &RiskyPathEnv {
        &self.env
    }

    /// Applies one action and keeps its result. Returns whether the episode is done.
    fn apply(&mut self, action: Action) -> bool {
        let res = self.env.step(action);
        self.batch_reward += res.reward;
        self.batch_len += 1;
        self.last_obs = res.observation;
        res.done
    }

    fn snapshot_obs(&self, event: &str) -> Result<Observation, EngineError> {
        let observation = serde_json::to_value(&self.last_obs).map_err(|e| EngineError::Internal(e.to_string()))?;
        let pubst = self.env.public_state();
        let agent_dir = if pubst.show_agent_dir { json!(pubst.agent_dir) } else { Json::Null };
        let data = json!({
            "grid_array": pubst.grid_array,
            "room_text": self.env.room_text(),
            "agent_pos": [pubst.agent_pos.0, pubst.agent_pos.1],
            "agent_dir": agent_dir,
            "step_count": pubst.step_count,
            "max_steps": pubst.max_steps,
            "mission": pubst.mission,
            "terminated": pubst.terminated,
            "truncated": pubst.truncated,
            "reward_last": pubst.reward_last,
            "total_reward": pubst.total_reward,
            "batch_reward": self.batch_reward,
            "batch_steps": self.batch_len,
            "observation": observation,
            "event": event,
        });
        Ok(Observation { terminated: pubst.terminated, truncated: pubst.truncated, data })
    }
}

#[async_trait]
impl Environment for RiskyPathEnvironment {
    async fn initialize(&mut self) -> Result<Observation, EngineError> {
        self.last_obs = self.env.reset();
        self.batch_reward = 0.0;
        self.batch_len = 0;
        self.snapshot_obs("initialize")
    }

    async fn step(&mut self, tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError> {
        if tool_calls.is_empty() { return Err(EngineError::Validation("no tool_calls".into())); }
        // Parse everything up front so a bad call leaves the episode untouched.
        let mut plan = Vec::new();
        for call in &tool_calls {
            if call.tool != "interact" { return Err(EngineError::Validation(format!("unknown tool: {}", call.tool))); }
            let args = &call.args;
            if let Some(a) = args.get("action") {
                plan.push(action_from_json(a)?);
            } else if let Some(arr) = args.get("actions").and_then(|v| v.as_array()) {
                for v in arr {
                    plan.push(action_from_json(v)?);
                }
            } else {
                return Err(EngineError::Validation("missing 'action' or 'actions'".into()));
            }
        }
        self.batch_reward = 0.0;
        self.batch_len = 0;
        for act in plan {
            if self.apply(act) { break; }
        }
        self.snapshot_obs("step")
    }

    async fn terminate(&mut self) -> Result<Observation, EngineError> {
        self.snapshot_obs("terminate")
    }

    async fn checkpoint(&self) -> Result<Snapshot, EngineError> {
        make_snapshot(self, SNAPSHOT_VERSION).await
    }
}

#[async_trait]
impl ReproducibleEngine for RiskyPathEnvironment {
    async fn serialize_engine(&self) -> Result<Json, EngineError> {
        let state = serde_json::to_value(self.env.public_state()).map_err(|e| EngineError::Internal(e.to_string()))?;
        let config = serde_json::to_value(self.env.config()).map_err(|e| EngineError::Internal(e.to_string()))?;
        Ok(json!({ "state": state, "config": config }))
    }

    fn engine_name(&self) -> String {
        ENGINE_NAME.into()
    }
}

/// Registers the config-driven `RiskyPath` entry and one entry per preset.
/// Preset entries accept the same config but ignore its `preset` field.
pub fn register_default_envs(registry: &mut EnvRegistry) {
    registry.register(
        ENV_NAME,
        Arc::new(|cfg: Option<Json>| {
            let cfg = Config::from_json(cfg)?;
            Ok(Box::new(RiskyPathEnvironment::new(cfg)?) as Box<dyn Environment>)
        }),
    );
    for preset in Preset::ALL {
        registry.register(
            preset.name(),
            Arc::new(move |cfg: Option<Json>| {
                let cfg = Config { preset: Some(preset.name().to_string()), ..Config::from_json(cfg)? };
                Ok(Box::new(RiskyPathEnvironment::new(cfg)?) as Box<dyn Environment>)
            }),
        );
    }
    tracing::info!(count = Preset::ALL.len() + 1, "risky path environments registered");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interact(args: Json) -> Vec<ToolCall> {
        vec![ToolCall { tool: "interact".into(), args }]
    }

    #[tokio::test]
    async fn default_rollout_reaches_goal() {
        let mut env = RiskyPathEnvironment::new(Config::default()).unwrap();
        let obs = env.initialize().await.unwrap();
        assert_eq!(obs.data["agent_pos"], json!([2, 9]));
        assert_eq!(obs.data["agent_dir"], json!(3));
        let _ = env.step(interact(json!({"actions": ["north", "north", "north"]}))).await.unwrap();
        let _ = env.step(interact(json!({"actions": ["north", "north", "north"]}))).await.unwrap();
        let obs = env.step(interact(json!({"action": "west"}))).await.unwrap();
        assert!(obs.terminated);
        assert!(!obs.truncated);
        assert_eq!(obs.data["total_reward"], json!(1.0));
        assert_eq!(obs.data["step_count"], json!(7));
    }

    #[tokio::test]
    async fn batch_reports_summed_reward_and_engine_observation() {
        let cfg = Config {
            reward_spec: Some(json!({
                "step_penalty": -0.1,
                "goal_reward": 1.0,
                "absorbing_states": false,
                "absorbing_reward_goal": 0.0,
                "absorbing_reward_lava": 0.0,
                "risky_tile_reward": -0.25,
                "lava_reward": -1.0
            })),
            ..Config::default()
        };
        let mut env = RiskyPathEnvironment::new(cfg).unwrap();
        let obs = env.initialize().await.unwrap();
        assert_eq!(obs.data["batch_reward"], json!(0.0));
        assert_eq!(obs.data["observation"]["direction"], json!(3));

        // three north moves, all onto spiky floor
        let obs = env.step(interact(json!({"actions": ["north", "north", "north"]}))).await.unwrap();
        let batch = obs.data["batch_reward"].as_f64().unwrap();
        assert!((batch - 3.0 * (-0.1 - 0.25)).abs() < 1e-9, "{batch}");
        assert_eq!(obs.data["batch_steps"], json!(3));
        let last = obs.data["reward_last"].as_f64().unwrap();
        assert!((last - (-0.35)).abs() < 1e-9);

        // the engine's observation is passed through unchanged
        let expected = serde_json::to_value(env.engine().observe()).unwrap();
        assert_eq!(obs.data["observation"], expected);
        assert_eq!(obs.data["observation"]["image"][6][2][0], json!(10));
        assert_eq!(obs.data["observation"]["mission"], json!("Get to the green Goal tile"));
    }

    #[tokio::test]
    async fn batch_stops_counting_once_done() {
        let mut env = RiskyPathEnvironment::new(Config::default()).unwrap();
        env.initialize().await.unwrap();
        let obs = env.step(interact(json!({"actions": ["west", "east", "east"]}))).await.unwrap();
        assert_eq!(obs.data["batch_steps"], json!(1));
        assert_eq!(obs.data["batch_reward"], json!(-1.0));
    }

    #[tokio::test]
    async fn integer_actions_are_accepted() {
        let mut env = RiskyPathEnvironment::new(Config::default()).unwrap();
        env.initialize().await.unwrap();
        let obs = env.step(interact(json!({"action": 2}))).await.unwrap();
        assert_eq!(obs.data["agent_pos"], json!([3, 9]));
        assert_eq!(obs.data["agent_dir"], json!(0));
    }

    #[tokio::test]
    async fn invalid_action_is_a_validation_error() {
        let mut env = RiskyPathEnvironment::new(Config::default()).unwrap();
        env.initialize().await.unwrap();
        let err = env.step(interact(json!({"action": 7}))).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(ref m) if m.contains("invalid action 7")), "{err}");
        let err = env.step(interact(json!({"action": "forward"}))).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(env.engine().step_count(), 0);
    }

    #[test]
    fn config_overrides_preset() {
        let cfg = Config {
            preset: Some("v2".into()),
            max_steps: Some(9),
            slip_proba: Some(0.25),
            ..Config::default()
        };
        let env_cfg = cfg.to_env_config().unwrap();
        assert!(!env_cfg.show_agent_dir);
        assert_eq!(env_cfg.max_steps, 9);
        assert_eq!(env_cfg.slip_proba, 0.25);
    }

    #[test]
    fn unknown_config_field_is_rejected() {
        let err = Config::from_json(Some(json!({"seed": 3}))).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
