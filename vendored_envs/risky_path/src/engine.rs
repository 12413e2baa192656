use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::config::EnvConfig;
use crate::error::RiskyPathError;
use crate::grid::{Grid, Tile};
use crate::layout::{self, Layout};
use crate::observation::{EpisodeView, FullGridObserver, ObservationSource, MISSION};
use crate::rewards::RewardSpec;
use crate::types::{Action, Direction, Pos};

/// Output of a single transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult<Obs> {
    pub observation: Obs,
    pub reward: f64,
    pub done: bool,
    /// Always empty for now; reserved for per-step diagnostics.
    pub info: Map<String, Json>,
}

/// Serializable snapshot of the visible episode state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicState {
    pub grid_array: Vec<Vec<[u8; 3]>>, // [h][w][3] (object,color,state)
    pub agent_pos: Pos,
    pub agent_dir: u8,
    pub show_agent_dir: bool,
    pub step_count: u32,
    pub max_steps: u32,
    pub mission: String,
    pub terminated: bool,
    pub truncated: bool,
    pub reward_last: f64,
    pub total_reward: f64,
}

/// Single-agent Risky Path room.
///
/// Every action first turns the agent to face its direction and then tries
/// to advance one cell; walls block the move but not the turn. Rewards are
/// decided by the kind of the cell in front of the agent. Goal and lava end
/// the episode unless the reward spec runs in absorbing mode; the horizon
/// ends it in every mode. `done` is sticky until the next [`reset`].
///
/// [`reset`]: RiskyPathEnv::reset
#[derive(Debug, Clone)]
pub struct RiskyPathEnv<O: ObservationSource = FullGridObserver> {
    config: EnvConfig,
    layout: Layout,
    observer: O,
    grid: Grid,
    agent_pos: Pos,
    agent_dir: Direction,
    step_count: u32,
    terminated: bool,
    truncated: bool,
    reward_last: f64,
    total_reward: f64,
}

impl RiskyPathEnv<FullGridObserver> {
    pub fn new(config: EnvConfig) -> Result<Self, RiskyPathError> {
        Self::with_observer(config, FullGridObserver)
    }
}

impl<O: ObservationSource> RiskyPathEnv<O> {
    /// Validates `config` and generates the first episode.
    pub fn with_observer(config: EnvConfig, observer: O) -> Result<Self, RiskyPathError> {
        let layout = config.resolve()?;
        let generated = layout::generate(&layout);
        tracing::debug!(
            width = layout.width,
            height = layout.height,
            lava = layout.lava_positions.len(),
            spiky = layout.spiky_positions.len(),
            goals = layout.goal_positions.len(),
            "risky path room generated"
        );
        Ok(Self {
            config,
            layout,
            observer,
            grid: generated.grid,
            agent_pos: generated.agent_pos,
            agent_dir: generated.agent_dir,
            step_count: 0,
            terminated: false,
            truncated: false,
            reward_last: 0.0,
            total_reward: 0.0,
        })
    }

    /// Regenerates the room and starts a new episode.
    pub fn reset(&mut self) -> O::Obs {
        let generated = layout::generate(&self.layout);
        self.grid = generated.grid;
        self.agent_pos = generated.agent_pos;
        self.agent_dir = generated.agent_dir;
        self.step_count = 0;
        self.terminated = false;
        self.truncated = false;
        self.reward_last = 0.0;
        self.total_reward = 0.0;
        tracing::info!(start = ?self.agent_pos, max_steps = self.config.max_steps, "episode reset");
        self.observe()
    }

    /// Integer entry point: 0=west, 1=north, 2=east, 3=south.
    pub fn step_index(&mut self, action: i64) -> Result<StepResult<O::Obs>, RiskyPathError> {
        let action = Action::try_from(action)?;
        Ok(self.step(action))
    }

    pub fn step(&mut self, action: Action) -> StepResult<O::Obs> {
        let spec = self.config.reward_spec;
        let mut reward = spec.step_penalty;

        self.agent_dir = action.heading();
        let fwd = self.agent_dir.ahead(self.agent_pos);
        let fwd_tile = self.grid.get(fwd.0, fwd.1);

        if fwd_tile.is_some_and(Tile::can_overlap) {
            self.agent_pos = fwd;
        }

        match fwd_tile {
            Some(Tile::Goal) => {
                if spec.absorbing_states {
                    reward += spec.absorbing_reward_goal;
                } else {
                    reward += spec.goal_reward;
                    self.terminated = true;
                }
            }
            Some(Tile::Lava) => {
                if spec.absorbing_states {
                    reward += spec.absorbing_reward_lava;
                } else {
                    reward += spec.lava_reward;
                    self.terminated = true;
                }
            }
            Some(Tile::SpikyFloor) => reward += spec.risky_tile_reward,
            _ => {}
        }

        self.step_count = self.step_count.saturating_add(1);
        if self.step_count >= self.config.max_steps {
            self.truncated = true;
        }

        self.reward_last = reward;
        self.total_reward += reward;
        tracing::debug!(
            step = self.step_count,
            action = action.as_str(),
            tile = ?fwd_tile,
            pos = ?self.agent_pos,
            reward,
            done = self.done(),
            "step"
        );

        StepResult { observation: self.observe(), reward, done: self.done(), info: Map::new() }
    }

    pub fn observe(&self) -> O::Obs {
        self.observer.observe(&self.view())
    }

    pub fn view(&self) -> EpisodeView<'_> {
        EpisodeView {
            grid: &self.grid,
            agent_pos: self.agent_pos,
            agent_dir: self.agent_dir,
            step_count: self.step_count,
            show_agent_dir: self.config.show_agent_dir,
        }
    }

    pub fn public_state(&self) -> PublicState {
        PublicState {
            grid_array: FullGridObserver.observe(&self.view()).image,
            agent_pos: self.agent_pos,
            agent_dir: self.agent_dir.code(),
            show_agent_dir: self.config.show_agent_dir,
            step_count: self.step_count,
            max_steps: self.config.max_steps,
            mission: MISSION.to_string(),
            terminated: self.terminated,
            truncated: self.truncated,
            reward_last: self.reward_last,
            total_reward: self.total_reward,
        }
    }

    /// Room as text, agent drawn as `A`.
    pub fn room_text(&self) -> String {
        self.grid.text(Some(self.agent_pos))
    }

    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }

    pub fn terminated(&self) -> bool { self.terminated }
    pub fn truncated(&self) -> bool { self.truncated }
    pub fn agent_pos(&self) -> Pos { self.agent_pos }
    pub fn agent_dir(&self) -> Direction { self.agent_dir }
    pub fn step_count(&self) -> u32 { self.step_count }
    pub fn max_steps(&self) -> u32 { self.config.max_steps }
    pub fn reward_last(&self) -> f64 { self.reward_last }
    pub fn total_reward(&self) -> f64 { self.total_reward }
    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn config(&self) -> &EnvConfig { &self.config }
    pub fn layout(&self) -> &Layout { &self.layout }
    pub fn reward_spec(&self) -> &RewardSpec { &self.config.reward_spec }
    pub fn tile_at(&self, pos: Pos) -> Option<Tile> { self.grid.get(pos.0, pos.1) }
}
