//! Pure Risky Path logic crate.
//! - Grid storage and MiniGrid-style cell encoding
//! - Layout generation with last-write-wins tile precedence
//! - Step/reward state machine with absorbing mode and horizon
//! - Named presets

mod config;
mod engine;
mod error;
pub mod grid;
pub mod layout;
pub mod observation;
mod presets;
pub mod rewards;
mod types;

pub use config::{EnvConfig, MAX_ROOM_SIZE, MIN_ROOM_SIZE};
pub use engine::{PublicState, RiskyPathEnv, StepResult};
pub use error::RiskyPathError;
pub use grid::{Grid, ObjectKind, Tile};
pub use layout::{Generated, Layout};
pub use observation::{EpisodeView, FullGridObserver, GridObservation, ObservationSource};
pub use presets::Preset;
pub use rewards::RewardSpec;
pub use types::{Action, Direction, Pos};
