use serde::{Deserialize, Serialize};

use crate::grid::{Grid, ObjectKind};
use crate::types::{Direction, Pos};

pub const MISSION: &str = "Get to the green Goal tile";

/// Read-only view of an episode handed to observation sources.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeView<'a> {
    pub grid: &'a Grid,
    pub agent_pos: Pos,
    pub agent_dir: Direction,
    pub step_count: u32,
    pub show_agent_dir: bool,
}

/// Turns episode state into whatever the agent gets to see. The engine treats
/// the result as opaque and hands it back unchanged.
pub trait ObservationSource {
    type Obs;

    fn observe(&self, view: &EpisodeView<'_>) -> Self::Obs;
}

/// Fully observable encoding of the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridObservation {
    /// `[h][w]` cells as `[object, color, state]`, agent overlaid.
    pub image: Vec<Vec<[u8; 3]>>,
    /// Heading code, `None` when direction display is off.
    pub direction: Option<u8>,
    pub mission: String,
}

/// Default observation source: the whole grid with the agent drawn on top.
///
/// The agent cell keeps the underlying tile's color so a hazard under the
/// agent stays visible; its state channel carries the heading only when the
/// direction is displayed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullGridObserver;

impl ObservationSource for FullGridObserver {
    type Obs = GridObservation;

    fn observe(&self, view: &EpisodeView<'_>) -> GridObservation {
        let mut image = view.grid.encode();
        let (x, y) = view.agent_pos;
        let dir_code = if view.show_agent_dir { view.agent_dir.code() } else { 0 };
        if let Some(cell) = image.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
            *cell = [ObjectKind::Agent as u8, cell[1], dir_code];
        }
        GridObservation {
            image,
            direction: view.show_agent_dir.then(|| view.agent_dir.code()),
            mission: MISSION.to_string(),
        }
    }
}
