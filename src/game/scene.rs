//! The room graph.
//!
//! [`SceneManager`] owns the ordered list of rooms and the directed transitions between them.
//! Transitions are gated by [`Requirement`]s evaluated against a [`GameStateManager`]; the
//! scene never mutates that state itself.

use crate::game::room::{Room, RoomKind};
use crate::game::state_manager::GameStateManager;
use std::fmt;
use thiserror::Error;

/// Condition that must hold before a transition can be taken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requirement {
    #[default]
    None,
    /// The player must hold the item.
    Item(String),
    /// The puzzle must be solved.
    Puzzle(String),
    /// Every nested requirement must hold.
    All(Vec<Requirement>),
}

impl Requirement {
    pub fn is_met(&self, state: &GameStateManager) -> bool {
        match self {
            Requirement::None => true,
            Requirement::Item(item) => state.has_item(item),
            Requirement::Puzzle(puzzle) => state.is_puzzle_solved(puzzle),
            Requirement::All(requirements) => requirements.iter().all(|r| r.is_met(state)),
        }
    }

    /// Collapses an item and a puzzle gate into a single requirement.
    pub fn from_parts(item: Option<String>, puzzle: Option<String>) -> Self {
        match (item, puzzle) {
            (None, None) => Requirement::None,
            (Some(item), None) => Requirement::Item(item),
            (None, Some(puzzle)) => Requirement::Puzzle(puzzle),
            (Some(item), Some(puzzle)) => {
                Requirement::All(vec![Requirement::Item(item), Requirement::Puzzle(puzzle)])
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::None => write!(f, "nothing"),
            Requirement::Item(item) => write!(f, "item '{}'", item),
            Requirement::Puzzle(puzzle) => write!(f, "puzzle '{}'", puzzle),
            Requirement::All(requirements) => {
                for (i, requirement) in requirements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    write!(f, "{}", requirement)?;
                }
                Ok(())
            }
        }
    }
}

/// Directed edge `from -> to` in the room graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("room index {index} is out of range ({count} rooms)")]
    RoomOutOfRange { index: usize, count: usize },
    #[error("no transition from room {from} to room {to}")]
    NoTransition { from: usize, to: usize },
    #[error("transition is locked, requires {0}")]
    Locked(Requirement),
}

#[derive(Debug, Clone)]
pub struct SceneManager {
    rooms: Vec<Room>,
    transitions: Vec<Transition>,
    start: usize,
    current: usize,
}

impl SceneManager {
    /// Creates a scene positioned at `start`.
    ///
    /// Indices are validated by the level loader; an out-of-range `start` is an error here too.
    pub fn new(
        rooms: Vec<Room>,
        transitions: Vec<Transition>,
        start: usize,
    ) -> Result<Self, SceneError> {
        if start >= rooms.len() {
            return Err(SceneError::RoomOutOfRange {
                index: start,
                count: rooms.len(),
            });
        }
        Ok(Self {
            rooms,
            transitions,
            start,
            current: start,
        })
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_room(&self) -> &Room {
        &self.rooms[self.current]
    }

    pub fn room(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn find_room(&self, id: &str) -> Option<usize> {
        self.rooms.iter().position(|room| room.id == id)
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Moves to `index` regardless of any requirement.
    pub fn switch_to(&mut self, index: usize) -> Result<(), SceneError> {
        self.check_index(index)?;
        if index != self.current {
            log::info!(
                "Switching room '{}' -> '{}'",
                self.rooms[self.current].id,
                self.rooms[index].id
            );
        }
        self.current = index;
        Ok(())
    }

    pub fn transition_between(&self, from: usize, to: usize) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|transition| transition.from == from && transition.to == to)
    }

    /// Checks whether the edge from the current room to `to` may be taken.
    pub fn can_transition(&self, to: usize, state: &GameStateManager) -> Result<(), SceneError> {
        self.check_index(to)?;
        let transition =
            self.transition_between(self.current, to)
                .ok_or(SceneError::NoTransition {
                    from: self.current,
                    to,
                })?;

        if transition.requirement.is_met(state) {
            Ok(())
        } else {
            Err(SceneError::Locked(transition.requirement.clone()))
        }
    }

    /// Follows the edge to `to` if its requirement holds and returns the new index.
    pub fn try_transition(
        &mut self,
        to: usize,
        state: &GameStateManager,
    ) -> Result<usize, SceneError> {
        if let Err(err) = self.can_transition(to, state) {
            log::debug!("Transition {} -> {} refused: {}", self.current, to, err);
            return Err(err);
        }
        self.switch_to(to)?;
        Ok(to)
    }

    /// Outgoing edges of the current room with whether each is open.
    pub fn exits(&self, state: &GameStateManager) -> Vec<(usize, bool)> {
        self.transitions
            .iter()
            .filter(|transition| transition.from == self.current)
            .map(|transition| (transition.to, transition.requirement.is_met(state)))
            .collect()
    }

    /// `Some(kind)` once the current room ends the run.
    pub fn outcome(&self) -> Option<RoomKind> {
        let kind = self.current_room().kind;
        kind.is_terminal().then_some(kind)
    }

    pub fn reset(&mut self) {
        self.current = self.start;
    }

    fn check_index(&self, index: usize) -> Result<(), SceneError> {
        if index < self.rooms.len() {
            Ok(())
        } else {
            Err(SceneError::RoomOutOfRange {
                index,
                count: self.rooms.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, kind: RoomKind) -> Room {
        Room {
            id: id.into(),
            name: id.to_uppercase(),
            kind,
            size: [4.0, 3.0, 4.0],
            spawn: [0.0, 0.0],
            spawn_yaw: 0.0,
            wall_color: [90, 90, 90],
            floor_color: [40, 40, 40],
            interactables: Vec::new(),
        }
    }

    fn scene() -> SceneManager {
        let rooms = vec![
            room("cell", RoomKind::Normal),
            room("hall", RoomKind::Normal),
            room("exit", RoomKind::Win),
            room("trap", RoomKind::GameOver),
        ];
        let transitions = vec![
            Transition {
                from: 0,
                to: 1,
                requirement: Requirement::Item("key".into()),
            },
            Transition {
                from: 1,
                to: 0,
                requirement: Requirement::None,
            },
            Transition {
                from: 1,
                to: 2,
                requirement: Requirement::from_parts(
                    Some("fuse".into()),
                    Some("vault".into()),
                ),
            },
        ];
        SceneManager::new(rooms, transitions, 0).unwrap()
    }

    #[test]
    fn locked_transition_needs_item() {
        let mut scene = scene();
        let mut state = GameStateManager::new();

        assert_eq!(
            scene.try_transition(1, &state),
            Err(SceneError::Locked(Requirement::Item("key".into())))
        );
        assert_eq!(scene.current_index(), 0);

        state.add_item("key");
        assert_eq!(scene.try_transition(1, &state), Ok(1));
        assert_eq!(scene.current_room().id, "hall");
    }

    #[test]
    fn missing_edge_and_bad_index_are_reported() {
        let mut scene = scene();
        let state = GameStateManager::new();
        assert_eq!(
            scene.try_transition(2, &state),
            Err(SceneError::NoTransition { from: 0, to: 2 })
        );
        assert_eq!(
            scene.try_transition(9, &state),
            Err(SceneError::RoomOutOfRange { index: 9, count: 4 })
        );
    }

    #[test]
    fn compound_requirement_needs_every_part() {
        let mut scene = scene();
        let mut state = GameStateManager::new();
        scene.switch_to(1).unwrap();

        state.add_item("fuse");
        assert!(matches!(
            scene.can_transition(2, &state),
            Err(SceneError::Locked(Requirement::All(_)))
        ));
        state.set_puzzle_solved("vault");
        assert_eq!(scene.try_transition(2, &state), Ok(2));
        assert_eq!(scene.outcome(), Some(RoomKind::Win));
    }

    #[test]
    fn switch_ignores_requirements_and_reset_returns_to_start() {
        let mut scene = scene();
        scene.switch_to(3).unwrap();
        assert_eq!(scene.outcome(), Some(RoomKind::GameOver));
        let past_end = scene.room_count();
        assert!(scene.switch_to(past_end).is_err());
        scene.reset();
        assert_eq!(scene.current_index(), 0);
        assert_eq!(scene.outcome(), None);
    }

    #[test]
    fn exits_report_open_state() {
        let mut scene = scene();
        let mut state = GameStateManager::new();
        state.add_item("key");
        scene.switch_to(1).unwrap();
        assert_eq!(scene.exits(&state), vec![(0, true), (2, false)]);
        assert_eq!(scene.find_room("exit"), Some(2));
    }

    #[test]
    fn requirement_display_joins_parts() {
        let requirement = Requirement::from_parts(Some("fuse".into()), Some("vault".into()));
        assert_eq!(requirement.to_string(), "item 'fuse' and puzzle 'vault'");
    }

    #[test]
    fn start_must_exist() {
        assert!(SceneManager::new(Vec::new(), Vec::new(), 0).is_err());
    }
}
