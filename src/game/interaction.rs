//! Looking at things and using them.
//!
//! [`pick`] casts the view ray against the current room and [`interact`] applies whatever the
//! picked object does to the puzzle state and the room graph.

use crate::game::level::LevelInstance;
use crate::game::room::{InteractableKind, Room};
use crate::game::scene::SceneError;
use crate::game::state_manager::{FlashlightColor, GameStateManager};

/// What the view ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickTarget {
    /// Index into the current room's interactables.
    pub index: usize,
    /// Cube `(row, col)` when a cube panel cell was hit.
    pub cell: Option<(usize, usize)>,
    pub distance: f32,
}

/// Result of using an interactable.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    /// Keypad entry should open for `interactable`.
    OpenKeypad { interactable: String },
    KeypadAlreadySolved,
    PickedUp(String),
    /// The player walked through a door.
    Moved { from: usize, to: usize },
    /// The door did not open.
    DoorRefused(SceneError),
    /// A colored door needs a different flashlight color.
    WrongLight { needed: FlashlightColor },
    /// A cube was clicked; `solved` is set when this click finished the panel.
    CubeTurned { puzzle: String, solved: bool },
    /// The panel is solved and no longer turns.
    CubesLocked,
    Note(String),
    Nothing,
}

impl InteractionOutcome {
    /// One-line feedback for the HUD, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            InteractionOutcome::KeypadAlreadySolved => Some("The keypad glows green.".into()),
            InteractionOutcome::PickedUp(item) => Some(format!("Picked up {}", item)),
            InteractionOutcome::DoorRefused(SceneError::Locked(requirement)) => {
                Some(format!("Locked. Needs {}", requirement))
            }
            InteractionOutcome::DoorRefused(_) => Some("This door leads nowhere.".into()),
            InteractionOutcome::WrongLight { needed } => {
                Some(format!("The lock stays dark. It wants {} light.", needed.name()))
            }
            InteractionOutcome::CubeTurned { solved: true, .. } => {
                Some("Something clicks into place.".into())
            }
            InteractionOutcome::CubesLocked => Some("The blocks no longer move.".into()),
            InteractionOutcome::Note(text) => Some(text.clone()),
            InteractionOutcome::OpenKeypad { .. }
            | InteractionOutcome::Moved { .. }
            | InteractionOutcome::CubeTurned { .. }
            | InteractionOutcome::Nothing => None,
        }
    }
}

/// Finds the nearest visible interactable along `direction` within `reach` metres.
///
/// `direction` must be normalized for `reach` to be in metres. Cube panels report the cube
/// that was hit when the ray lands on one.
pub fn pick(
    eye: [f32; 3],
    direction: [f32; 3],
    room: &Room,
    state: &GameStateManager,
    reach: f32,
) -> Option<PickTarget> {
    let mut best: Option<PickTarget> = None;
    let mut consider = |candidate: PickTarget| {
        if candidate.distance <= reach
            && best.is_none_or(|current| candidate.distance < current.distance)
        {
            best = Some(candidate);
        }
    };

    for (index, item) in room.interactables.iter().enumerate() {
        if !item.is_visible(state) {
            continue;
        }

        if let InteractableKind::CubePanel { rows, cols, .. } = item.kind {
            for row in 0..rows {
                for col in 0..cols {
                    let hit = item
                        .cube_bounds(row, col)
                        .and_then(|bounds| bounds.ray_intersect(eye, direction));
                    if let Some(distance) = hit {
                        consider(PickTarget {
                            index,
                            cell: Some((row, col)),
                            distance,
                        });
                    }
                }
            }
        }

        if let Some(distance) = item.bounds().ray_intersect(eye, direction) {
            consider(PickTarget {
                index,
                cell: None,
                distance,
            });
        }
    }

    best
}

/// Uses the picked object.
pub fn interact(target: &PickTarget, session: &mut LevelInstance) -> InteractionOutcome {
    let room = session.scene.current_room();
    let Some(item) = room.interactables.get(target.index) else {
        return InteractionOutcome::Nothing;
    };
    let item_id = item.id.clone();
    let kind = item.kind.clone();
    log::debug!("Interacting with '{}' in '{}'", item_id, room.id);

    match kind {
        InteractableKind::Keypad { puzzle, .. } => {
            if session.state.is_puzzle_solved(&puzzle) {
                InteractionOutcome::KeypadAlreadySolved
            } else {
                session.state.clear_keypad();
                InteractionOutcome::OpenKeypad {
                    interactable: item_id,
                }
            }
        }
        InteractableKind::Key { item, .. } => {
            session.state.add_item(&item);
            InteractionOutcome::PickedUp(item)
        }
        InteractableKind::Door { target: to, color } => {
            if let Some(needed) = color {
                if !session.state.is_puzzle_solved(&item_id) {
                    if session.state.flashlight() != needed {
                        return InteractionOutcome::WrongLight { needed };
                    }
                    session.state.set_puzzle_solved(&item_id);
                }
            }

            let from = session.scene.current_index();
            match session.scene.try_transition(to, &session.state) {
                Ok(to) => InteractionOutcome::Moved { from, to },
                Err(err) => InteractionOutcome::DoorRefused(err),
            }
        }
        InteractableKind::CubePanel { puzzle, .. } => {
            let Some((row, col)) = target.cell else {
                return InteractionOutcome::Nothing;
            };
            if session.state.is_puzzle_solved(&puzzle) {
                return InteractionOutcome::CubesLocked;
            }
            let Some(cubes) = session.cube_puzzles.get_mut(&puzzle) else {
                log::warn!("Cube panel '{}' has no puzzle '{}'", item_id, puzzle);
                return InteractionOutcome::Nothing;
            };
            if let Err(err) = cubes.click(row, col) {
                log::warn!("Ignoring click on '{}': {}", item_id, err);
                return InteractionOutcome::Nothing;
            }

            let solved = cubes.is_solved() && session.state.set_puzzle_solved(&puzzle);
            InteractionOutcome::CubeTurned { puzzle, solved }
        }
        InteractableKind::Note { text } => InteractionOutcome::Note(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::level::Level;
    use crate::game::room::RoomKind;
    use crate::game::scene::Requirement;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn builtin_session() -> LevelInstance {
        let level = Level::builtin().unwrap();
        level.instantiate(&mut StdRng::seed_from_u64(3)).unwrap()
    }

    fn target_for(session: &LevelInstance, id: &str, cell: Option<(usize, usize)>) -> PickTarget {
        let index = session
            .scene
            .current_room()
            .interactables
            .iter()
            .position(|item| item.id == id)
            .unwrap();
        PickTarget {
            index,
            cell,
            distance: 1.0,
        }
    }

    /// Clicks cubes until the panel is home, using the fact that four clicks are an identity.
    fn solve_cubes(session: &mut LevelInstance, panel: &str, puzzle: &str) {
        let (rows, cols) = {
            let cubes = &session.cube_puzzles[puzzle];
            (cubes.rows(), cubes.cols())
        };
        // Brute force over click counts per cell, 4^9 for a 3x3 panel.
        let cells = rows * cols;
        let total = 4usize.pow(cells as u32);
        let start = session.cube_puzzles[puzzle].clone();
        for combination in 0..total {
            let mut trial = start.clone();
            let mut code = combination;
            for cell in 0..cells {
                for _ in 0..code % 4 {
                    trial.click(cell / cols, cell % cols).unwrap();
                }
                code /= 4;
            }
            if trial.is_solved() {
                let mut code = combination;
                for cell in 0..cells {
                    for _ in 0..code % 4 {
                        let target = target_for(session, panel, Some((cell / cols, cell % cols)));
                        interact(&target, session);
                    }
                    code /= 4;
                }
                return;
            }
        }
        panic!("cube panel could not be solved");
    }

    #[test]
    fn pick_returns_nearest_visible_object_within_reach() {
        let session = builtin_session();
        let room = session.scene.current_room();
        // Looking north from the spawn point at door height.
        let hit = pick(
            [0.0, 1.1, 1.5],
            [0.0, 0.0, -1.0],
            room,
            &session.state,
            10.0,
        )
        .unwrap();
        assert_eq!(room.interactables[hit.index].id, "cell_door");
        assert!((hit.distance - 4.4).abs() < 1e-4);

        assert!(pick([0.0, 1.1, 1.5], [0.0, 0.0, -1.0], room, &session.state, 2.0).is_none());
    }

    #[test]
    fn pick_resolves_cube_cells() {
        let mut session = builtin_session();
        session.scene.switch_to(1).unwrap();
        let room = session.scene.current_room();
        let panel = room.interactable("gallery_panel").unwrap();
        let centre = panel.cube_center(0, 2).unwrap();

        let hit = pick(
            [centre[0], centre[1], 0.0],
            [0.0, 0.0, -1.0],
            room,
            &session.state,
            10.0,
        )
        .unwrap();
        assert_eq!(hit.cell, Some((0, 2)));
    }

    #[test]
    fn hidden_key_cannot_be_picked() {
        let mut session = builtin_session();
        session.scene.switch_to(1).unwrap();
        let room = session.scene.current_room();
        // Straight down onto the plinth; the key above it is hidden until the panel is solved.
        let hit = pick([2.5, 2.0, -3.0], [0.0, -1.0, 0.0], room, &session.state, 5.0).unwrap();
        assert_eq!(room.interactables[hit.index].id, "gallery_plinth");
    }

    #[test]
    fn locked_door_reports_requirement() {
        let mut session = builtin_session();
        let door = target_for(&session, "cell_door", None);
        assert_eq!(
            interact(&door, &mut session),
            InteractionOutcome::DoorRefused(SceneError::Locked(Requirement::Puzzle(
                "cell_code".into()
            )))
        );
        assert_eq!(session.scene.current_index(), 0);
    }

    #[test]
    fn colored_door_needs_matching_light() {
        let mut session = builtin_session();
        let vault = session.scene.find_room("vault").unwrap();
        session.scene.switch_to(vault).unwrap();
        let door = target_for(&session, "vault_door", None);

        assert_eq!(
            interact(&door, &mut session),
            InteractionOutcome::WrongLight {
                needed: FlashlightColor::Blue
            }
        );
        assert!(!session.state.is_puzzle_solved("vault_door"));

        while session.state.flashlight() != FlashlightColor::Blue {
            session.state.cycle_flashlight();
        }
        assert!(matches!(
            interact(&door, &mut session),
            InteractionOutcome::Moved { .. }
        ));
        assert_eq!(session.scene.outcome(), Some(RoomKind::Win));
    }

    #[test]
    fn solved_colored_door_stays_open_under_any_light() {
        let mut session = builtin_session();
        let vault = session.scene.find_room("vault").unwrap();
        session.scene.switch_to(vault).unwrap();
        let door = target_for(&session, "vault_door", None);

        while session.state.flashlight() != FlashlightColor::Blue {
            session.state.cycle_flashlight();
        }
        assert!(matches!(
            interact(&door, &mut session),
            InteractionOutcome::Moved { .. }
        ));

        session.scene.switch_to(vault).unwrap();
        while session.state.flashlight() != FlashlightColor::White {
            session.state.cycle_flashlight();
        }
        assert!(session.state.is_puzzle_solved("vault_door"));
        assert!(matches!(
            interact(&door, &mut session),
            InteractionOutcome::Moved { .. }
        ));
        assert_eq!(session.scene.outcome(), Some(RoomKind::Win));
    }

    #[test]
    fn colored_door_solves_its_flag_even_when_an_item_gate_refuses() {
        let level = Level::from_toml_str(
            r#"
            [level]
            name = "Gate"
            start = "a"

            [[room]]
            id = "a"
            name = "A"
            size = [4.0, 3.0, 4.0]

            [[room.interactable]]
            id = "gate"
            kind = "door"
            target = "b"
            color = "red"
            position = [0.0, 1.1, -1.95]
            half_extents = [0.5, 1.1, 0.05]

            [[room]]
            id = "b"
            name = "B"
            size = [4.0, 3.0, 4.0]

            [[transition]]
            from = "a"
            to = "b"
            requires_item = "badge"
            "#,
        )
        .unwrap();
        let mut session = level.instantiate(&mut StdRng::seed_from_u64(1)).unwrap();
        let gate = target_for(&session, "gate", None);

        session.state.cycle_flashlight();
        assert_eq!(session.state.flashlight(), FlashlightColor::Red);
        assert_eq!(
            interact(&gate, &mut session),
            InteractionOutcome::DoorRefused(SceneError::Locked(Requirement::Item("badge".into())))
        );
        assert!(session.state.is_puzzle_solved("gate"));
        assert_eq!(session.state.solved_count(), 1);
        assert_eq!(session.scene.current_room().id, "a");

        while session.state.flashlight() != FlashlightColor::White {
            session.state.cycle_flashlight();
        }
        session.state.add_item("badge");
        assert_eq!(
            interact(&gate, &mut session),
            InteractionOutcome::Moved { from: 0, to: 1 }
        );
    }

    #[test]
    fn full_playthrough_reaches_the_exit() {
        let mut session = builtin_session();

        // Holding cell: read the note, enter the code, walk through.
        let note = target_for(&session, "cell_table", None);
        assert!(matches!(interact(&note, &mut session), InteractionOutcome::Note(_)));

        let keypad = target_for(&session, "cell_keypad", None);
        assert_eq!(
            interact(&keypad, &mut session),
            InteractionOutcome::OpenKeypad {
                interactable: "cell_keypad".into()
            }
        );
        for digit in "4127".chars() {
            session.state.press_keypad_digit(digit);
        }
        session.state.submit_keypad("cell_code", "4127");
        assert_eq!(
            interact(&keypad, &mut session),
            InteractionOutcome::KeypadAlreadySolved
        );

        let door = target_for(&session, "cell_door", None);
        assert_eq!(
            interact(&door, &mut session),
            InteractionOutcome::Moved { from: 0, to: 1 }
        );

        // Gallery: the vault stays shut until the key is held.
        let vault_door = target_for(&session, "gallery_vault_door", None);
        assert!(matches!(
            interact(&vault_door, &mut session),
            InteractionOutcome::DoorRefused(SceneError::Locked(_))
        ));

        solve_cubes(&mut session, "gallery_panel", "gallery_cubes");
        assert!(session.state.is_puzzle_solved("gallery_cubes"));
        let locked = target_for(&session, "gallery_panel", Some((0, 0)));
        assert_eq!(interact(&locked, &mut session), InteractionOutcome::CubesLocked);

        let key = target_for(&session, "brass_key", None);
        assert_eq!(
            interact(&key, &mut session),
            InteractionOutcome::PickedUp("brass_key".into())
        );
        assert!(matches!(
            interact(&vault_door, &mut session),
            InteractionOutcome::Moved { .. }
        ));

        // Vault: blue light opens the last door.
        for _ in 0..3 {
            session.state.cycle_flashlight();
        }
        let exit = target_for(&session, "vault_door", None);
        assert!(matches!(
            interact(&exit, &mut session),
            InteractionOutcome::Moved { .. }
        ));
        assert_eq!(session.scene.outcome(), Some(RoomKind::Win));
        assert_eq!(session.state.solved_count(), session.state.puzzle_count());
    }
}
