//! CPU-side mesh for the room the player is in.
//!
//! The mesh is rebuilt from game state every frame. Rooms hold a handful of boxes, so there is
//! nothing to gain from caching, and rebuilding keeps revealed keys, solved indicators and
//! turning cubes in sync without any invalidation logic.

use crate::game::cube_puzzle::CubePuzzle;
use crate::game::interaction::PickTarget;
use crate::game::room::{CUBE_HALF, Interactable, InteractableKind, Room};
use crate::game::state_manager::GameStateManager;
use crate::renderer::primitives::{MATERIAL_EMISSIVE, MATERIAL_SOLID, MATERIAL_TEXTURED, Vertex};
use std::collections::HashMap;

/// Metres covered by one repeat of the wall texture.
const TEXTURE_TILE: f32 = 1.5;

const CEILING_COLOR: [u8; 3] = [70, 68, 72];
const KEYPAD_COLOR: [u8; 3] = [45, 47, 55];
const KEY_COLOR: [u8; 3] = [214, 170, 60];
const DOOR_COLOR: [u8; 3] = [96, 62, 38];
const BOARD_COLOR: [u8; 3] = [60, 55, 50];
const CUBE_COLOR: [u8; 3] = [170, 160, 140];
const SOLVED_CUBE_COLOR: [u8; 3] = [120, 170, 110];
const MARKER_COLOR: [u8; 3] = [150, 40, 30];
const NOTE_COLOR: [u8; 3] = [225, 215, 185];
const LOCKED_LIGHT: [u8; 3] = [230, 40, 30];
const OPEN_LIGHT: [u8; 3] = [40, 230, 80];

/// One face of an axis-aligned box: outward normal and the two in-plane axes, ordered so that
/// `u x v = normal`.
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Builds every triangle of `room` as seen in the current game state.
///
/// `target` is drawn highlighted: the whole object, or only the picked cube on a cube panel.
pub fn build_room_vertices(
    room: &Room,
    state: &GameStateManager,
    cube_puzzles: &HashMap<String, CubePuzzle>,
    target: Option<&PickTarget>,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(1024);
    push_shell(&mut vertices, room);

    for (index, item) in room.interactables.iter().enumerate() {
        if !item.is_visible(state) {
            continue;
        }
        let picked = target.filter(|target| target.index == index);
        push_interactable(&mut vertices, room, item, state, cube_puzzles, picked);
    }
    vertices
}

fn push_shell(out: &mut Vec<Vertex>, room: &Room) {
    let (hw, hd, h) = (room.half_width(), room.half_depth(), room.height());
    let floor = rgba(room.floor_color);
    let wall = rgba(room.wall_color);
    let ceiling = rgba(CEILING_COLOR);
    let tile = |metres: f32| metres / TEXTURE_TILE;

    // Floor and ceiling
    push_quad(
        out,
        [[-hw, 0.0, hd], [hw, 0.0, hd], [hw, 0.0, -hd], [-hw, 0.0, -hd]],
        [0.0, 1.0, 0.0],
        [tile(2.0 * hw), tile(2.0 * hd)],
        floor,
        MATERIAL_TEXTURED,
    );
    push_quad(
        out,
        [[-hw, h, -hd], [hw, h, -hd], [hw, h, hd], [-hw, h, hd]],
        [0.0, -1.0, 0.0],
        [tile(2.0 * hw), tile(2.0 * hd)],
        ceiling,
        MATERIAL_SOLID,
    );

    // Walls, each facing into the room
    push_quad(
        out,
        [[-hw, 0.0, -hd], [hw, 0.0, -hd], [hw, h, -hd], [-hw, h, -hd]],
        [0.0, 0.0, 1.0],
        [tile(2.0 * hw), tile(h)],
        wall,
        MATERIAL_TEXTURED,
    );
    push_quad(
        out,
        [[hw, 0.0, hd], [-hw, 0.0, hd], [-hw, h, hd], [hw, h, hd]],
        [0.0, 0.0, -1.0],
        [tile(2.0 * hw), tile(h)],
        wall,
        MATERIAL_TEXTURED,
    );
    push_quad(
        out,
        [[-hw, 0.0, hd], [-hw, 0.0, -hd], [-hw, h, -hd], [-hw, h, hd]],
        [1.0, 0.0, 0.0],
        [tile(2.0 * hd), tile(h)],
        wall,
        MATERIAL_TEXTURED,
    );
    push_quad(
        out,
        [[hw, 0.0, -hd], [hw, 0.0, hd], [hw, h, hd], [hw, h, -hd]],
        [-1.0, 0.0, 0.0],
        [tile(2.0 * hd), tile(h)],
        wall,
        MATERIAL_TEXTURED,
    );
}

fn push_interactable(
    out: &mut Vec<Vertex>,
    room: &Room,
    item: &Interactable,
    state: &GameStateManager,
    cube_puzzles: &HashMap<String, CubePuzzle>,
    picked: Option<&PickTarget>,
) {
    let whole_picked = picked.is_some_and(|target| target.cell.is_none());
    let body = |color: [u8; 3]| {
        if whole_picked {
            rgba(highlight(color))
        } else {
            rgba(color)
        }
    };

    match &item.kind {
        InteractableKind::Keypad { puzzle, .. } => {
            push_box(out, item.position, item.half_extents, body(KEYPAD_COLOR), MATERIAL_SOLID);
            let light = if state.is_puzzle_solved(puzzle) {
                OPEN_LIGHT
            } else {
                LOCKED_LIGHT
            };
            let up = [0.0, item.half_extents[1] * 0.7, 0.0];
            push_front_light(out, room, item, up, 0.03, rgba(light));
        }
        InteractableKind::Key { .. } => {
            push_box(out, item.position, item.half_extents, body(KEY_COLOR), MATERIAL_SOLID);
        }
        InteractableKind::Door { color, .. } => {
            push_box(out, item.position, item.half_extents, body(DOOR_COLOR), MATERIAL_SOLID);
            if let Some(color) = color {
                // The lens glows at full strength once the matching light has opened it.
                let strength = if state.is_puzzle_solved(&item.id) {
                    1.0
                } else {
                    0.45
                };
                let [r, g, b] = color.rgb();
                let lens = [
                    (r * strength * 255.0) as u8,
                    (g * strength * 255.0) as u8,
                    (b * strength * 255.0) as u8,
                ];
                push_front_light(out, room, item, [0.0, 0.2, 0.0], 0.12, rgba(lens));
            }
        }
        InteractableKind::CubePanel {
            puzzle, rows, cols, ..
        } => {
            push_box(out, item.position, item.half_extents, body(BOARD_COLOR), MATERIAL_SOLID);
            let Some(cubes) = cube_puzzles.get(puzzle) else {
                return;
            };
            let base = if cubes.is_solved() {
                SOLVED_CUBE_COLOR
            } else {
                CUBE_COLOR
            };
            for row in 0..*rows {
                for col in 0..*cols {
                    let (Some(center), Some(cube)) =
                        (item.cube_center(row, col), cubes.cube(row, col))
                    else {
                        continue;
                    };
                    let cell_picked =
                        picked.is_some_and(|target| target.cell == Some((row, col)));
                    let color = if cell_picked || whole_picked {
                        highlight(base)
                    } else {
                        base
                    };
                    push_cube(out, center, cube.display_angle(), rgba(color));
                }
            }
        }
        InteractableKind::Note { .. } => {
            push_box(out, item.position, item.half_extents, body(NOTE_COLOR), MATERIAL_SOLID);
        }
    }
}

/// A rotating cube with a marker bar that points up when the cube is in its home rotation.
fn push_cube(out: &mut Vec<Vertex>, center: [f32; 3], angle: f32, color: [u8; 4]) {
    push_rotated_box(
        out,
        center,
        [0.0, 0.0, 0.0],
        [CUBE_HALF; 3],
        angle,
        color,
        MATERIAL_SOLID,
    );
    push_rotated_box(
        out,
        center,
        [0.0, CUBE_HALF * 0.55, CUBE_HALF],
        [0.025, CUBE_HALF * 0.35, 0.01],
        angle,
        rgba(MARKER_COLOR),
        MATERIAL_SOLID,
    );
}

/// Small emissive square on the face of `item` that points into the room.
fn push_front_light(
    out: &mut Vec<Vertex>,
    room: &Room,
    item: &Interactable,
    offset: [f32; 3],
    half_size: f32,
    color: [u8; 4],
) {
    let facing = facing_into_room(room, item.position);
    let mut center = [
        item.position[0] + offset[0],
        item.position[1] + offset[1],
        item.position[2] + offset[2],
    ];
    let mut half = [half_size, half_size, half_size];
    for axis in [0, 2] {
        if facing[axis] != 0.0 {
            center[axis] += facing[axis] * (item.half_extents[axis] + 0.01);
            half[axis] = 0.01;
        }
    }
    push_box(out, center, half, color, MATERIAL_EMISSIVE);
}

/// Unit floor direction from the nearest wall toward the room centre.
pub fn facing_into_room(room: &Room, position: [f32; 3]) -> [f32; 3] {
    let across = position[0] / room.half_width();
    let along = position[2] / room.half_depth();
    if across.abs() > along.abs() {
        [-across.signum(), 0.0, 0.0]
    } else if along == 0.0 {
        [0.0, 0.0, 1.0]
    } else {
        [0.0, 0.0, -along.signum()]
    }
}

fn push_box(
    out: &mut Vec<Vertex>,
    center: [f32; 3],
    half: [f32; 3],
    color: [u8; 4],
    material: u32,
) {
    push_rotated_box(out, center, [0.0; 3], half, 0.0, color, material);
}

/// Box centred at `pivot + offset`, turned clockwise (seen from +z) by `angle` degrees about
/// the z axis through `pivot`.
fn push_rotated_box(
    out: &mut Vec<Vertex>,
    pivot: [f32; 3],
    offset: [f32; 3],
    half: [f32; 3],
    angle: f32,
    color: [u8; 4],
    material: u32,
) {
    let (sin, cos) = angle.to_radians().sin_cos();
    let rotate = |p: [f32; 3]| [p[0] * cos + p[1] * sin, -p[0] * sin + p[1] * cos, p[2]];
    let place = |p: [f32; 3]| {
        let [x, y, z] = rotate(p);
        [pivot[0] + x, pivot[1] + y, pivot[2] + z]
    };

    for (normal, u, v) in BOX_FACES {
        let corner = |su: f32, sv: f32| {
            let mut local = offset;
            for axis in 0..3 {
                local[axis] += (normal[axis] + su * u[axis] + sv * v[axis]) * half[axis];
            }
            place(local)
        };
        push_quad(
            out,
            [
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ],
            rotate(normal),
            [1.0, 1.0],
            color,
            material,
        );
    }
}

/// Two triangles over corners given counter-clockwise as seen from the front.
fn push_quad(
    out: &mut Vec<Vertex>,
    corners: [[f32; 3]; 4],
    normal: [f32; 3],
    uv_scale: [f32; 2],
    color: [u8; 4],
    material: u32,
) {
    let uvs = [
        [0.0, uv_scale[1]],
        [uv_scale[0], uv_scale[1]],
        [uv_scale[0], 0.0],
        [0.0, 0.0],
    ];
    for i in [0, 1, 2, 0, 2, 3] {
        out.push(Vertex {
            position: corners[i],
            normal,
            uv: uvs[i],
            color,
            material,
        });
    }
}

fn rgba([r, g, b]: [u8; 3]) -> [u8; 4] {
    [r, g, b, 255]
}

/// Lifts each channel a third of the way toward white.
fn highlight(color: [u8; 3]) -> [u8; 3] {
    color.map(|c| c + (255 - c) / 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::room::RoomKind;

    const VERTICES_PER_BOX: usize = 36;

    fn room(interactables: Vec<Interactable>) -> Room {
        Room {
            id: "test".into(),
            name: "Test".into(),
            kind: RoomKind::Normal,
            size: [6.0, 3.0, 6.0],
            spawn: [0.0, 2.0],
            spawn_yaw: 0.0,
            wall_color: [100, 100, 100],
            floor_color: [80, 80, 80],
            interactables,
        }
    }

    fn item(id: &str, position: [f32; 3], kind: InteractableKind) -> Interactable {
        Interactable {
            id: id.into(),
            position,
            half_extents: [0.25, 0.25, 0.05],
            kind,
        }
    }

    fn centroid(vertices: &[Vertex]) -> [f32; 3] {
        let n = vertices.len() as f32;
        let mut sum = [0.0; 3];
        for vertex in vertices {
            for axis in 0..3 {
                sum[axis] += vertex.position[axis] / n;
            }
        }
        sum
    }

    #[test]
    fn empty_room_is_six_quads() {
        let vertices = build_room_vertices(
            &room(Vec::new()),
            &GameStateManager::new(),
            &HashMap::new(),
            None,
        );
        assert_eq!(vertices.len(), 36);
        assert!(vertices.iter().all(|v| v.position[1] >= 0.0 && v.position[1] <= 3.0));
    }

    #[test]
    fn hidden_keys_are_not_drawn() {
        let key = item(
            "key",
            [0.0, 1.0, 0.0],
            InteractableKind::Key {
                item: "brass_key".into(),
                revealed_by: Some("cubes".into()),
            },
        );
        let room = room(vec![key]);
        let mut state = GameStateManager::new();
        state.register_puzzle("cubes");
        let hidden = build_room_vertices(&room, &state, &HashMap::new(), None).len();
        state.set_puzzle_solved("cubes");
        let shown = build_room_vertices(&room, &state, &HashMap::new(), None).len();
        assert_eq!(shown - hidden, VERTICES_PER_BOX);
    }

    #[test]
    fn keypad_light_turns_green_when_solved() {
        let keypad = item(
            "pad",
            [1.0, 1.4, -2.95],
            InteractableKind::Keypad {
                puzzle: "code".into(),
                code: "1".into(),
            },
        );
        let room = room(vec![keypad]);
        let mut state = GameStateManager::new();
        state.register_puzzle("code");
        let lit = |state: &GameStateManager| {
            build_room_vertices(&room, state, &HashMap::new(), None)
                .into_iter()
                .filter(|v| v.material == MATERIAL_EMISSIVE)
                .map(|v| v.color)
                .collect::<Vec<_>>()
        };
        assert!(lit(&state).iter().all(|c| *c == rgba(LOCKED_LIGHT)));
        state.set_puzzle_solved("code");
        let solved = lit(&state);
        assert_eq!(solved.len(), VERTICES_PER_BOX);
        assert!(solved.iter().all(|c| *c == rgba(OPEN_LIGHT)));
    }

    #[test]
    fn cube_marker_follows_display_angle() {
        let panel = Interactable {
            id: "panel".into(),
            position: [0.0, 1.5, -2.9],
            half_extents: [0.3, 0.3, 0.05],
            kind: InteractableKind::CubePanel {
                puzzle: "cubes".into(),
                rows: 1,
                cols: 1,
                scramble: 0,
            },
        };
        let center = panel.cube_center(0, 0).unwrap();
        let room = room(vec![panel]);
        let mut cubes = CubePuzzle::new(1, 1);
        cubes.click(0, 0).unwrap();
        cubes.animate(10.0);
        let puzzles = HashMap::from([("cubes".to_string(), cubes)]);

        let vertices = build_room_vertices(&room, &GameStateManager::new(), &puzzles, None);
        let marker: Vec<_> = vertices
            .into_iter()
            .filter(|v| v.color == rgba(MARKER_COLOR))
            .collect();
        assert_eq!(marker.len(), VERTICES_PER_BOX);
        // A quarter turn clockwise moves the marker from the top edge to the right edge.
        let [x, y, _] = centroid(&marker);
        assert!(x - center[0] > CUBE_HALF * 0.4);
        assert!((y - center[1]).abs() < 1e-4);
    }

    #[test]
    fn picked_cube_is_highlighted_alone() {
        let panel = Interactable {
            id: "panel".into(),
            position: [0.0, 1.5, -2.9],
            half_extents: [0.5, 0.3, 0.05],
            kind: InteractableKind::CubePanel {
                puzzle: "cubes".into(),
                rows: 1,
                cols: 2,
                scramble: 0,
            },
        };
        let room = room(vec![panel]);
        let mut cubes = CubePuzzle::new(1, 2);
        cubes.click(0, 0).unwrap();
        let puzzles = HashMap::from([("cubes".to_string(), cubes)]);
        let target = PickTarget {
            index: 0,
            cell: Some((0, 1)),
            distance: 1.0,
        };

        let vertices =
            build_room_vertices(&room, &GameStateManager::new(), &puzzles, Some(&target));
        let bright = rgba(highlight(CUBE_COLOR));
        let highlighted = vertices.iter().filter(|v| v.color == bright).count();
        assert_eq!(highlighted, VERTICES_PER_BOX);
        assert!(vertices.iter().any(|v| v.color == rgba(CUBE_COLOR)));
    }

    #[test]
    fn wall_objects_face_the_room() {
        let room = room(Vec::new());
        assert_eq!(facing_into_room(&room, [0.0, 1.0, -2.95]), [0.0, 0.0, 1.0]);
        assert_eq!(facing_into_room(&room, [2.95, 1.0, 0.5]), [-1.0, 0.0, 0.0]);
        assert_eq!(facing_into_room(&room, [0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn highlight_brightens_without_overflow() {
        assert_eq!(highlight([255, 0, 90]), [255, 85, 145]);
    }
}
