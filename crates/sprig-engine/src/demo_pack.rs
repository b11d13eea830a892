use std::time::Duration;

use crate::types::{Clip, Frame, FrameImage, Movement};

/// Behavior graph for the demo clips. `idle` is declared first and is the
/// initial state.
pub(crate) const DEMO_GRAPH: &str = r#"{
    "idle": {
        "animation": "idle",
        "transitions": [
            { "to": "walk", "condition": "randomInterval", "intervalMin": 1500, "intervalMax": 4000 },
            { "to": "wave", "condition": "onClick" }
        ]
    },
    "walk": {
        "animation": "walk",
        "transitions": [
            { "to": "idle", "condition": "randomInterval", "intervalMin": 3000, "intervalMax": 8000, "probability": 0.8 },
            { "to": "wave", "condition": "randomInterval", "intervalMin": 3000, "intervalMax": 8000, "probability": 0.2 },
            { "to": "wave", "condition": "onClick" }
        ]
    },
    "wave": {
        "animation": "wave",
        "transitions": [
            { "to": "idle", "condition": "setInterval", "intervalSet": 1200 }
        ]
    }
}"#;

const IDLE: [&[&str]; 2] = [
    &[
        "............",
        "....####....",
        "...######...",
        "..##o##o##..",
        "..##w##w##..",
        "..########..",
        "..#pp##pp#..",
        "...######...",
        "...##..##...",
        "...##..##...",
    ],
    &[
        "............",
        "............",
        "....####....",
        "...######...",
        "..##o##o##..",
        "..##w##w##..",
        "..#pp##pp#..",
        "..########..",
        "...##..##...",
        "...##..##...",
    ],
];

const WALK: [&[&str]; 2] = [
    &[
        "............",
        "....####....",
        "...######...",
        "..###o##o#..",
        "..###w##w#..",
        "..########..",
        "..##pp##pp..",
        "...######...",
        "..##....##..",
        ".##......##.",
    ],
    &[
        "............",
        "....####....",
        "...######...",
        "..###o##o#..",
        "..###w##w#..",
        "..########..",
        "..##pp##pp..",
        "...######...",
        "....####....",
        "....#..#....",
    ],
];

const WAVE: [&[&str]; 3] = [
    &[
        "..........#.",
        "....####.#..",
        "...######...",
        "..##o##o##..",
        "..##w##w##..",
        "..########..",
        "..#pp##pp#..",
        "...######...",
        "...##..##...",
        "...##..##...",
    ],
    &[
        "...........#",
        "....####..#.",
        "...######.#.",
        "..##o##o##..",
        "..##w##w##..",
        "..########..",
        "..#pp##pp#..",
        "...######...",
        "...##..##...",
        "...##..##...",
    ],
    &[
        "............",
        "....####..##",
        "...######.#.",
        "..##o##o##..",
        "..##w##w##..",
        "..##wwww##..",
        "..#pp##pp#..",
        "...######...",
        "...##..##...",
        "...##..##...",
    ],
];

fn paint(c: char) -> [u8; 4] {
    match c {
        '#' => [0x5f, 0xb8, 0x5a, 0xff],
        'o' => [0x1e, 0x1e, 0x24, 0xff],
        'w' => [0xf4, 0xf4, 0xf0, 0xff],
        'p' => [0xf2, 0x9b, 0xb0, 0xff],
        _ => [0, 0, 0, 0],
    }
}

/// Rasterize ASCII art, one pixel per character.
fn raster(rows: &[&str]) -> FrameImage {
    let height = rows.len() as u32;
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for row in rows {
        let mut drawn = 0;
        for c in row.chars() {
            data.extend_from_slice(&paint(c));
            drawn += 1;
        }
        for _ in drawn..width {
            data.extend_from_slice(&paint('.'));
        }
    }
    FrameImage {
        data,
        width,
        height,
    }
}

fn clip(name: &str, art: &[&[&str]], frame_ms: u64, movement: Movement) -> Clip {
    Clip {
        name: name.to_string(),
        frames: art
            .iter()
            .map(|rows| Frame {
                image: raster(rows),
                duration: Duration::from_millis(frame_ms),
            })
            .collect(),
        movement,
    }
}

/// The embedded demo clips.
pub(crate) fn demo_clips() -> Vec<Clip> {
    vec![
        clip("idle", &IDLE, 400, Movement::default()),
        clip("walk", &WALK, 150, Movement { dx: 4, dy: 0 }),
        clip("wave", &WAVE, 200, Movement::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BehaviorGraph;
    use crate::library::AnimationLibrary;

    #[test]
    fn demo_frames_are_well_formed() {
        for clip in demo_clips() {
            for frame in &clip.frames {
                let img = &frame.image;
                assert_eq!((img.width, img.height), (12, 10), "clip {}", clip.name);
                assert_eq!(img.data.len(), 12 * 10 * 4);
            }
        }
    }

    #[test]
    fn transparent_cells_have_zero_alpha() {
        let img = raster(&["#.", ".o"]);
        assert_eq!(img.data[3], 0xff);
        assert_eq!(img.data[7], 0);
        assert_eq!(img.data[11], 0);
        assert_eq!(img.data[15], 0xff);
    }

    #[test]
    fn demo_graph_loads_cleanly() {
        let mut library = AnimationLibrary::new();
        for clip in demo_clips() {
            assert!(library.insert(clip));
        }
        let (graph, report) = BehaviorGraph::from_json_str(DEMO_GRAPH, "demo", &library).unwrap();
        assert!(report.is_clean(), "{:?}", report.issues);
        assert_eq!(graph.names(), ["idle", "walk", "wave"]);
        assert_eq!(graph.state(graph.initial()).name, "idle");

        // Both walk randomInterval transitions share one group.
        let walk = graph.state(graph.id_of("walk").unwrap());
        assert_eq!(walk.groups.len(), 2);
        assert_eq!(walk.groups[0].members, [0, 1]);
    }
}
