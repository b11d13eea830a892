use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};

use crate::demo_pack;
use crate::graph::BehaviorGraph;
use crate::issue::LoadReport;
use crate::library::AnimationLibrary;
use crate::motion::{BoundaryPolicy, MotionModel, Position, Screen, Size};
use crate::sprite::{ClickLatch, SpriteInstance};
use crate::surface::{DrawRect, Surface};
use crate::transition::TransitionEngine;
use crate::types::{Clip, Frame};

/// Construction-time settings for a [`SpriteController`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteSettings {
    pub screen: Screen,
    pub boundary: BoundaryPolicy,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

/// One sprite: its clips, its behavior graph and its runtime state.
///
/// Hosts call [`update`](Self::update) on every tick and
/// [`draw`](Self::draw) whenever they repaint.
pub struct SpriteController {
    library: AnimationLibrary,
    graph: Option<BehaviorGraph>,
    sprite: SpriteInstance,
    motion: MotionModel,
    engine: TransitionEngine,
}

impl SpriteController {
    pub fn new(settings: SpriteSettings, now: Instant) -> Self {
        Self {
            library: AnimationLibrary::new(),
            graph: None,
            sprite: SpriteInstance::new(now),
            motion: MotionModel::new(settings.screen, settings.boundary),
            engine: TransitionEngine::new(settings.seed),
        }
    }

    /// A controller preloaded with the embedded demo clips and graph.
    pub fn with_demo_pack(settings: SpriteSettings, now: Instant) -> Result<Self> {
        let mut controller = Self::new(settings, now);
        for clip in demo_pack::demo_clips() {
            let name = clip.name.clone();
            if !controller.library.insert(clip) {
                bail!("demo clip {name} rejected");
            }
        }
        controller
            .load_state_machine_str(demo_pack::DEMO_GRAPH, now)
            .context("embedded demo graph")?;
        Ok(controller)
    }

    /// Load every clip descriptor in `dir`. See
    /// [`AnimationLibrary::load_animations`].
    pub fn load_animations(&mut self, dir: &Path) -> Result<LoadReport> {
        self.library.load_animations(dir)
    }

    /// Load the behavior graph and enter its initial state.
    ///
    /// Clips must be loaded first; states naming an unknown clip are dropped.
    /// Only one graph may be loaded per controller.
    pub fn load_state_machine(&mut self, path: &Path, now: Instant) -> Result<LoadReport> {
        self.ensure_no_graph()?;
        let (graph, report) = BehaviorGraph::load(path, &self.library)?;
        self.install(graph, now);
        Ok(report)
    }

    /// Like [`load_state_machine`](Self::load_state_machine), from JSON text.
    pub fn load_state_machine_str(&mut self, json: &str, now: Instant) -> Result<LoadReport> {
        self.ensure_no_graph()?;
        let (graph, report) = BehaviorGraph::from_json_str(json, "<inline>", &self.library)?;
        self.install(graph, now);
        Ok(report)
    }

    fn ensure_no_graph(&self) -> Result<()> {
        if self.graph.is_some() {
            bail!("a behavior graph is already loaded");
        }
        Ok(())
    }

    fn install(&mut self, graph: BehaviorGraph, now: Instant) {
        let initial = graph.initial();
        tracing::info!(state = %graph.state(initial).name, "entering initial state");
        self.sprite.enter(initial, now);
        self.graph = Some(graph);
    }

    /// Set the sprite height; width follows the current clip's first-frame
    /// aspect ratio. Without a current clip the size is left unchanged.
    pub fn set_height(&mut self, px: i32) {
        let Some(ratio) = self
            .current_clip()
            .and_then(Clip::first_frame)
            .and_then(|f| f.image.aspect_ratio())
        else {
            return;
        };
        self.sprite.size = Size {
            width: (px as f32 * ratio) as i32,
            height: px,
        };
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.sprite.position = Position { x, y };
    }

    /// Advance one tick: frame clock, then motion, then transitions.
    pub fn update(&mut self, now: Instant) {
        let Some(graph) = self.graph.as_ref() else {
            return;
        };
        let Some(state) = self.sprite.state else {
            return;
        };
        let clip = self.library.clip(graph.state(state).clip);

        self.sprite.clock.step(now, clip);
        self.motion
            .step(&mut self.sprite.position, self.sprite.size, clip.movement);

        if let Some(entered) = self
            .engine
            .step(graph, &mut self.sprite, self.motion.screen, now)
        {
            let node = graph.state(entered);
            tracing::debug!(
                state = %node.name,
                clip = %self.library.clip(node.clip).name,
                "entered state"
            );
        }
    }

    /// Blit the current frame at the sprite's position and size.
    pub fn draw(&self, surface: &mut impl Surface) {
        let Some(frame) = self.current_frame() else {
            return;
        };
        let Size { width, height } = self.sprite.size;
        if width <= 0 || height <= 0 {
            return;
        }
        let Position { x, y } = self.sprite.position;
        surface.draw_image(
            &frame.image,
            DrawRect {
                x,
                y,
                width,
                height,
            },
        );
    }

    /// Register a click at screen coordinates. Returns whether it hit the
    /// sprite; a hit is seen by `onClick` transitions on the next update.
    pub fn on_mouse_click(&self, px: i32, py: i32) -> bool {
        let hit = self.sprite.contains(px, py);
        if hit {
            self.sprite.clicks.press();
        }
        hit
    }

    pub fn position(&self) -> Position {
        self.sprite.position
    }

    pub fn size(&self) -> Size {
        self.sprite.size
    }

    /// Name of the current state, once a graph is loaded.
    pub fn current_state(&self) -> Option<&str> {
        let graph = self.graph.as_ref()?;
        Some(graph.state(self.sprite.state?).name.as_str())
    }

    pub fn frame_index(&self) -> usize {
        self.sprite.frame_index()
    }

    pub fn current_clip(&self) -> Option<&Clip> {
        let graph = self.graph.as_ref()?;
        let node = graph.state(self.sprite.state?);
        Some(self.library.clip(node.clip))
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current_clip()?.frames.get(self.sprite.frame_index())
    }

    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    pub fn graph(&self) -> Option<&BehaviorGraph> {
        self.graph.as_ref()
    }

    /// A handle that can register clicks from outside the tick loop.
    pub fn click_latch(&self) -> ClickLatch {
        self.sprite.clicks.clone()
    }

    pub fn screen(&self) -> Screen {
        self.motion.screen
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::types::{FrameImage, Movement};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn clip(name: &str, frames: &[(u32, u32, u64)], dx: i32) -> Clip {
        Clip {
            name: name.into(),
            frames: frames
                .iter()
                .map(|&(w, h, d)| Frame {
                    image: FrameImage::solid(w, h, [9, 9, 9, 255]),
                    duration: ms(d),
                })
                .collect(),
            movement: Movement { dx, dy: 0 },
        }
    }

    fn settings(boundary: BoundaryPolicy) -> SpriteSettings {
        SpriteSettings {
            screen: Screen {
                width: 200,
                height: 100,
            },
            boundary,
            seed: Some(42),
        }
    }

    fn controller(clips: Vec<Clip>, graph: &str, now: Instant) -> SpriteController {
        let mut c = SpriteController::new(settings(BoundaryPolicy::Clamp), now);
        for clip in clips {
            assert!(c.library.insert(clip));
        }
        c.load_state_machine_str(graph, now).unwrap();
        c
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u32, u32, DrawRect)>,
    }

    impl Surface for Recorder {
        fn draw_image(&mut self, image: &FrameImage, rect: DrawRect) {
            self.calls.push((image.width, image.height, rect));
        }
    }

    #[test]
    fn idle_then_walk_to_edge_and_back() {
        let now = Instant::now();
        let mut c = controller(
            vec![
                clip("idle", &[(10, 10, 500)], 0),
                clip("walk", &[(10, 10, 100), (10, 10, 100)], 5),
            ],
            r#"{
                "A": { "animation": "idle", "transitions": [
                    { "to": "B", "condition": "setInterval", "intervalSet": 2000 }
                ] },
                "B": { "animation": "walk", "transitions": [
                    { "to": "A", "condition": "atEndOfScreen", "probability": 1.0 }
                ] }
            }"#,
            now,
        );
        c.set_height(20);
        c.set_position(100, 10);

        c.update(now + ms(1999));
        assert_eq!(c.current_state(), Some("A"));
        c.update(now + ms(2000));
        assert_eq!(c.current_state(), Some("B"));
        assert_eq!(c.frame_index(), 0);

        // 20px wide: the right edge is reached at x = 180.
        let mut t = 2000;
        while c.current_state() == Some("B") {
            t += 16;
            c.update(now + ms(t));
            assert!(t < 10_000, "never returned to A");
        }
        assert_eq!(c.position().x, 180);
        assert_eq!(c.current_state(), Some("A"));
    }

    #[test]
    fn update_before_graph_is_a_no_op() {
        let now = Instant::now();
        let mut c = SpriteController::new(SpriteSettings::default(), now);
        c.set_position(5, 5);
        c.update(now + ms(100));
        assert_eq!(c.position(), Position { x: 5, y: 5 });
        assert_eq!(c.current_state(), None);
        assert!(c.current_frame().is_none());

        let mut rec = Recorder::default();
        c.draw(&mut rec);
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn click_inside_bounds_fires_on_next_update() {
        let now = Instant::now();
        let mut c = controller(
            vec![clip("idle", &[(10, 10, 100)], 0), clip("wave", &[(10, 10, 100)], 0)],
            r#"{
                "idle": { "animation": "idle", "transitions": [
                    { "to": "wave", "condition": "onClick" }
                ] },
                "wave": { "animation": "wave", "transitions": [
                    { "to": "idle", "condition": "onClick" }
                ] }
            }"#,
            now,
        );
        c.set_height(10);
        c.set_position(50, 50);

        assert!(!c.on_mouse_click(49, 55));
        c.update(now + ms(16));
        assert_eq!(c.current_state(), Some("idle"));

        assert!(c.on_mouse_click(60, 60));
        c.update(now + ms(32));
        assert_eq!(c.current_state(), Some("wave"));
        c.update(now + ms(48));
        assert_eq!(c.current_state(), Some("wave"));
    }

    #[test]
    fn click_latch_handle_feeds_the_controller() {
        let now = Instant::now();
        let mut c = controller(
            vec![clip("idle", &[(10, 10, 100)], 0), clip("wave", &[(10, 10, 100)], 0)],
            r#"{
                "idle": { "animation": "idle", "transitions": [
                    { "to": "wave", "condition": "onClick" }
                ] },
                "wave": { "animation": "wave" }
            }"#,
            now,
        );
        let latch = c.click_latch();
        std::thread::spawn(move || latch.press()).join().unwrap();
        c.update(now + ms(16));
        assert_eq!(c.current_state(), Some("wave"));
    }

    #[test]
    fn set_height_follows_first_frame_aspect() {
        let now = Instant::now();
        let mut c = controller(
            vec![clip("idle", &[(30, 20, 100), (10, 10, 100)], 0)],
            r#"{ "idle": { "animation": "idle" } }"#,
            now,
        );
        c.set_height(15);
        assert_eq!(c.size(), Size { width: 22, height: 15 });
    }

    #[test]
    fn set_height_without_clip_leaves_size() {
        let mut c = SpriteController::new(SpriteSettings::default(), Instant::now());
        c.set_height(40);
        assert_eq!(c.size(), Size::default());
    }

    #[test]
    fn frame_index_stays_in_range() {
        let now = Instant::now();
        let mut c = controller(
            vec![
                clip("a", &[(4, 4, 30), (4, 4, 70), (4, 4, 10)], 1),
                clip("b", &[(4, 4, 45)], -1),
            ],
            r#"{
                "a": { "animation": "a", "transitions": [
                    { "to": "b", "condition": "randomInterval", "intervalMin": 50, "intervalMax": 400 }
                ] },
                "b": { "animation": "b", "transitions": [
                    { "to": "a", "condition": "setInterval", "intervalSet": 130 }
                ] }
            }"#,
            now,
        );
        for tick in 1..2_000u64 {
            c.update(now + ms(tick * 7));
            let len = c.current_clip().unwrap().frame_count();
            assert!(c.frame_index() < len, "tick {tick}");
        }
    }

    #[test]
    fn draw_blits_current_frame_at_sprite_rect() {
        let now = Instant::now();
        let mut c = controller(
            vec![clip("idle", &[(8, 4, 100), (6, 3, 100)], 0)],
            r#"{ "idle": { "animation": "idle" } }"#,
            now,
        );
        c.set_height(10);
        c.set_position(-3, 7);

        let mut rec = Recorder::default();
        c.draw(&mut rec);
        c.update(now + ms(100));
        c.draw(&mut rec);

        let before = DrawRect {
            x: -3,
            y: 7,
            width: 20,
            height: 10,
        };
        // Clamping pulls the sprite back on screen during the update.
        let after = DrawRect { x: 0, ..before };
        assert_eq!(rec.calls, [(8, 4, before), (6, 3, after)]);
    }

    fn write_assets(dir: &std::path::Path) {
        image::RgbaImage::from_pixel(4, 8, image::Rgba([200, 10, 10, 255]))
            .save(dir.join("frame.png"))
            .unwrap();
        for (name, dx) in [("idle", 0), ("walk", 2)] {
            let json = format!(
                r#"{{ "name": "{name}", "frames": [ {{ "image": "frame.png", "duration": 100 }} ],
                     "movement": {{ "dx": {dx}, "dy": 0 }} }}"#
            );
            std::fs::write(dir.join(format!("{name}.json")), json).unwrap();
        }
    }

    #[test]
    fn loads_clips_and_graph_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let graph_path = dir.path().join("behavior.json");
        std::fs::write(
            &graph_path,
            r#"{
                "walk": { "animation": "walk", "transitions": [
                    { "to": "idle", "condition": "setInterval", "intervalSet": 50 }
                ] },
                "idle": { "animation": "idle" }
            }"#,
        )
        .unwrap();

        let now = Instant::now();
        let mut c = SpriteController::new(settings(BoundaryPolicy::Wrap), now);
        let clips = c.load_animations(dir.path()).unwrap();
        assert_eq!(clips.loaded, vec!["idle".to_string(), "walk".to_string()]);
        let states = c.load_state_machine(&graph_path, now).unwrap();
        assert!(states.is_clean(), "{:?}", states.issues);

        assert_eq!(c.current_state(), Some("walk"));
        c.set_height(16);
        assert_eq!(c.size(), Size { width: 8, height: 16 });
        c.update(now + ms(60));
        assert_eq!(c.current_state(), Some("idle"));
    }

    #[test]
    fn missing_graph_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let now = Instant::now();
        let mut c = SpriteController::new(SpriteSettings::default(), now);
        c.load_animations(dir.path()).unwrap();

        let err = c
            .load_state_machine(&dir.path().join("missing.json"), now)
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to read behavior graph"));
        assert_eq!(c.current_state(), None);
    }

    #[test]
    fn second_graph_is_rejected() {
        let now = Instant::now();
        let mut c = controller(
            vec![clip("idle", &[(4, 4, 100)], 0)],
            r#"{ "idle": { "animation": "idle" } }"#,
            now,
        );
        let err = c
            .load_state_machine_str(r#"{ "idle": { "animation": "idle" } }"#, now)
            .unwrap_err();
        assert!(err.to_string().contains("already loaded"));
    }

    #[test]
    fn demo_pack_runs() {
        let now = Instant::now();
        let mut c = SpriteController::with_demo_pack(
            SpriteSettings {
                seed: Some(1),
                ..SpriteSettings::default()
            },
            now,
        )
        .unwrap();
        assert_eq!(c.current_state(), Some("idle"));
        c.set_height(120);
        assert_eq!(c.size(), Size { width: 144, height: 120 });

        let mut seen = std::collections::HashSet::new();
        for tick in 1..3_000u64 {
            c.update(now + ms(tick * 16));
            seen.insert(c.current_state().unwrap().to_string());
        }
        assert!(seen.contains("walk"));
    }
}
