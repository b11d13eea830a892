use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEventKind,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use sprig_config::{BoundaryMode, SprigConfig};
use sprig_core::{
    bus::EventBus,
    event::Event,
    fps::TickCounter,
    logging::{self, LogBuffer},
};
use sprig_engine::{BoundaryPolicy, LoadReport, Screen, SpriteController, SpriteSettings};
use sprig_ui::{
    layout::stage_layout,
    shell::{render_shell, ShellView},
    StageMapping, TerminalSurface,
};

const POLL_TIMEOUT: Duration = Duration::from_millis(16);
const HUD_HEIGHT: u16 = 8;
const HUD_STATUS_WIDTH: u16 = 30;

struct App {
    sprite: SpriteController,
    bus: EventBus,
    tick_counter: TickCounter,
    log_buffer: LogBuffer,
    stage: StageMapping,
    tick_interval: Duration,
    origin: String,
}

fn sprite_settings(config: &SprigConfig) -> SpriteSettings {
    SpriteSettings {
        screen: Screen {
            width: config.screen.width,
            height: config.screen.height,
        },
        boundary: match config.sprite.boundary {
            BoundaryMode::Clamp => BoundaryPolicy::Clamp,
            BoundaryMode::Wrap => BoundaryPolicy::Wrap,
        },
        seed: config.timing.seed,
    }
}

/// Build the controller from configured assets, or the demo pack when none
/// are configured.
fn build_sprite(config: &SprigConfig, now: Instant) -> Result<(SpriteController, String)> {
    let settings = sprite_settings(config);
    let (mut sprite, origin) = if config.uses_demo_pack() {
        (
            SpriteController::with_demo_pack(settings, now)?,
            "demo pack".to_string(),
        )
    } else {
        let (Some(animations), Some(state_machine)) =
            (&config.assets.animations, &config.assets.state_machine)
        else {
            bail!("assets.animations and assets.state_machine must be set together");
        };
        let mut sprite = SpriteController::new(settings, now);
        let clips = sprite.load_animations(animations)?;
        log_report("animations", &clips);
        let states = sprite.load_state_machine(state_machine, now)?;
        log_report("state machine", &states);
        (sprite, state_machine.display().to_string())
    };
    sprite.set_height(config.sprite.height);
    sprite.set_position(config.sprite.x, config.sprite.y);
    Ok((sprite, origin))
}

fn log_report(phase: &str, report: &LoadReport) {
    if report.is_clean() {
        tracing::info!(phase, loaded = report.loaded.len(), "load complete");
    } else {
        tracing::warn!(
            phase,
            loaded = report.loaded.len(),
            skipped = report.issues.len(),
            "load complete with issues"
        );
    }
}

impl App {
    fn new(config: &SprigConfig, log_buffer: LogBuffer, now: Instant) -> Result<Self> {
        let (sprite, origin) = build_sprite(config, now)?;
        Ok(Self {
            stage: StageMapping::new(Rect::default(), sprite.screen()),
            sprite,
            bus: EventBus::new(),
            tick_counter: TickCounter::default(),
            log_buffer,
            tick_interval: Duration::from_millis(config.timing.tick_ms),
            origin,
        })
    }

    fn hud_lines(&self) -> Vec<String> {
        let pos = self.sprite.position();
        let size = self.sprite.size();
        let frames = self.sprite.current_clip().map_or(0, |c| c.frame_count());
        vec![
            format!("state: {}", self.sprite.current_state().unwrap_or("-")),
            format!("frame: {}/{}", self.sprite.frame_index() + 1, frames),
            format!("pos:   {}, {}", pos.x, pos.y),
            format!("size:  {}x{}", size.width, size.height),
            format!("tps:   {:.1}", self.tick_counter.tps()),
        ]
    }

    /// Translate one terminal event into bus events.
    fn publish_input(&mut self, input: CEvent) {
        match input {
            CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.bus.publish(Event::Quit);
                }
            }
            CEvent::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                if let Some((x, y)) = self.stage.to_screen(mouse.column, mouse.row) {
                    self.bus.publish(Event::Click { x, y });
                }
            }
            CEvent::Resize(cols, rows) => self.bus.publish(Event::Resize { cols, rows }),
            _ => {}
        }
    }

    /// Handle everything on the bus. Returns `false` once quit was requested.
    fn dispatch(&mut self) -> bool {
        for ev in self.bus.drain() {
            match ev {
                Event::Tick { now } => {
                    self.tick_counter.tick(now);
                    self.sprite.update(now);
                }
                Event::Click { x, y } => {
                    let hit = self.sprite.on_mouse_click(x, y);
                    tracing::debug!(x, y, hit, "click");
                }
                Event::Resize { cols, rows } => {
                    tracing::debug!(cols, rows, "terminal resized");
                }
                Event::Quit => return false,
            }
        }
        true
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let log_buffer = logging::init();
    tracing::info!("SPRIG starting up");

    let (config, source) = SprigConfig::discover().context("failed to load configuration")?;
    match source.path() {
        Some(path) => tracing::info!(path = %path.display(), "config loaded"),
        None => tracing::info!("no config file found; using defaults"),
    }
    let app = App::new(&config, log_buffer, Instant::now())?;

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, app);
    restore_terminal(terminal)?;
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        // ── Render ──
        let logs = logging::recent(&app.log_buffer, 64);
        let mut stage_area = app.stage.area;
        terminal.draw(|f| {
            let rects = stage_layout(f.area(), HUD_HEIGHT, HUD_STATUS_WIDTH);
            let view = ShellView {
                title: app.sprite.current_state().unwrap_or("-"),
                status_line: &app.origin,
                hud_status: app.hud_lines(),
                logs,
            };
            render_shell(f, rects, view, |f, area| {
                stage_area = area;
                let mapping = StageMapping::new(area, app.sprite.screen());
                app.sprite
                    .draw(&mut TerminalSurface::new(f.buffer_mut(), mapping));
            });
        })?;
        app.stage.area = stage_area;

        // ── Poll → Publish ──
        if event::poll(POLL_TIMEOUT)? {
            let input = event::read()?;
            app.publish_input(input);
        }

        if last_tick.elapsed() >= app.tick_interval {
            last_tick = Instant::now();
            app.bus.publish(Event::Tick { now: last_tick });
        }

        // ── Drain → Dispatch ──
        if !app.dispatch() {
            tracing::info!("SPRIG shutting down");
            return Ok(());
        }
    }
}
