mod display;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, MouseButton, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};

use walker_shooter::collab::{Collaborators, ScoreStore, BEST_SCORE_KEY};
use walker_shooter::config::Tuning;
use walker_shooter::entities::MountSide;
use walker_shooter::game::{FrameOutcome, Game};
use walker_shooter::player::PlayerInput;
use walker_shooter::score::EndReason;
use walker_shooter::terrain::CorridorTerrain;

use display::{Grid, HudState, ParticleField, TermHud, TermParticles, TermRenderer};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 8;

const CONFIG_ENV: &str = "WALKER_SHOOTER_CONFIG";
const DEFAULT_CONFIG: &str = "walker_shooter.ron";
const LOG_FILE: &str = "walker_shooter.log";

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Best-score persistence ────────────────────────────────────────────────────

/// One file per key under `$HOME`.
struct FileScores {
    dir: PathBuf,
}

impl FileScores {
    fn in_home() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self { dir: PathBuf::from(home) }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}", key))
    }
}

impl ScoreStore for FileScores {
    fn load_best(&self, key: &str) -> u32 {
        std::fs::read_to_string(self.path(key))
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    fn save_best(&mut self, key: &str, score: u32) {
        if let Err(e) = std::fs::write(self.path(key), score.to_string()) {
            log::warn!("could not save best score: {}", e);
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, best: u32) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "▲  WALKER  SHOOTER  ▲";
    out.queue(cursor::MoveTo(cx.saturating_sub(title.chars().count() as u16 / 2), cy.saturating_sub(6)))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if best > 0 {
        let hs = format!("Best Score: {}", best);
        out.queue(cursor::MoveTo(cx.saturating_sub(hs.chars().count() as u16 / 2), cy.saturating_sub(5)))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs))?;
    }

    let legend: &[(&str, Color, &str)] = &[
        ("W", Color::Green, " Weapon   - swaps one mount"),
        ("+", Color::Magenta, " Repair   - restores some HP"),
        ("^", Color::Cyan, " Upgrade  - speed, damage, reload or shot speed"),
        ("i", Color::Yellow, " Walker   - innocent bystander, don't hit"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(22), cy.saturating_sub(2) + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(22), cy + 4))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("ENTER / SPACE : Start      Q : Quit"))?;
    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(MenuResult::Quit),
                _ => {}
            }
        }
    }
}

/// Blocks on the game-over screen.  Returns `true` → quit program.
fn wait_after_game_over(rx: &mpsc::Receiver<Event>) -> bool {
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => match code {
                KeyCode::Char('r') | KeyCode::Char('R') => return false,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
                _ => {}
            },
            Ok(_) => {}
            Err(_) => return true,
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Pointer and mouse-button state gathered from mouse events.
#[derive(Default)]
struct Mouse {
    at: Option<(u16, u16)>,
    left: bool,
    right: bool,
}

/// Returns `true` → quit program,  `false` → back to the menu.
///
/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event for every key; each frame every still-fresh key applies at once, so
/// moving and firing both mounts can overlap.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    hud: &Rc<RefCell<HudState>>,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<bool> {
    let token = game.start_run();
    let started = Instant::now();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut mouse = Mouse::default();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code.clone(), frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                game.end_run(EndReason::Abandoned);
                                return Ok(true);
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                game.end_run(EndReason::Abandoned);
                                return Ok(true);
                            }
                            KeyCode::Char('g') | KeyCode::Char('G') => {
                                let on = !game.god_mode();
                                game.set_god_mode(on);
                            }
                            KeyCode::Char('1') => {
                                game.cycle_weapon(MountSide::Left);
                            }
                            KeyCode::Char('2') => {
                                game.cycle_weapon(MountSide::Right);
                            }
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code.clone(), frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(m) => {
                    mouse.at = Some((m.column, m.row));
                    match m.kind {
                        MouseEventKind::Down(MouseButton::Left) => mouse.left = true,
                        MouseEventKind::Down(MouseButton::Right) => mouse.right = true,
                        MouseEventKind::Up(MouseButton::Left) => mouse.left = false,
                        MouseEventKind::Up(MouseButton::Right) => mouse.right = false,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // ── Build this frame's input ──────────────────────────────────────────
        let left = any_held(&key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame);
        let right = any_held(&key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame);
        let up = any_held(&key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame);
        let down = any_held(&key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame);
        let fire_left = any_held(&key_frame, &[KeyCode::Char('j'), KeyCode::Char('J'), KeyCode::Char(' ')], frame);
        let fire_right = any_held(&key_frame, &[KeyCode::Char('k'), KeyCode::Char('K')], frame);

        let (cols, rows) = terminal::size()?;
        let world = game.world();
        let grid = Grid { cols, rows, w: world.w, h: world.h };
        let aim = mouse.at.map(|(c, r)| (grid.world_at(c, r), grid.contains(c, r)));

        let input = PlayerInput {
            move_x: (right as i8 - left as i8) as f32,
            move_y: (down as i8 - up as i8) as f32,
            aim: aim.map(|(p, _)| p),
            aim_on_surface: aim.is_some_and(|(_, inside)| inside),
            fire: [mouse.left || fire_left, mouse.right || fire_right],
        };

        match game.frame(token, started.elapsed().as_secs_f64(), &input) {
            FrameOutcome::Running => {}
            FrameOutcome::Stale => return Ok(false),
            FrameOutcome::Ended(summary) => {
                let best = hud.borrow().summary.as_ref().map_or(summary.score, |(_, b)| *b);
                display::draw_game_over(out, &summary, best)?;
                return Ok(wait_after_game_over(rx));
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging() -> anyhow::Result<()> {
    let file = File::create(LOG_FILE).with_context(|| format!("cannot open log file {}", LOG_FILE))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let tuning = Arc::new(Tuning::load_or_default(&PathBuf::from(config_path)));

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, tuning);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, tuning: Arc<Tuning>) -> anyhow::Result<()> {
    let hud = Rc::new(RefCell::new(HudState::default()));
    let particles = Rc::new(RefCell::new(ParticleField::default()));
    let scores = FileScores::in_home();

    let (w, h) = (tuning.canvas_w, tuning.canvas_h);
    let collab = Collaborators::default()
        .with_terrain(CorridorTerrain::new(w, h, tuning.tile_h))
        .with_particles(TermParticles(particles.clone()))
        .with_renderer(TermRenderer::new(BufWriter::new(stdout()), hud.clone(), particles))
        .with_hud(TermHud(hud.clone()))
        .with_scores(FileScores::in_home());

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut game = Game::new(tuning, collab, seed);

    loop {
        let best = scores.load_best(BEST_SCORE_KEY);
        match show_menu(out, rx, best)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let quit = game_loop(out, &mut game, &hud, rx).context("terminal I/O failed")?;
                if quit {
                    break;
                }
                // Otherwise loop back to the menu
            }
        }
    }
    Ok(())
}
