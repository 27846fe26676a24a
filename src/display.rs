/// Terminal rendering. All crossterm output for the game screen lives here.
///
/// The simulation works in world pixels; everything is scaled onto the
/// terminal grid at draw time.  The HUD and particle sinks only record
/// state; [`TermRenderer`] paints it together with the frame snapshot.
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use rand::{thread_rng, Rng};

use walker_shooter::collab::{FrameView, Hud, HudCounters, Particles, RenderError, Renderer};
use walker_shooter::entities::{BeamKind, BossPhase, PickupEffect, Shape, SplatMode, TurretType, WeaponKind};
use walker_shooter::fx::{Burst, ParticleKind};
use walker_shooter::score::RunSummary;
use walker_shooter::walkers::stride_angle;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HOLE: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_HUD_HP: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_SHOT: Color = Color::Cyan;
const C_BEAM: Color = Color::Cyan;
const C_PUNCH: Color = Color::Magenta;
const C_ENEMY_SHOT: Color = Color::Magenta;
const C_WALKER: Color = Color::Yellow;
const C_SPLAT: Color = Color::DarkRed;
const C_BOSS: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

// ── HUD state ─────────────────────────────────────────────────────────────────

/// What the HUD hooks have been told so far.
#[derive(Debug, Default)]
pub struct HudState {
    pub counters: HudCounters,
    pub boss_bar: Option<(f32, f32)>,
    pub banner: Option<(String, Instant)>,
    pub summary: Option<(RunSummary, u32)>,
}

#[derive(Clone, Default)]
pub struct TermHud(pub Rc<RefCell<HudState>>);

impl Hud for TermHud {
    fn tick(&mut self, counters: &HudCounters) {
        self.0.borrow_mut().counters = *counters;
    }

    fn boss_bar(&mut self, hp: f32, max_hp: f32) {
        self.0.borrow_mut().boss_bar = (hp > 0.0 && max_hp > 0.0).then_some((hp, max_hp));
    }

    fn banner(&mut self, text: &str, millis: u32) {
        let until = Instant::now() + Duration::from_millis(millis as u64);
        self.0.borrow_mut().banner = Some((text.to_string(), until));
    }

    fn run_summary(&mut self, summary: &RunSummary, best: u32) {
        self.0.borrow_mut().summary = Some((summary.clone(), best));
    }
}

// ── Particles ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Spark {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    life: f32,
    glyph: char,
    color: Color,
}

#[derive(Debug, Default)]
pub struct ParticleField {
    sparks: Vec<Spark>,
}

fn particle_look(kind: ParticleKind) -> (char, Color, f32) {
    match kind {
        ParticleKind::PlayerShot | ParticleKind::Spark => ('\'', Color::White, 0.15),
        ParticleKind::Damage => ('*', Color::Yellow, 0.25),
        ParticleKind::Explosion => ('#', Color::DarkYellow, 0.45),
        ParticleKind::BotExplosion => ('#', Color::Red, 0.8),
        ParticleKind::WarnSpark => ('+', Color::Yellow, 0.2),
        ParticleKind::Smoke | ParticleKind::HeavySmoke => ('°', Color::DarkGrey, 0.7),
        ParticleKind::Blood => (',', Color::Red, 0.35),
        ParticleKind::PickupFlash => ('✦', Color::Green, 0.3),
        ParticleKind::ShellEject => ('.', Color::DarkYellow, 0.3),
    }
}

#[derive(Clone, Default)]
pub struct TermParticles(pub Rc<RefCell<ParticleField>>);

impl Particles for TermParticles {
    fn spawn(&mut self, burst: &Burst) {
        let (glyph, color, life) = particle_look(burst.kind);
        let count = (burst.amount * 3.0).ceil().clamp(1.0, 10.0) as usize;
        let mut rng = thread_rng();
        let mut field = self.0.borrow_mut();
        for _ in 0..count {
            let (vx, vy) = match burst.dir {
                Some((dx, dy)) => {
                    let m = dx.hypot(dy).max(1.0);
                    (dx / m * 120.0 + rng.gen_range(-40.0..40.0), dy / m * 120.0 + rng.gen_range(-40.0..40.0))
                }
                None => (rng.gen_range(-90.0..90.0), rng.gen_range(-90.0..90.0)),
            };
            field.sparks.push(Spark { x: burst.x, y: burst.y, vx, vy, life, glyph, color });
        }
    }

    fn update(&mut self, dt: f32) {
        let mut field = self.0.borrow_mut();
        for s in field.sparks.iter_mut() {
            s.x += s.vx * dt;
            s.y += s.vy * dt;
            s.life -= dt;
        }
        field.sparks.retain(|s| s.life > 0.0);
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────────

pub struct TermRenderer<W: Write> {
    out: W,
    hud: Rc<RefCell<HudState>>,
    particles: Rc<RefCell<ParticleField>>,
    cols: u16,
    rows: u16,
}

/// Maps world pixels onto the play area between the HUD row and the hint row.
#[derive(Clone, Copy)]
pub struct Grid {
    pub cols: u16,
    pub rows: u16,
    pub w: f32,
    pub h: f32,
}

impl Grid {
    fn play_cols(&self) -> f32 {
        self.cols.saturating_sub(2).max(1) as f32
    }

    fn play_rows(&self) -> f32 {
        self.rows.saturating_sub(3).max(1) as f32
    }

    pub fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 || x >= self.w || y >= self.h {
            return None;
        }
        let c = (x / self.w * self.play_cols()) as u16 + 1;
        let r = (y / self.h * self.play_rows()) as u16 + 1;
        Some((c, r))
    }

    /// World point at the centre of terminal cell (col, row).
    pub fn world_at(&self, col: u16, row: u16) -> (f32, f32) {
        let x = (col.saturating_sub(1) as f32 + 0.5) / self.play_cols() * self.w;
        let y = (row.saturating_sub(1) as f32 + 0.5) / self.play_rows() * self.h;
        (x, y)
    }

    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= 1 && row >= 1 && (col as f32) <= self.play_cols() && (row as f32) <= self.play_rows()
    }
}

impl<W: Write> TermRenderer<W> {
    pub fn new(out: W, hud: Rc<RefCell<HudState>>, particles: Rc<RefCell<ParticleField>>) -> Self {
        let (cols, rows) = terminal::size().unwrap_or((80, 40));
        Self { out, hud, particles, cols, rows }
    }

    fn put(&mut self, grid: &Grid, x: f32, y: f32, glyph: &str, color: Color) -> std::io::Result<()> {
        if let Some((c, r)) = grid.cell(x, y) {
            self.out.queue(cursor::MoveTo(c, r))?;
            self.out.queue(style::SetForegroundColor(color))?;
            self.out.queue(Print(glyph))?;
        }
        Ok(())
    }

    fn draw_ground(&mut self, grid: &Grid, view: &FrameView<'_>) -> std::io::Result<()> {
        self.out.queue(style::SetForegroundColor(C_HOLE))?;
        for row in 1..=grid.play_rows() as u16 {
            for col in 1..=grid.play_cols() as u16 {
                let (x, y) = grid.world_at(col, row);
                if !view.terrain.is_safe(x, y) {
                    self.out.queue(cursor::MoveTo(col, row))?;
                    self.out.queue(Print("░"))?;
                }
            }
        }
        Ok(())
    }

    fn draw_entities(&mut self, grid: &Grid, view: &FrameView<'_>) -> std::io::Result<()> {
        for s in view.splats {
            let glyph = match s.mode {
                SplatMode::Smear { .. } => "~",
                SplatMode::Impact => ",",
            };
            for b in &s.blobs {
                self.put(grid, b.x, b.y, glyph, C_SPLAT)?;
            }
        }

        for p in view.pickups {
            let (glyph, color) = match p.effect {
                PickupEffect::Weapon { .. } => ("W", Color::Green),
                PickupEffect::Repair { .. } => ("+", Color::Magenta),
                PickupEffect::BotUpgrade { .. } => ("^", Color::Cyan),
            };
            self.put(grid, p.x, p.y, glyph, color)?;
        }

        for w in view.walkers {
            let glyph = if stride_angle(w) >= 0.0 { "i" } else { "λ" };
            self.put(grid, w.x, w.y, glyph, C_WALKER)?;
            if let Some(s) = &w.speech {
                self.put(grid, w.x + 12.0, w.y - 24.0, &format!("\"{}\"", s.line), Color::White)?;
            }
        }

        for t in view.turrets {
            let (glyph, color) = match (t.is_boss(), t.ty) {
                (true, _) => ("[#]", C_BOSS),
                (false, TurretType::Small) => ("o", Color::Green),
                (false, TurretType::Medium) => ("O", Color::DarkYellow),
                (false, TurretType::Large) => ("@", Color::Red),
            };
            self.put(grid, t.x, t.y, glyph, color)?;
        }

        for b in view.floats {
            let (x0, y0) = (b.x - b.w / 2.0, b.y - b.h / 2.0);
            let steps_x = (b.w / grid.w * grid.play_cols()).ceil().max(1.0) as usize;
            let steps_y = (b.h / grid.h * grid.play_rows()).ceil().max(1.0) as usize;
            for iy in 0..steps_y {
                for ix in 0..steps_x {
                    let x = x0 + (ix as f32 + 0.5) * b.w / steps_x as f32;
                    let y = y0 + (iy as f32 + 0.5) * b.h / steps_y as f32;
                    self.put(grid, x, y, "▒", C_BOSS)?;
                }
            }
            for m in b.mounts.iter().filter(|m| m.alive) {
                self.put(grid, b.x + m.ox, b.y + m.oy, "Θ", Color::Yellow)?;
            }
        }

        for s in &view.enemy_shots {
            self.put(grid, s.x, s.y, "•", C_ENEMY_SHOT)?;
        }

        for beam in view.beams {
            let color = match beam.kind {
                BeamKind::Standard => C_BEAM,
                BeamKind::Punch => C_PUNCH,
            };
            let len = (beam.x1 - beam.x0).hypot(beam.y1 - beam.y0);
            let step = (grid.h / grid.play_rows()).max(1.0);
            let n = (len / step).ceil() as usize;
            for i in 0..=n {
                let k = i as f32 / n.max(1) as f32;
                let x = beam.x0 + (beam.x1 - beam.x0) * k;
                let y = beam.y0 + (beam.y1 - beam.y0) * k;
                self.put(grid, x, y, "│", color)?;
            }
        }

        for p in view.projectiles {
            let glyph = match (&p.shape, p.kind) {
                (Shape::Rocket(r), _) => {
                    for puff in &r.trail {
                        self.put(grid, puff.x, puff.y, "°", Color::DarkGrey)?;
                    }
                    "^"
                }
                (Shape::Tracer { .. }, _) => "|",
                (Shape::Round { .. }, WeaponKind::Cannon) => "●",
                (Shape::Round { .. }, WeaponKind::Shotgun) => "∙",
                (Shape::Round { .. }, _) => "·",
            };
            self.put(grid, p.x, p.y, glyph, C_SHOT)?;
        }

        if let Some(p) = view.player {
            let color = if p.dead { Color::DarkRed } else { C_PLAYER };
            let sprite = if p.dead { "xXx" } else { "<█>" };
            self.put(grid, p.x - grid.w / grid.play_cols(), p.y, sprite, color)?;
        }

        let sparks: Vec<Spark> = self.particles.borrow().sparks.clone();
        for s in &sparks {
            let mut buf = [0u8; 4];
            self.put(grid, s.x, s.y, s.glyph.encode_utf8(&mut buf), s.color)?;
        }
        Ok(())
    }

    fn draw_hud(&mut self, view: &FrameView<'_>) -> std::io::Result<()> {
        let hud = self.hud.borrow();
        let c = hud.counters;
        self.out.queue(cursor::MoveTo(1, 0))?;
        self.out.queue(style::SetForegroundColor(C_HUD))?;
        self.out.queue(Print(format!(
            "Dist:{:>7}  Kills:{:>4}  IBS:{:>3}",
            c.distance, c.enemies_destroyed, c.collateral
        )))?;

        let filled = ((c.hp / c.max_hp.max(1.0)) * 10.0).round().clamp(0.0, 10.0) as usize;
        let hp = format!("HP [{}{}]", "█".repeat(filled), " ".repeat(10 - filled));
        let loadout = view.player.map_or(String::new(), |p| {
            let name = |k: Option<WeaponKind>| k.map_or("-", WeaponKind::label);
            format!("{} | {}  ", name(p.weapons[0]), name(p.weapons[1]))
        });
        let right = format!("{}{}", loadout, hp);
        let rx = self.cols.saturating_sub(right.chars().count() as u16 + 1);
        self.out.queue(cursor::MoveTo(rx, 0))?;
        self.out.queue(style::SetForegroundColor(C_HUD_HP))?;
        self.out.queue(Print(right))?;

        if let Some((hp, max)) = hud.boss_bar {
            let width = (self.cols / 2).max(10) as usize;
            let filled = ((hp / max) * width as f32).round().clamp(0.0, width as f32) as usize;
            let bar = format!("BOSS [{}{}]", "▇".repeat(filled), " ".repeat(width - filled));
            let bx = (self.cols / 2).saturating_sub(bar.chars().count() as u16 / 2);
            self.out.queue(cursor::MoveTo(bx, 1))?;
            self.out.queue(style::SetForegroundColor(C_BOSS))?;
            self.out.queue(Print(bar))?;
        }

        if let Some((text, until)) = &hud.banner {
            if Instant::now() < *until {
                let bx = (self.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
                self.out.queue(cursor::MoveTo(bx, self.rows / 3))?;
                self.out.queue(style::SetForegroundColor(C_BOSS))?;
                self.out.queue(Print(text))?;
            }
        }

        if c.boss_phase == BossPhase::Clearing {
            self.out.queue(cursor::MoveTo(1, 1))?;
            self.out.queue(style::SetForegroundColor(C_HINT))?;
            self.out.queue(Print("clearing arena…"))?;
        }
        Ok(())
    }

    fn draw_controls_hint(&mut self) -> std::io::Result<()> {
        self.out.queue(cursor::MoveTo(1, self.rows.saturating_sub(1)))?;
        self.out.queue(style::SetForegroundColor(C_HINT))?;
        self.out.queue(Print(
            "WASD/←→↑↓ : Move   Mouse : Aim   J/LMB K/RMB : Fire   G : God   1/2 : Cycle   Q : Quit",
        ))?;
        Ok(())
    }
}

impl<W: Write> Renderer for TermRenderer<W> {
    fn draw(&mut self, view: &FrameView<'_>) -> Result<(), RenderError> {
        let (cols, rows) = terminal::size()?;
        if cols < 20 || rows < 10 {
            return Err(RenderError::Surface(format!("terminal too small ({}x{})", cols, rows)));
        }
        self.cols = cols;
        self.rows = rows;
        let grid = Grid { cols, rows, w: view.w, h: view.h };

        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        self.draw_ground(&grid, view)?;
        self.draw_entities(&grid, view)?;
        self.draw_hud(view)?;
        self.draw_controls_hint()?;

        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
        self.out.flush()?;
        Ok(())
    }
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

pub fn draw_game_over<W: Write>(out: &mut W, summary: &RunSummary, best: u32) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let new_best = summary.score >= best && summary.score > 0;
    let score_line = format!("Score: {:>6}", summary.score);
    let best_line = if new_best {
        format!("★ NEW BEST: {:>6} ★", best)
    } else {
        format!("Best Score: {:>6}", best)
    };
    let stats = format!(
        "Distance: {}  |  Enemies: {}  |  IBS: {}",
        summary.distance, summary.enemies, summary.collateral
    );

    let lines: Vec<(String, Color)> = vec![
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (summary.reason.message().to_string(), Color::White),
        (score_line, Color::Yellow),
        (best_line, if new_best { Color::Yellow } else { Color::DarkGrey }),
        (stats, Color::DarkGrey),
        (summary.message.to_string(), Color::Cyan),
        ("R - Play Again  Q - Quit".to_string(), Color::White),
    ];

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
