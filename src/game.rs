//! Loop driver and boss sequencer.
//!
//! [`Game`] owns the world context and every entity pool, and advances them
//! one frame at a time in a fixed order.  The host schedules frames with the
//! [`FrameToken`] handed out by [`Game::start_run`]; a token from an earlier
//! run is stale and its frames do nothing.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bosses::{boss_level, BossStatus, Bosses};
use crate::collab::{Collaborators, FrameView, HudCounters, Terrain, BEST_SCORE_KEY};
use crate::config::Tuning;
use crate::entities::{BossPhase, MountSide, WeaponKind};
use crate::fx::Fx;
use crate::pickups::Pickups;
use crate::player::{Player, PlayerInput};
use crate::projectiles::Projectiles;
use crate::score::{evaluate_run, EndReason, RunSummary};
use crate::turrets::Turrets;
use crate::walkers::Walkers;
use crate::world::World;

const BOSS_BANNER: &str = "Boss Approaching";
const BOSS_BANNER_MS: u32 = 1500;

/// Identifies the run a scheduled frame belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken(u64);

#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// Token from an ended or replaced run; nothing happened.
    Stale,
    Running,
    Ended(RunSummary),
}

pub struct Game {
    tuning: Arc<Tuning>,
    collab: Collaborators,
    world: World,
    projectiles: Projectiles,
    turrets: Rc<RefCell<Turrets>>,
    bosses: Rc<RefCell<Bosses>>,
    walkers: Rc<RefCell<Walkers>>,
    pickups: Pickups,
    running: bool,
    loop_seq: u64,
    last_now: Option<f64>,
    god_mode: bool,
}

impl Game {
    pub fn new(tuning: Arc<Tuning>, collab: Collaborators, seed: u64) -> Self {
        let world = World::new(&tuning, StdRng::seed_from_u64(seed));
        let mut projectiles = Projectiles::new(tuning.clone());
        let turrets = Rc::new(RefCell::new(Turrets::new(tuning.clone())));
        let bosses = Rc::new(RefCell::new(Bosses::new(tuning.clone())));
        let walkers = Rc::new(RefCell::new(Walkers::new(tuning.clone())));

        // Registration order is resolution order.
        projectiles.register_beam_resolver(turrets.clone());
        projectiles.register_beam_resolver(bosses.clone());
        projectiles.register_beam_resolver(walkers.clone());
        projectiles.register_punch_beam_resolver(turrets.clone());
        projectiles.register_punch_beam_resolver(bosses.clone());
        projectiles.register_punch_beam_resolver(walkers.clone());

        Self {
            pickups: Pickups::new(tuning.clone()),
            tuning,
            collab,
            world,
            projectiles,
            turrets,
            bosses,
            walkers,
            running: false,
            loop_seq: 0,
            last_now: None,
            god_mode: false,
        }
    }

    // ── Run control ──────────────────────────────────────────────────────────

    /// Reset every pool, place a fresh player and begin a run.  Any token
    /// from a previous run goes stale.
    pub fn start_run(&mut self) -> FrameToken {
        self.loop_seq += 1;
        self.running = false;
        self.last_now = None;

        let world = &mut self.world;
        world.reset(&self.tuning);
        let terrain = self.collab.terrain.as_mut();
        terrain.set_full_mode(false);
        terrain.set_generation_enabled(true);
        terrain.reset(&mut world.rng);

        self.projectiles.reset();
        self.pickups.clear();
        self.turrets.borrow_mut().reset();
        self.bosses.borrow_mut().reset();
        self.walkers.borrow_mut().reset(world, terrain);
        world.player = Some(Player::new(self.tuning.clone(), world.w, world.h));

        self.collab.hud.boss_bar(0.0, 1.0);
        self.running = true;
        log::info!("run {} started", self.loop_seq);
        FrameToken(self.loop_seq)
    }

    /// Stop the current run, score it and update the best score.
    pub fn end_run(&mut self, reason: EndReason) -> RunSummary {
        self.running = false;
        self.loop_seq += 1;
        let w = &self.world;
        let summary = evaluate_run(reason, w.dist, w.enemies_destroyed, w.collateral);

        let best = self.collab.scores.load_best(BEST_SCORE_KEY);
        if summary.score > best {
            self.collab.scores.save_best(BEST_SCORE_KEY, summary.score);
        }
        self.collab.hud.run_summary(&summary, best.max(summary.score));
        log::info!(
            "run over ({}): score {} distance {} enemies {} collateral {}",
            reason.message(),
            summary.score,
            summary.distance,
            summary.enemies,
            summary.collateral
        );
        summary
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one frame at host time `now_secs`.  The first frame of a run
    /// has `dt = 0`; later frames are capped at the tuning's `max_dt`.
    pub fn frame(&mut self, token: FrameToken, now_secs: f64, input: &PlayerInput) -> FrameOutcome {
        if !self.running || token.0 != self.loop_seq {
            return FrameOutcome::Stale;
        }
        let dt = match self.last_now {
            Some(last) => ((now_secs - last) as f32).clamp(0.0, self.tuning.max_dt),
            None => 0.0,
        };
        self.last_now = Some(now_secs);
        match self.step(dt, input) {
            Some(reason) => FrameOutcome::Ended(self.end_run(reason)),
            None => FrameOutcome::Running,
        }
    }

    /// Advance the simulation by `dt` seconds.  Returns why the run should
    /// end, if it should.
    pub fn step(&mut self, dt: f32, input: &PlayerInput) -> Option<EndReason> {
        self.maybe_start_boss_encounter();

        let world = &mut self.world;
        if !world.spawn_locked && world.spawn_scale < 1.0 {
            let ramp = self.tuning.spawn_ramp_secs.max(f32::EPSILON);
            world.spawn_scale = (world.spawn_scale + dt / ramp).min(1.0);
        }
        world.dy = if world.boss_active && world.boss_phase == BossPhase::Fight {
            0.0
        } else {
            world.scroll * dt
        };

        // ── Systems ──────────────────────────────────────────────────────────
        let terrain = self.collab.terrain.as_mut();
        terrain.advance(world.dy, &mut world.rng);
        self.pickups.update(dt, world);
        self.walkers.borrow_mut().update(dt, world, terrain, &mut self.projectiles);
        self.turrets
            .borrow_mut()
            .update(dt, world, terrain, &mut self.projectiles, &mut self.pickups);
        self.bosses
            .borrow_mut()
            .update(dt, world, &mut self.projectiles, &mut self.pickups);

        match self.boss_status() {
            Some(s) if self.world.boss_phase == BossPhase::Fight => self.collab.hud.boss_bar(s.hp, s.max_hp),
            _ => self.collab.hud.boss_bar(0.0, 1.0),
        }

        // ── Player ───────────────────────────────────────────────────────────
        let world = &mut self.world;
        if let Some(mut p) = world.player.take() {
            if self.god_mode && !p.dead {
                p.refill();
            }
            p.update(dt, input, world, &mut self.projectiles);
            if !self.god_mode && !p.dead && p.hp <= 0.0 {
                p.destroy(&mut world.fx);
            }
            world.player = Some(p);
        }

        // ── Projectiles and beams ────────────────────────────────────────────
        let poses = world
            .live_player()
            .map(|p| [p.muzzle_pose(MountSide::Left), p.muzzle_pose(MountSide::Right)]);
        self.projectiles
            .retrack(|side| poses.and_then(|ps| ps[side.index()]));
        self.projectiles.update(dt, world);

        self.dispatch_fx(dt);
        self.draw();

        self.advance_boss_sequence();

        // ── Terminal checks ──────────────────────────────────────────────────
        let world = &self.world;
        let terrain = self.collab.terrain.as_ref();
        if let Some(p) = world.player.as_ref() {
            if p.is_death_anim_done() {
                return Some(EndReason::Destroyed);
            }
            if !self.god_mode
                && !p.dead
                && !world.boss_active
                && !terrain.is_cleared()
                && !terrain.is_safe(p.x, p.y)
            {
                return Some(EndReason::Fell);
            }
        }

        self.world.dist += self.world.dy;
        let counters = self.hud_counters();
        self.collab.hud.tick(&counters);
        None
    }

    fn dispatch_fx(&mut self, dt: f32) {
        self.collab.particles.update(dt);
        for e in self.world.fx.drain() {
            match e {
                Fx::Sound(s) => self.collab.audio.play(s),
                Fx::Burst(b) => self.collab.particles.spawn(&b),
            }
        }
    }

    fn draw(&mut self) {
        let turrets = self.turrets.borrow();
        let bosses = self.bosses.borrow();
        let walkers = self.walkers.borrow();
        let boss = bosses.status(&turrets);
        let view = FrameView {
            w: self.world.w,
            h: self.world.h,
            dist: self.world.dist,
            player: self.world.player.as_ref(),
            projectiles: self.projectiles.shots(),
            beams: self.projectiles.beams(),
            turrets: turrets.turrets(),
            floats: bosses.floats(),
            enemy_shots: turrets.shots().shots().iter().chain(bosses.shots().shots()).collect(),
            walkers: walkers.walkers(),
            splats: walkers.splats(),
            pickups: self.pickups.items(),
            boss,
            terrain: self.collab.terrain.as_ref(),
        };
        if let Err(e) = self.collab.renderer.draw(&view) {
            log::warn!("frame not drawn: {}", e);
        }
    }

    fn hud_counters(&self) -> HudCounters {
        let w = &self.world;
        let (hp, max_hp) = w.player.as_ref().map_or((0.0, 1.0), |p| (p.hp, p.max_hp));
        HudCounters {
            distance: w.dist.max(0.0) as u32,
            enemies_destroyed: w.enemies_destroyed,
            collateral: w.collateral,
            hp,
            max_hp,
            boss_phase: w.boss_phase,
        }
    }

    // ── Boss sequencing ──────────────────────────────────────────────────────

    /// Lock ambient spawning and clear the arena once the distance reaches
    /// the next boss threshold.
    pub fn maybe_start_boss_encounter(&mut self) {
        let w = &mut self.world;
        if w.boss_active || w.boss_phase != BossPhase::None || w.dist < w.next_boss_dist {
            return;
        }
        w.boss_active = true;
        w.spawn_locked = true;
        w.spawn_scale = 0.0;
        w.boss_phase = BossPhase::Clearing;
        self.collab.terrain.set_full_mode(true);
        self.collab.terrain.set_generation_enabled(true);
        log::info!("boss threshold {:.0} reached, clearing arena", w.next_boss_dist);
    }

    /// Clearing → Approach → Fight → None.
    pub fn advance_boss_sequence(&mut self) {
        if !self.world.boss_active {
            return;
        }
        match self.world.boss_phase {
            BossPhase::None => {}
            BossPhase::Clearing => {
                let clear = !self.walkers.borrow().has_active()
                    && !self.pickups.has_active()
                    && !self.turrets.borrow().has_active_non_boss()
                    && self.collab.terrain.is_cleared();
                if clear {
                    self.collab.hud.banner(BOSS_BANNER, BOSS_BANNER_MS);
                    let level = boss_level(self.world.next_boss_dist, self.tuning.boss_interval());
                    let kind = self.bosses.borrow_mut().start_encounter(
                        level,
                        true,
                        &mut self.world,
                        &mut self.turrets.borrow_mut(),
                    );
                    self.world.boss_phase = BossPhase::Approach;
                    log::info!("{:?} boss approaching (level {})", kind, level);
                }
            }
            BossPhase::Approach => {
                let turrets = self.turrets.borrow();
                let bosses = self.bosses.borrow();
                // A boss killed mid-entry skips straight to the wrap-up.
                let entered = match bosses.status(&turrets) {
                    Some(s) => s.entered,
                    None => !bosses.has_active_boss(&turrets),
                };
                if entered {
                    self.world.boss_phase = BossPhase::Fight;
                    log::debug!("boss fight on");
                }
            }
            BossPhase::Fight => {
                if self.bosses.borrow().has_active_boss(&self.turrets.borrow()) {
                    return;
                }
                self.bosses.borrow_mut().close_encounter();
                let interval = self.tuning.boss_interval();
                let w = &mut self.world;
                w.boss_active = false;
                w.spawn_locked = false;
                w.spawn_scale = 0.0;
                w.boss_phase = BossPhase::None;
                w.next_boss_dist = (w.next_boss_dist + interval).max(w.dist + interval);
                self.collab.terrain.set_full_mode(false);
                self.collab.terrain.set_generation_enabled(true);
                log::info!("boss cleared, next at {:.0}", w.next_boss_dist);
            }
        }
    }

    // ── Debug toggles ────────────────────────────────────────────────────────

    /// HP refilled every frame; death and falling are suppressed.
    pub fn set_god_mode(&mut self, on: bool) {
        self.god_mode = on;
        if on {
            if let Some(p) = self.world.live_player_mut() {
                p.refill();
            }
        }
        log::info!("god mode {}", if on { "on" } else { "off" });
    }

    pub fn god_mode(&self) -> bool {
        self.god_mode
    }

    /// Put the next weapon in the debug cycle on `side`.
    pub fn cycle_weapon(&mut self, side: MountSide) -> Option<WeaponKind> {
        let p = self.world.live_player_mut()?;
        let next = match p.weapon(side) {
            Some(cur) => {
                let i = WeaponKind::ALL.iter().position(|k| *k == cur).unwrap_or(0);
                WeaponKind::ALL[(i + 1) % WeaponKind::ALL.len()]
            }
            None => WeaponKind::ALL[0],
        };
        p.set_weapon(side, Some(next));
        log::debug!("{:?} mount now {}", side, next.label());
        Some(next)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn tuning(&self) -> &Arc<Tuning> {
        &self.tuning
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player(&self) -> Option<&Player> {
        self.world.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.world.player.as_mut()
    }

    pub fn terrain(&self) -> &dyn Terrain {
        self.collab.terrain.as_ref()
    }

    pub fn projectiles(&self) -> &Projectiles {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut Projectiles {
        &mut self.projectiles
    }

    pub fn pickups(&self) -> &Pickups {
        &self.pickups
    }

    pub fn pickups_mut(&mut self) -> &mut Pickups {
        &mut self.pickups
    }

    pub fn turrets(&self) -> Ref<'_, Turrets> {
        self.turrets.borrow()
    }

    pub fn turrets_mut(&self) -> RefMut<'_, Turrets> {
        self.turrets.borrow_mut()
    }

    pub fn bosses(&self) -> Ref<'_, Bosses> {
        self.bosses.borrow()
    }

    pub fn bosses_mut(&self) -> RefMut<'_, Bosses> {
        self.bosses.borrow_mut()
    }

    pub fn walkers(&self) -> Ref<'_, Walkers> {
        self.walkers.borrow()
    }

    pub fn walkers_mut(&self) -> RefMut<'_, Walkers> {
        self.walkers.borrow_mut()
    }

    pub fn boss_status(&self) -> Option<BossStatus> {
        self.bosses.borrow().status(&self.turrets.borrow())
    }
}
