use crate::entities::HostileShot;
use crate::fx::{ParticleKind, Sound};
use crate::world::World;

/// Enemy bullets.  Turrets and float bosses each own one of these.
#[derive(Debug, Default)]
pub struct HostileShots {
    shots: Vec<HostileShot>,
}

impl HostileShots {
    pub fn shots(&self) -> &[HostileShot] {
        &self.shots
    }

    pub fn clear(&mut self) {
        self.shots.clear();
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Aim a bullet from (x, y) at (tx, ty).
    #[allow(clippy::too_many_arguments)]
    pub fn fire_at(&mut self, x: f32, y: f32, tx: f32, ty: f32, speed: f32, r: f32, damage: f32, life: f32) {
        let (dx, dy) = (tx - x, ty - y);
        let len = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if len > 0.0 { (dx / len, dy / len) } else { (0.0, 1.0) };
        self.shots.push(HostileShot {
            x,
            y,
            vx: nx * speed,
            vy: ny * speed,
            r,
            damage,
            t: 0.0,
            life,
        });
    }

    /// Move bullets, hit the live player within `hit_r`, drop spent ones.
    pub fn update(&mut self, dt: f32, world: &mut World, hit_r: f32) {
        let (w, h) = (world.w, world.h);
        let target = world.live_player().map(|p| (p.x, p.y));
        let mut damage_taken = 0.0;
        let mut hits = Vec::new();
        self.shots.retain_mut(|s| {
            s.t += dt;
            s.x += s.vx * dt;
            s.y += s.vy * dt;
            if let Some((px, py)) = target {
                if (s.x - px).powi(2) + (s.y - py).powi(2) <= hit_r * hit_r {
                    damage_taken += s.damage;
                    hits.push((s.x, s.y));
                    return false;
                }
            }
            s.t <= s.life && s.x >= -40.0 && s.x <= w + 40.0 && s.y >= -80.0 && s.y <= h + 80.0
        });
        for (x, y) in hits {
            world.fx.burst(ParticleKind::Damage, x, y, 0.6);
            world.fx.sound(Sound::Hit { big: false });
        }
        if damage_taken > 0.0 {
            if let Some(p) = world.live_player_mut() {
                p.take_damage(damage_taken);
            }
        }
    }
}
