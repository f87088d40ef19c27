use glam::Vec2;

use crate::util::rng::RandomSource;

/// Per-axis speeds a fallback square can start with.
const SPEEDS: [f32; 4] = [-2.0, -1.0, 1.0, 2.0];

/// Fallback peep: a solid square with elastic wall bounces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bouncer {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// RGBA packed as u32.
    pub color: u32,
}

impl Bouncer {
    /// Random position fully inside the screen and a random speed per axis.
    pub fn spawn<R: RandomSource + ?Sized>(screen: Vec2, size: f32, color: u32, rng: &mut R) -> Self {
        let span = (screen - Vec2::splat(size)).max(Vec2::ZERO);
        let pos = Vec2::new(
            rng.int_inclusive(0, span.x as i64) as f32,
            rng.int_inclusive(0, span.y as i64) as f32,
        );
        let vel = Vec2::new(SPEEDS[rng.index(SPEEDS.len())], SPEEDS[rng.index(SPEEDS.len())]);
        Self {
            pos,
            vel,
            size,
            color,
        }
    }

    /// Move one tick. A velocity component flips when the square has crossed
    /// that axis' bound and is still heading outward.
    pub fn update(&mut self, screen: Vec2) {
        self.pos += self.vel;

        if (self.pos.x < 0.0 && self.vel.x < 0.0)
            || (self.pos.x + self.size > screen.x && self.vel.x > 0.0)
        {
            self.vel.x = -self.vel.x;
        }
        if (self.pos.y < 0.0 && self.vel.y < 0.0)
            || (self.pos.y + self.size > screen.y && self.vel.y > 0.0)
        {
            self.vel.y = -self.vel.y;
        }
    }
}
