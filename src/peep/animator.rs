use glam::Vec2;

use super::direction::Direction;
use crate::sprite::frames::{DirectionFrames, FrameRef, FrameStore};
use crate::sprite::SpriteLibrary;
use crate::util::rng::RandomSource;

/// Milliseconds on the simulation clock.
pub type Millis = u64;

/// Tunables for the walk cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkSettings {
    /// Minimum time between frame advances.
    pub frame_duration_ms: Millis,
    /// Pixels moved per tick along each axis.
    pub move_speed: f32,
    /// Random direction changes are scheduled uniformly in this window.
    pub turn_min_ms: Millis,
    pub turn_max_ms: Millis,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            frame_duration_ms: 100,
            move_speed: 1.0,
            turn_min_ms: 1000,
            turn_max_ms: 3000,
        }
    }
}

/// Sprite-backed peep: walk-cycle frames plus a bounded random walk.
#[derive(Debug, Clone)]
pub struct Animator {
    frames: DirectionFrames,
    /// Largest frame size; the peep's footprint for edge checks.
    bounds: Vec2,
    direction: Direction,
    frame_index: usize,
    last_frame_ms: Millis,
    pos: Vec2,
    velocity: Vec2,
    walking: bool,
    next_turn_ms: Millis,
    settings: WalkSettings,
}

impl Animator {
    pub fn new(settings: WalkSettings) -> Self {
        Self {
            frames: DirectionFrames::default(),
            bounds: Vec2::ZERO,
            direction: Direction::North,
            frame_index: 0,
            last_frame_ms: 0,
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            walking: false,
            next_turn_ms: 0,
            settings,
        }
    }

    /// Pick one of `candidates` at random and load its walk cycle.
    /// Returns the chosen base id, or `None` when there were no candidates.
    pub fn load_direction_frames<R: RandomSource + ?Sized>(
        &mut self,
        library: &SpriteLibrary,
        store: &mut FrameStore,
        candidates: &[u32],
        frames_per_direction: u32,
        rng: &mut R,
    ) -> Option<u32> {
        if candidates.is_empty() {
            self.set_frames(DirectionFrames::default());
            return None;
        }
        let base = candidates[rng.index(candidates.len())];
        self.set_frames(DirectionFrames::load(library, store, base, frames_per_direction));
        Some(base)
    }

    /// Replace the walk cycle and recompute the footprint.
    pub fn set_frames(&mut self, frames: DirectionFrames) {
        self.bounds = frames.max_size().as_vec2();
        self.frames = frames;
        self.frame_index = 0;
    }

    /// Place the peep (randomly unless `start` is given), pick a heading and
    /// start walking.
    pub fn setup_walking<R: RandomSource + ?Sized>(
        &mut self,
        screen: Vec2,
        start: Option<Vec2>,
        now: Millis,
        rng: &mut R,
    ) {
        self.pos = match start {
            Some(p) => p,
            None => {
                let span = (screen - self.bounds).max(Vec2::ZERO);
                let x = rng.int_inclusive(0, span.x as i64);
                let y = rng.int_inclusive(0, span.y as i64);
                Vec2::new(x as f32, y as f32)
            }
        };
        self.set_direction(random_direction(rng));
        self.walking = true;
        self.last_frame_ms = now;
        self.schedule_turn(now, rng);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.velocity = direction.unit_velocity() * self.settings.move_speed;
    }

    /// Advance one tick: animate, maybe turn, move, bounce, clamp.
    pub fn update<R: RandomSource + ?Sized>(&mut self, now: Millis, screen: Vec2, rng: &mut R) {
        if !self.walking {
            return;
        }

        let count = self.frames.get(self.direction).len();
        if count > 0 && now.saturating_sub(self.last_frame_ms) >= self.settings.frame_duration_ms {
            self.frame_index = (self.frame_index + 1) % count;
            self.last_frame_ms = now;
        }

        if now >= self.next_turn_ms {
            self.set_direction(random_direction(rng));
            self.schedule_turn(now, rng);
        }

        self.pos += self.velocity;

        let max = screen - self.bounds;
        let outside = self.pos.x < 0.0 || self.pos.x > max.x || self.pos.y < 0.0 || self.pos.y > max.y;
        if outside {
            // Re-randomise only; the clamp below keeps the peep on screen.
            self.set_direction(random_direction(rng));
        }

        self.pos = self.pos.min(max).max(Vec2::ZERO);
    }

    fn schedule_turn<R: RandomSource + ?Sized>(&mut self, now: Millis, rng: &mut R) {
        let delay = rng.int_inclusive(
            self.settings.turn_min_ms as i64,
            self.settings.turn_max_ms as i64,
        );
        self.next_turn_ms = now + delay.max(0) as Millis;
    }

    /// Frame to draw for the current heading. The index wraps when the new
    /// heading has fewer frames than the previous one.
    pub fn current_frame(&self) -> Option<FrameRef> {
        let frames = self.frames.get(self.direction);
        if frames.is_empty() {
            return None;
        }
        Some(frames[self.frame_index % frames.len()])
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    #[cfg(test)]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[cfg(test)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[cfg(test)]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    #[cfg(test)]
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    #[cfg(test)]
    pub fn is_walking(&self) -> bool {
        self.walking
    }

    #[cfg(test)]
    pub fn next_turn_ms(&self) -> Millis {
        self.next_turn_ms
    }

    pub fn frames(&self) -> &DirectionFrames {
        &self.frames
    }
}

fn random_direction<R: RandomSource + ?Sized>(rng: &mut R) -> Direction {
    Direction::from_index(rng.index(Direction::ALL.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::frames::FrameId;
    use crate::util::rng::ScriptedRng;
    use glam::UVec2;

    fn frame(id: u32, w: u32, h: u32) -> FrameRef {
        FrameRef {
            id: FrameId(id),
            size: UVec2::new(w, h),
        }
    }

    /// North: 3 frames, East: 1 frame, South/West: none.
    fn animator() -> Animator {
        let mut a = Animator::new(WalkSettings::default());
        a.set_frames(DirectionFrames::from_lists([
            vec![frame(0, 32, 48), frame(1, 32, 48), frame(2, 32, 48)],
            vec![frame(3, 30, 40)],
            vec![],
            vec![],
        ]));
        a
    }

    const SCREEN: Vec2 = Vec2::new(1000.0, 800.0);

    #[test]
    fn bounds_are_the_largest_frame() {
        assert_eq!(animator().bounds(), Vec2::new(32.0, 48.0));
    }

    #[test]
    fn load_picks_a_candidate_and_fills_directions() {
        let lib = crate::sprite::frames::tests::library(
            "0,0,100,0,32,32,0,0,0,0,0\n0,0,200,0,16,16,0,0,0,0,0\n",
        );
        let mut store = FrameStore::new(1.0);
        let mut a = Animator::new(WalkSettings::default());

        let base = a.load_direction_frames(&lib, &mut store, &[100, 200], 1, &mut ScriptedRng::new(&[1]));
        assert_eq!(base, Some(200));
        assert_eq!(a.frames().total(), 1);
        assert_eq!(a.bounds(), Vec2::new(16.0, 16.0));

        let none = a.load_direction_frames(&lib, &mut store, &[], 1, &mut ScriptedRng::new(&[]));
        assert_eq!(none, None);
        assert_eq!(a.bounds(), Vec2::ZERO);
    }

    #[test]
    fn setup_places_footprint_inside_screen() {
        let mut a = animator();
        // x, y, direction, turn delay
        let mut rng = ScriptedRng::new(&[5000, 5000, 2, 1500]);
        a.setup_walking(SCREEN, None, 10_000, &mut rng);

        assert_eq!(a.position(), Vec2::new(968.0, 752.0));
        assert_eq!(a.direction(), Direction::South);
        assert_eq!(a.velocity(), Vec2::new(-1.0, 1.0));
        assert_eq!(a.next_turn_ms(), 11_500);
        assert!(a.is_walking());
    }

    #[test]
    fn setup_honours_explicit_start() {
        let mut a = animator();
        a.setup_walking(SCREEN, Some(Vec2::new(12.0, 34.0)), 0, &mut ScriptedRng::new(&[1, 2000]));
        assert_eq!(a.position(), Vec2::new(12.0, 34.0));
        assert_eq!(a.direction(), Direction::East);
    }

    #[test]
    fn setup_on_tiny_screen_pins_to_origin() {
        let mut a = animator();
        a.setup_walking(Vec2::new(10.0, 10.0), None, 0, &mut ScriptedRng::new(&[7, 7, 0, 1000]));
        assert_eq!(a.position(), Vec2::ZERO);

        a.update(16, Vec2::new(10.0, 10.0), &mut ScriptedRng::new(&[]));
        assert_eq!(a.position(), Vec2::ZERO);
    }

    #[test]
    fn update_is_a_no_op_until_walking() {
        let mut a = animator();
        a.update(1000, SCREEN, &mut ScriptedRng::new(&[]));
        assert_eq!(a.position(), Vec2::ZERO);
        assert_eq!(a.frame_index(), 0);
    }

    #[test]
    fn frames_advance_once_per_duration_and_wrap() {
        let mut a = animator();
        a.setup_walking(SCREEN, Some(Vec2::new(500.0, 400.0)), 0, &mut ScriptedRng::new(&[0, 3000]));

        let mut rng = ScriptedRng::new(&[]);
        let mut seen = Vec::new();
        for now in [50, 100, 150, 199, 200, 250, 300, 399, 400] {
            a.update(now, SCREEN, &mut rng);
            seen.push(a.frame_index());
        }
        assert_eq!(seen, vec![0, 1, 1, 1, 2, 2, 0, 0, 1]);
        assert_eq!(a.direction(), Direction::North);
    }

    #[test]
    fn direction_without_frames_does_not_animate() {
        let mut a = animator();
        a.setup_walking(SCREEN, Some(Vec2::new(500.0, 400.0)), 0, &mut ScriptedRng::new(&[3, 3000]));
        a.update(500, SCREEN, &mut ScriptedRng::new(&[]));

        assert_eq!(a.direction(), Direction::West);
        assert_eq!(a.frame_index(), 0);
        assert_eq!(a.current_frame(), None);
    }

    #[test]
    fn frame_index_wraps_into_shorter_direction() {
        let mut a = animator();
        a.setup_walking(SCREEN, Some(Vec2::new(500.0, 400.0)), 0, &mut ScriptedRng::new(&[0, 3000]));
        a.update(100, SCREEN, &mut ScriptedRng::new(&[]));
        a.update(200, SCREEN, &mut ScriptedRng::new(&[]));
        assert_eq!(a.frame_index(), 2);

        a.set_direction(Direction::East);
        assert_eq!(a.current_frame().map(|f| f.id), Some(FrameId(3)));
    }

    #[test]
    fn scheduled_turn_picks_new_direction_and_reschedules() {
        let mut a = animator();
        a.setup_walking(SCREEN, Some(Vec2::new(500.0, 400.0)), 0, &mut ScriptedRng::new(&[0, 1000]));

        a.update(999, SCREEN, &mut ScriptedRng::new(&[]));
        assert_eq!(a.direction(), Direction::North);

        a.update(1000, SCREEN, &mut ScriptedRng::new(&[2, 2500]));
        assert_eq!(a.direction(), Direction::South);
        assert_eq!(a.next_turn_ms(), 3500);
    }

    #[test]
    fn turn_schedule_is_always_one_to_three_seconds_ahead() {
        let mut a = animator();
        let mut rng = fastrand::Rng::with_seed(9);
        a.setup_walking(SCREEN, None, 0, &mut rng);

        let mut now = 0;
        for _ in 0..5000 {
            now += 16;
            let before = a.next_turn_ms();
            a.update(now, SCREEN, &mut rng);
            if a.next_turn_ms() != before {
                assert!(a.next_turn_ms() > now);
                assert!(a.next_turn_ms() >= now + 1000 && a.next_turn_ms() <= now + 3000);
            }
        }
    }

    #[test]
    fn position_integrates_velocity_per_tick() {
        let mut a = Animator::new(WalkSettings {
            move_speed: 0.5,
            ..WalkSettings::default()
        });
        a.set_frames(animator().frames().clone());
        a.setup_walking(SCREEN, Some(Vec2::new(100.0, 100.0)), 0, &mut ScriptedRng::new(&[1, 3000]));

        let mut rng = ScriptedRng::new(&[]);
        for now in 1..=4 {
            a.update(now, SCREEN, &mut rng);
        }
        assert_eq!(a.position(), Vec2::new(102.0, 102.0));
    }

    #[test]
    fn leaving_the_screen_rerandomises_direction_and_clamps() {
        let mut a = animator();
        // North moves up; starting on the top edge pushes y negative.
        a.setup_walking(SCREEN, Some(Vec2::new(10.0, 0.0)), 0, &mut ScriptedRng::new(&[0, 3000]));

        a.update(16, SCREEN, &mut ScriptedRng::new(&[1]));
        assert_eq!(a.direction(), Direction::East);
        assert_eq!(a.position(), Vec2::new(11.0, 0.0));
        // No reflection: the new velocity is just the new heading's.
        assert_eq!(a.velocity(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn bounce_may_repeat_the_same_direction() {
        let mut a = animator();
        let max = SCREEN - a.bounds();
        a.setup_walking(SCREEN, Some(max), 0, &mut ScriptedRng::new(&[1, 3000]));

        a.update(16, SCREEN, &mut ScriptedRng::new(&[1]));
        assert_eq!(a.direction(), Direction::East);
        assert_eq!(a.position(), max);
    }

    #[test]
    fn clamp_invariant_holds_over_long_walks() {
        let screen = Vec2::new(320.0, 200.0);
        let mut rng = fastrand::Rng::with_seed(1234);
        let mut a = animator();
        a.setup_walking(screen, None, 0, &mut rng);

        let max = screen - a.bounds();
        for tick in 1..=20_000u64 {
            a.update(tick * 16, screen, &mut rng);
            let p = a.position();
            assert!(p.x >= 0.0 && p.x <= max.x, "x out of range at tick {tick}: {p}");
            assert!(p.y >= 0.0 && p.y <= max.y, "y out of range at tick {tick}: {p}");
        }
    }
}
