pub mod bounce;
pub mod present;
pub mod walk;

use glam::Vec2;

use crate::peep::animator::Millis;
use crate::surface::PresentationSurface;
use crate::util::rng::RandomSource;

/// Run all simulation systems for one fixed tick.
///
/// Every peep in the tick sees the same `now`.
pub fn tick<S, R>(world: &mut hecs::World, now: Millis, screen: Vec2, rng: &mut R, surface: &mut S)
where
    S: PresentationSurface + ?Sized,
    R: RandomSource + ?Sized,
{
    // 1. Animated peeps: frames, turns, walk, bounce-off-edges
    walk::update(world, now, screen, rng);

    // 2. Fallback squares: elastic bounce
    bounce::update(world, screen);

    // 3. Push positions and visuals to the surface
    present::sync(world, surface);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::SceneItem;
    use crate::peep::animator::{Animator, WalkSettings};
    use crate::peep::bounce::Bouncer;
    use crate::sprite::frames::{DirectionFrames, FrameId, FrameRef};
    use crate::surface::{RecordingSurface, Visual};
    use crate::util::rng::ScriptedRng;
    use glam::UVec2;

    #[test]
    fn tick_moves_every_peep_and_syncs_the_surface() {
        let screen = Vec2::new(800.0, 600.0);
        let mut world = hecs::World::new();
        let mut surface = RecordingSurface::default();

        let mut animator = Animator::new(WalkSettings::default());
        animator.set_frames(DirectionFrames::from_lists([
            vec![
                FrameRef { id: FrameId(0), size: UVec2::new(16, 16) },
                FrameRef { id: FrameId(1), size: UVec2::new(16, 16) },
            ],
            vec![],
            vec![],
            vec![],
        ]));
        animator.setup_walking(screen, Some(Vec2::new(100.0, 100.0)), 0, &mut ScriptedRng::new(&[0, 3000]));
        let walker_item = surface.place_item(Visual::Frame(FrameId(0)));
        world.spawn((animator, SceneItem(walker_item)));

        let bouncer = Bouncer {
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::new(2.0, -1.0),
            size: 64.0,
            color: 0xFFFF00FF,
        };
        let square_item = surface.place_item(Visual::Square { size: 64.0, color: 0xFFFF00FF });
        world.spawn((bouncer, SceneItem(square_item)));

        tick(&mut world, 100, screen, &mut ScriptedRng::new(&[]), &mut surface);

        assert_eq!(surface.items[0], (Vec2::new(101.0, 99.0), Visual::Frame(FrameId(1))));
        assert_eq!(surface.items[1].0, Vec2::new(12.0, 9.0));
        assert_eq!(surface.position_calls, 2);
    }
}
