use glam::Vec2;

use crate::peep::animator::{Animator, Millis};
use crate::util::rng::RandomSource;

/// Step every sprite-backed peep.
pub fn update<R: RandomSource + ?Sized>(
    world: &mut hecs::World,
    now: Millis,
    screen: Vec2,
    rng: &mut R,
) {
    for (_, animator) in world.query_mut::<&mut Animator>() {
        animator.update(now, screen, rng);
    }
}
