use glam::Vec2;

use crate::peep::bounce::Bouncer;

/// Step every fallback square.
pub fn update(world: &mut hecs::World, screen: Vec2) {
    for (_, bouncer) in world.query_mut::<&mut Bouncer>() {
        bouncer.update(screen);
    }
}
