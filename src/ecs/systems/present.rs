use crate::ecs::components::SceneItem;
use crate::peep::animator::Animator;
use crate::peep::bounce::Bouncer;
use crate::surface::{PresentationSurface, Visual};

/// Copy positions and current frames onto the surface.
///
/// An animated peep whose heading has no frames keeps its previous visual.
pub fn sync<S: PresentationSurface + ?Sized>(world: &hecs::World, surface: &mut S) {
    for (_, (animator, item)) in world.query::<(&Animator, &SceneItem)>().iter() {
        if let Some(frame) = animator.current_frame() {
            surface.set_visual(item.0, Visual::Frame(frame.id));
        }
        surface.set_position(item.0, animator.position());
    }

    for (_, (bouncer, item)) in world.query::<(&Bouncer, &SceneItem)>().iter() {
        surface.set_position(item.0, bouncer.pos);
    }
}
