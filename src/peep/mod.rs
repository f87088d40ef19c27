pub mod animator;
pub mod bounce;
pub mod direction;

use glam::Vec2;

use self::animator::{Animator, Millis, WalkSettings};
use self::bounce::Bouncer;
use crate::ecs::components::SceneItem;
use crate::sprite::frames::FrameStore;
use crate::sprite::SpriteLibrary;
use crate::surface::{PresentationSurface, Visual};
use crate::util::rng::RandomSource;

/// Everything needed to create peeps, resolved from the config.
#[derive(Debug, Clone, PartialEq)]
pub struct PeepSettings {
    pub count: usize,
    pub base_sprite_ids: Vec<u32>,
    pub frames_per_direction: u32,
    pub walk: WalkSettings,
    /// Fallback square edge in pixels (already scaled).
    pub fallback_size: f32,
    /// RGBA packed as u32.
    pub fallback_color: u32,
}

/// How many peeps of each kind were spawned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub animated: usize,
    pub fallback: usize,
}

/// Spawn `settings.count` peeps and place each on the surface.
///
/// With a library, every peep loads its own random walk cycle; a peep whose
/// base id yields no frames, or every peep when there is no library, becomes
/// a fallback square.
pub fn spawn_peeps<S, R>(
    world: &mut hecs::World,
    surface: &mut S,
    store: &mut FrameStore,
    library: Option<&SpriteLibrary>,
    settings: &PeepSettings,
    screen: Vec2,
    now: Millis,
    rng: &mut R,
) -> SpawnReport
where
    S: PresentationSurface + ?Sized,
    R: RandomSource + ?Sized,
{
    let mut report = SpawnReport::default();

    for _ in 0..settings.count {
        if let Some(library) = library {
            let mut animator = Animator::new(settings.walk);
            let base = animator.load_direction_frames(
                library,
                store,
                &settings.base_sprite_ids,
                settings.frames_per_direction,
                rng,
            );

            if animator.frames().total() > 0 {
                animator.setup_walking(screen, None, now, rng);
                let visual = animator
                    .current_frame()
                    .map_or(Visual::Hidden, |f| Visual::Frame(f.id));
                let item = surface.place_item(visual);
                surface.set_position(item, animator.position());
                world.spawn((animator, SceneItem(item)));
                report.animated += 1;
                continue;
            }

            log::warn!("Base sprite {base:?} has no frames, using fallback square");
        }

        let bouncer = Bouncer::spawn(screen, settings.fallback_size, settings.fallback_color, rng);
        let item = surface.place_item(Visual::Square {
            size: bouncer.size,
            color: bouncer.color,
        });
        surface.set_position(item, bouncer.pos);
        world.spawn((bouncer, SceneItem(item)));
        report.fallback += 1;
    }

    report
}
