use glam::Vec2;

use super::atlas::Atlas;
use super::instance::SpriteInstance;
use crate::surface::{ItemId, PresentationSurface, Visual};

#[derive(Debug, Clone, Copy)]
struct SceneEntry {
    pos: Vec2,
    visual: Visual,
}

/// Retained list of drawn items, turned into GPU instances each frame.
#[derive(Default)]
pub struct Scene {
    entries: Vec<SceneEntry>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rebuild `out` with one instance per visible item, in placement order.
    pub fn build_instances(&self, atlas: &Atlas, out: &mut Vec<SpriteInstance>) {
        out.clear();
        for entry in &self.entries {
            let position = entry.pos.to_array();
            match entry.visual {
                Visual::Frame(id) => {
                    let Some(region) = atlas.region(id) else {
                        continue;
                    };
                    let size = [region.rect[2] as f32, region.rect[3] as f32];
                    out.push(SpriteInstance::textured(position, size, region.uv_min, region.uv_max));
                }
                Visual::Square { size, color } => {
                    out.push(SpriteInstance::solid(position, [size, size], color));
                }
                Visual::Hidden => {}
            }
        }
    }
}

impl PresentationSurface for Scene {
    fn place_item(&mut self, visual: Visual) -> ItemId {
        self.entries.push(SceneEntry {
            pos: Vec2::ZERO,
            visual,
        });
        ItemId(self.entries.len() as u32 - 1)
    }

    fn set_position(&mut self, item: ItemId, pos: Vec2) {
        if let Some(entry) = self.entries.get_mut(item.0 as usize) {
            entry.pos = pos;
        }
    }

    fn set_visual(&mut self, item: ItemId, visual: Visual) {
        if let Some(entry) = self.entries.get_mut(item.0 as usize) {
            entry.visual = visual;
        }
    }
}
