use glam::Vec2;

use crate::sprite::frames::FrameId;

/// Handle to one item placed on a [`PresentationSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u32);

/// What an item looks like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visual {
    /// A stored sprite frame at its native (scaled) size.
    Frame(FrameId),
    /// A solid square, RGBA packed as u32.
    Square { size: f32, color: u32 },
    Hidden,
}

/// Where peeps get drawn. Keeps the simulation free of any windowing code.
pub trait PresentationSurface {
    fn place_item(&mut self, visual: Visual) -> ItemId;
    /// Top-left corner in screen pixels.
    fn set_position(&mut self, item: ItemId, pos: Vec2);
    fn set_visual(&mut self, item: ItemId, visual: Visual);
}

/// Records every call, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSurface {
    pub items: Vec<(Vec2, Visual)>,
    pub position_calls: usize,
    pub visual_calls: usize,
}

#[cfg(test)]
impl PresentationSurface for RecordingSurface {
    fn place_item(&mut self, visual: Visual) -> ItemId {
        self.items.push((Vec2::ZERO, visual));
        ItemId(self.items.len() as u32 - 1)
    }

    fn set_position(&mut self, item: ItemId, pos: Vec2) {
        self.position_calls += 1;
        self.items[item.0 as usize].0 = pos;
    }

    fn set_visual(&mut self, item: ItemId, visual: Visual) {
        self.visual_calls += 1;
        self.items[item.0 as usize].1 = visual;
    }
}
