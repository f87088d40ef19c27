use std::collections::HashMap;

use glam::UVec2;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use super::{SpriteInfo, SpriteLibrary};
use crate::peep::direction::Direction;

/// Index of an extracted frame inside a [`FrameStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

/// A stored frame together with its (scaled) pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef {
    pub id: FrameId,
    pub size: UVec2,
}

/// Crop `info`'s region out of `sheet` onto a transparent canvas and scale it.
///
/// Parts of the region outside the sheet stay transparent.
pub fn extract_frame(sheet: &RgbaImage, info: &SpriteInfo, scale: f32) -> RgbaImage {
    let mut canvas = RgbaImage::new(info.width, info.height);

    // Clip the requested region to the sheet; the origin may be negative.
    let (sx, sy) = (info.sheet_x as i64, info.sheet_y as i64);
    let x0 = sx.max(0);
    let y0 = sy.max(0);
    let x1 = (sx + info.width as i64).min(sheet.width() as i64);
    let y1 = (sy + info.height as i64).min(sheet.height() as i64);
    if x1 > x0 && y1 > y0 {
        let region = imageops::crop_imm(
            sheet,
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        );
        imageops::replace(&mut canvas, &region.to_image(), x0 - sx, y0 - sy);
    }

    if (scale - 1.0).abs() <= f32::EPSILON {
        return canvas;
    }

    let w = ((info.width as f32 * scale) as u32).max(1);
    let h = ((info.height as f32 * scale) as u32).max(1);
    imageops::resize(&canvas, w, h, FilterType::Triangle)
}

/// Every frame extracted so far, memoised by sprite id.
pub struct FrameStore {
    scale: f32,
    frames: Vec<RgbaImage>,
    by_sprite: HashMap<u32, FrameRef>,
}

impl FrameStore {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            frames: Vec::new(),
            by_sprite: HashMap::new(),
        }
    }

    /// Extract (or reuse) the frame for `sprite_id`. `None` when the id or
    /// its sheet is unknown.
    pub fn frame_for(&mut self, library: &SpriteLibrary, sprite_id: u32) -> Option<FrameRef> {
        if let Some(frame) = self.by_sprite.get(&sprite_id) {
            return Some(*frame);
        }

        let info = library.table.get(sprite_id)?;
        let sheet = library.sheets.get(info.sheet)?;
        let img = extract_frame(sheet, info, self.scale);

        let frame = FrameRef {
            id: FrameId(self.frames.len() as u32),
            size: UVec2::new(img.width(), img.height()),
        };
        self.frames.push(img);
        self.by_sprite.insert(sprite_id, frame);
        Some(frame)
    }

    #[cfg(test)]
    pub fn get(&self, id: FrameId) -> Option<&RgbaImage> {
        self.frames.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in id order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &RgbaImage)> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, img)| (FrameId(i as u32), img))
    }
}

/// Walk-cycle frames for each of the four directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionFrames {
    frames: [Vec<FrameRef>; 4],
}

impl DirectionFrames {
    /// Sprite ids follow `base + direction + frame * 4`; ids that are not in
    /// the library leave their slot out.
    pub fn load(
        library: &SpriteLibrary,
        store: &mut FrameStore,
        base_id: u32,
        frames_per_direction: u32,
    ) -> Self {
        let mut out = Self::default();
        for dir in Direction::ALL {
            for frame in 0..frames_per_direction {
                let Some(sprite_id) = frame
                    .checked_mul(4)
                    .and_then(|f| f.checked_add(dir.index() as u32))
                    .and_then(|o| base_id.checked_add(o))
                else {
                    continue;
                };
                if let Some(f) = store.frame_for(library, sprite_id) {
                    out.frames[dir.index()].push(f);
                }
            }
        }
        out
    }

    pub fn get(&self, dir: Direction) -> &[FrameRef] {
        &self.frames[dir.index()]
    }

    pub fn total(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }

    /// Largest width and height over all frames (zero when empty).
    pub fn max_size(&self) -> UVec2 {
        self.frames
            .iter()
            .flatten()
            .fold(UVec2::ZERO, |acc, f| acc.max(f.size))
    }

    #[cfg(test)]
    pub fn from_lists(frames: [Vec<FrameRef>; 4]) -> Self {
        Self { frames }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sprite::sheet::SheetCache;
    use crate::sprite::SpriteTable;
    use image::Rgba;

    /// Library with a single 64x64 sheet 0 whose pixel (x, y) is `[x, y, 0, 255]`.
    pub(crate) fn library(rows: &str) -> SpriteLibrary {
        let table = SpriteTable::parse(rows);
        let mut sheets = SheetCache::default();
        sheets.insert(0, RgbaImage::from_fn(64, 64, |x, y| Rgba([x as u8, y as u8, 0, 255])));
        SpriteLibrary { table, sheets }
    }

    fn row(id: u32, w: u32, h: u32, sx: u32, sy: u32) -> String {
        format!("0,0,{id},0,{w},{h},0,0,0,{sx},{sy}\n")
    }

    #[test]
    fn crop_copies_the_sheet_region() {
        let lib = library(&row(1, 4, 3, 10, 20));
        let info = lib.table.get(1).unwrap();
        let img = extract_frame(lib.sheets.get(0).unwrap(), info, 1.0);

        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(*img.get_pixel(0, 0), Rgba([10, 20, 0, 255]));
        assert_eq!(*img.get_pixel(3, 2), Rgba([13, 22, 0, 255]));
    }

    #[test]
    fn crop_past_sheet_edge_is_transparent() {
        let lib = library(&row(1, 8, 8, 60, 60));
        let img = extract_frame(lib.sheets.get(0).unwrap(), lib.table.get(1).unwrap(), 1.0);

        assert_eq!(img.dimensions(), (8, 8));
        assert_eq!(img.get_pixel(3, 3)[3], 255);
        assert_eq!(*img.get_pixel(4, 4), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn crop_before_sheet_origin_is_transparent() {
        let lib = library("0,0,1,0,4,4,0,0,0,-2,-1\n");
        let img = extract_frame(lib.sheets.get(0).unwrap(), lib.table.get(1).unwrap(), 1.0);

        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*img.get_pixel(1, 3), Rgba([0, 0, 0, 0]));
        assert_eq!(*img.get_pixel(2, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(3, 3), Rgba([1, 2, 0, 255]));
    }

    #[test]
    fn crop_entirely_outside_sheet_is_blank() {
        let lib = library("0,0,1,0,4,4,0,0,0,-10,70\n");
        let img = extract_frame(lib.sheets.get(0).unwrap(), lib.table.get(1).unwrap(), 1.0);

        assert_eq!(img.dimensions(), (4, 4));
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn scaling_preserves_aspect_ratio() {
        let lib = library(&row(1, 10, 6, 0, 0));
        let sheet = lib.sheets.get(0).unwrap();
        let info = lib.table.get(1).unwrap();

        assert_eq!(extract_frame(sheet, info, 2.0).dimensions(), (20, 12));
        assert_eq!(extract_frame(sheet, info, 0.5).dimensions(), (5, 3));
        assert_eq!(extract_frame(sheet, info, 0.01).dimensions(), (1, 1));
    }

    #[test]
    fn store_reuses_frames_per_sprite() {
        let lib = library(&row(1, 4, 4, 0, 0));
        let mut store = FrameStore::new(1.0);

        let a = store.frame_for(&lib, 1).unwrap();
        let b = store.frame_for(&lib, 1).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert!(store.frame_for(&lib, 2).is_none());
    }

    #[test]
    fn direction_frames_use_base_plus_direction_plus_four_per_frame() {
        // base 200: direction d, frame f -> 200 + d + 4f
        let rows: String = [200, 204, 208, 201, 206, 210, 215]
            .iter()
            .map(|&id| row(id, 8, 8 + (id - 200), 0, 0))
            .collect();
        let lib = library(&rows);
        let mut store = FrameStore::new(1.0);

        let dirs = DirectionFrames::load(&lib, &mut store, 200, 5);

        let heights = |d: Direction| -> Vec<u32> { dirs.get(d).iter().map(|f| f.size.y).collect() };
        assert_eq!(heights(Direction::North), vec![8, 12, 16]);
        assert_eq!(heights(Direction::East), vec![9]);
        assert_eq!(heights(Direction::South), vec![14, 18]);
        // 215 = 200 + 3 + 4*3
        assert_eq!(heights(Direction::West), vec![23]);
        assert_eq!(dirs.total(), 7);
        assert_eq!(dirs.max_size(), UVec2::new(8, 23));
    }

    #[test]
    fn frames_beyond_frames_per_direction_are_ignored() {
        let lib = library(&(row(300, 8, 8, 0, 0) + &row(304, 8, 8, 0, 0)));
        let mut store = FrameStore::new(1.0);

        let dirs = DirectionFrames::load(&lib, &mut store, 300, 1);
        assert_eq!(dirs.get(Direction::North).len(), 1);
        assert_eq!(dirs.total(), 1);
    }

    #[test]
    fn single_row_scenario_fills_only_north() {
        let lib = library(&row(100, 32, 32, 0, 0));
        let mut store = FrameStore::new(1.0);

        let dirs = DirectionFrames::load(&lib, &mut store, 100, 1);
        assert_eq!(dirs.get(Direction::North).len(), 1);
        assert!(dirs.get(Direction::East).is_empty());
        assert!(dirs.get(Direction::South).is_empty());
        assert!(dirs.get(Direction::West).is_empty());
        assert_eq!(dirs.max_size(), UVec2::new(32, 32));
    }

    #[test]
    fn sprites_on_missing_sheets_are_skipped() {
        let rows = row(100, 8, 8, 0, 0) + "5,0,101,0,8,8,0,0,0,0,0\n";
        let lib = library(&rows);
        let mut store = FrameStore::new(1.0);

        let dirs = DirectionFrames::load(&lib, &mut store, 100, 1);
        assert_eq!(dirs.get(Direction::North).len(), 1);
        assert!(dirs.get(Direction::East).is_empty());
    }
}
