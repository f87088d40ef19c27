use image::imageops;
use image::{Rgba, RgbaImage};

use crate::sprite::frames::{FrameId, FrameStore};

/// Padding between packed frames, in pixels.
const PADDING: u32 = 1;

/// Where a frame lives inside the atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    /// Pixel rect: x, y, width, height.
    pub rect: [u32; 4],
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

/// All sprite frames packed into one RGBA image for a single GPU texture.
pub struct Atlas {
    pub image: RgbaImage,
    regions: Vec<AtlasRegion>,
}

impl Atlas {
    /// Shelf-pack every frame in id order into rows at most `max_width` wide.
    /// An empty store produces a 1x1 white atlas.
    pub fn pack(store: &FrameStore, max_width: u32) -> Self {
        if store.is_empty() {
            return Self {
                image: RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])),
                regions: Vec::new(),
            };
        }

        let mut rects = Vec::with_capacity(store.len());
        let (mut x, mut y, mut shelf_h) = (0u32, 0u32, 0u32);
        let mut width = 1u32;

        for (_, img) in store.iter() {
            let (w, h) = img.dimensions();
            if x > 0 && x + w > max_width {
                x = 0;
                y += shelf_h;
                shelf_h = 0;
            }
            rects.push([x, y, w, h]);
            width = width.max(x + w);
            x += w + PADDING;
            shelf_h = shelf_h.max(h + PADDING);
        }
        let height = (y + shelf_h).max(1);

        let mut image = RgbaImage::new(width, height);
        for ((_, img), rect) in store.iter().zip(&rects) {
            imageops::replace(&mut image, img, rect[0] as i64, rect[1] as i64);
        }

        let (fw, fh) = (width as f32, height as f32);
        let regions = rects
            .into_iter()
            .map(|[x, y, w, h]| AtlasRegion {
                rect: [x, y, w, h],
                uv_min: [x as f32 / fw, y as f32 / fh],
                uv_max: [(x + w) as f32 / fw, (y + h) as f32 / fh],
            })
            .collect();

        log::info!("Packed {} frames into a {}x{} atlas", store.len(), width, height);
        Self { image, regions }
    }

    pub fn region(&self, id: FrameId) -> Option<&AtlasRegion> {
        self.regions.get(id.0 as usize)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.regions.len()
    }
}
