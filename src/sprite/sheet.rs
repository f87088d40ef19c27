use std::collections::HashMap;
use std::path::PathBuf;

use image::RgbaImage;

use super::{SpriteError, SpriteTable};

/// Failure to produce an image for a named asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Loads images by file name.
pub trait AssetSource {
    fn load_image(&self, name: &str) -> Result<RgbaImage, AssetError>;
}

/// Reads PNG assets from a directory on disk.
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsAssets {
    fn load_image(&self, name: &str) -> Result<RgbaImage, AssetError> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(AssetError::NotFound(path));
        }
        let img = image::open(&path).map_err(|source| AssetError::Decode { path, source })?;
        Ok(img.into_rgba8())
    }
}

/// File name of the sheet bitmap for `sheet`.
pub fn sheet_file_name(sheet: i32) -> String {
    format!("sprite_{sheet}.png")
}

/// Decoded sprite sheets keyed by sheet number.
#[derive(Default)]
pub struct SheetCache {
    sheets: HashMap<i32, RgbaImage>,
}

impl SheetCache {
    /// Load one image per sheet referenced by `table`. Stops at the first
    /// sheet that cannot be loaded.
    pub fn load_all<A: AssetSource>(table: &SpriteTable, assets: &A) -> Result<Self, SpriteError> {
        let mut cache = Self::default();
        for sheet in table.sheet_numbers() {
            let img = assets
                .load_image(&sheet_file_name(sheet))
                .map_err(|source| SpriteError::Sheet { sheet, source })?;
            log::debug!("Loaded sheet {sheet} ({}x{})", img.width(), img.height());
            cache.sheets.insert(sheet, img);
        }
        Ok(cache)
    }

    pub fn get(&self, sheet: i32) -> Option<&RgbaImage> {
        self.sheets.get(&sheet)
    }

    #[cfg(test)]
    pub fn insert(&mut self, sheet: i32, img: RgbaImage) {
        self.sheets.insert(sheet, img);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }
}

/// In-memory assets for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryAssets {
    pub images: HashMap<String, RgbaImage>,
}

#[cfg(test)]
impl AssetSource for MemoryAssets {
    fn load_image(&self, name: &str) -> Result<RgbaImage, AssetError> {
        self.images
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(PathBuf::from(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn table_with_sheets(sheets: &[i32]) -> SpriteTable {
        let text: String = sheets
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{s},0,{i},0,8,8,0,0,0,0,0\n"))
            .collect();
        SpriteTable::parse(&text)
    }

    #[test]
    fn sheet_names_follow_convention() {
        assert_eq!(sheet_file_name(0), "sprite_0.png");
        assert_eq!(sheet_file_name(42), "sprite_42.png");
    }

    #[test]
    fn loads_each_referenced_sheet_once() {
        let mut assets = MemoryAssets::default();
        assets.images.insert("sprite_0.png".into(), RgbaImage::new(16, 16));
        assets.images.insert("sprite_3.png".into(), RgbaImage::new(8, 4));

        let cache = SheetCache::load_all(&table_with_sheets(&[0, 3, 3]), &assets).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(3).map(|s| s.dimensions()), Some((8, 4)));
    }

    #[test]
    fn one_missing_sheet_fails_the_whole_load() {
        let mut assets = MemoryAssets::default();
        assets.images.insert("sprite_0.png".into(), RgbaImage::new(16, 16));

        let err = SheetCache::load_all(&table_with_sheets(&[0, 1]), &assets).err().unwrap();
        assert!(matches!(err, SpriteError::Sheet { sheet: 1, .. }));
    }

    #[test]
    fn fs_assets_decode_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut img = RgbaImage::new(4, 2);
        img.put_pixel(3, 1, Rgba([10, 20, 30, 255]));
        img.save(dir.path().join("sprite_7.png")).unwrap();

        let assets = FsAssets::new(dir.path());
        let loaded = assets.load_image(&sheet_file_name(7)).unwrap();
        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(*loaded.get_pixel(3, 1), Rgba([10, 20, 30, 255]));

        assert!(matches!(
            assets.load_image("sprite_8.png"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn fs_assets_report_undecodable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sprite_0.png"), b"not a png").unwrap();

        let assets = FsAssets::new(dir.path());
        assert!(matches!(
            assets.load_image("sprite_0.png"),
            Err(AssetError::Decode { .. })
        ));
    }
}
