pub mod frames;
pub mod sheet;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use self::sheet::{AssetError, AssetSource, SheetCache};

/// Sprite width/height must be strictly below this.
pub const MAX_SPRITE_DIM: u32 = 4096;

/// Minimum number of comma-separated fields in a metadata row.
const MIN_FIELDS: usize = 11;

/// One sprite record from the `.nfo` metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteInfo {
    pub sheet: i32,
    pub index: i32,
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Top-left corner of the sprite inside its sheet. May lie outside it.
    pub sheet_x: i32,
    pub sheet_y: i32,
}

/// Errors that make the sprite library unusable (peeps fall back to squares).
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("could not read sprite metadata {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no valid sprite rows in {}", path.display())]
    NoValidRows { path: PathBuf },
    #[error("could not load sprite sheet {sheet}: {source}")]
    Sheet {
        sheet: i32,
        #[source]
        source: AssetError,
    },
}

/// Why a single metadata row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("expected at least 11 fields, found {0}")]
    TooFewFields(usize),
    #[error("field {index} is not a valid integer: {value:?}")]
    BadField { index: usize, value: String },
    #[error("size {width}x{height} out of range")]
    BadSize { width: i64, height: i64 },
}

impl SpriteInfo {
    /// Parse one metadata row:
    /// `sheet, index, id, _, width, height, x_off, y_off, _, sheet_x, sheet_y, ...`
    pub fn parse_row(line: &str) -> Result<Self, RowError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < MIN_FIELDS {
            return Err(RowError::TooFewFields(fields.len()));
        }

        fn field<T: std::str::FromStr>(fields: &[&str], index: usize) -> Result<T, RowError> {
            fields[index].parse().map_err(|_| RowError::BadField {
                index,
                value: fields[index].to_string(),
            })
        }

        let width: i64 = field(&fields, 4)?;
        let height: i64 = field(&fields, 5)?;
        let limit = MAX_SPRITE_DIM as i64;
        if !(1..limit).contains(&width) || !(1..limit).contains(&height) {
            return Err(RowError::BadSize { width, height });
        }

        Ok(Self {
            sheet: field(&fields, 0)?,
            index: field(&fields, 1)?,
            id: field(&fields, 2)?,
            width: width as u32,
            height: height as u32,
            x_offset: field(&fields, 6)?,
            y_offset: field(&fields, 7)?,
            sheet_x: field(&fields, 9)?,
            sheet_y: field(&fields, 10)?,
        })
    }
}

/// Sprite metadata keyed by sprite id.
#[derive(Debug, Default, Clone)]
pub struct SpriteTable {
    sprites: HashMap<u32, SpriteInfo>,
    skipped: usize,
}

impl SpriteTable {
    /// Parse metadata text. Comment lines (`#`) and blank lines are ignored;
    /// malformed rows are counted and skipped. Later duplicates win.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::default();

        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            match SpriteInfo::parse_row(line) {
                Ok(info) => {
                    table.sprites.insert(info.id, info);
                }
                Err(e) => {
                    log::debug!("Skipping metadata line {}: {e}", line_no + 1);
                    table.skipped += 1;
                }
            }
        }

        table
    }

    /// Read and parse a metadata file. Fails when the file is missing or
    /// contains no usable rows.
    pub fn load(path: &Path) -> Result<Self, SpriteError> {
        let text = std::fs::read_to_string(path).map_err(|source| SpriteError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::parse(&text);
        if table.is_empty() {
            return Err(SpriteError::NoValidRows {
                path: path.to_path_buf(),
            });
        }

        log::info!(
            "Loaded {} sprite records from {} ({} rows skipped)",
            table.len(),
            path.display(),
            table.skipped(),
        );
        Ok(table)
    }

    pub fn get(&self, id: u32) -> Option<&SpriteInfo> {
        self.sprites.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Number of non-comment rows rejected during parsing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Distinct sheet numbers referenced by any sprite, ascending.
    pub fn sheet_numbers(&self) -> BTreeSet<i32> {
        self.sprites.values().map(|s| s.sheet).collect()
    }
}

/// Metadata plus every sheet it references. Loaded once, shared by all peeps.
pub struct SpriteLibrary {
    pub table: SpriteTable,
    pub sheets: SheetCache,
}

impl SpriteLibrary {
    pub fn load<A: AssetSource>(metadata: &Path, assets: &A) -> Result<Self, SpriteError> {
        let table = SpriteTable::load(metadata)?;
        let sheets = SheetCache::load_all(&table, assets)?;
        Ok(Self { table, sheets })
    }
}
