//! Template bank: the fixed, ordered set of known marker patterns.

use std::fs;
use std::path::{Path, PathBuf};

/// Errors surfaced while loading a template bank at startup.
#[derive(thiserror::Error, Debug)]
pub enum BankError {
    #[error("template directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("template image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// One known marker pattern.
///
/// `cells` lists the grid positions that must be background (bit 0) in a
/// sampled matrix for this template's identity to remain plausible. The
/// coordinates are in the template's local frame; the matcher offsets
/// them by (+3, +3) into the 11x11 grid, so a 5x5 template covers the
/// marker interior.
#[derive(Clone, Debug)]
pub struct Template {
    pub cells: Vec<(i32, i32)>, // (x, y)
}

/// Fixed-order, immutable collection of templates.
///
/// Identity indices are meaningful only together with the bank's load
/// order, so the loader sorts by file name instead of relying on
/// filesystem iteration order.
#[derive(Clone, Debug, Default)]
pub struct TemplateBank {
    templates: Vec<Template>,
    names: Vec<String>,
}

impl TemplateBank {
    /// Load every image file in `dir`, in lexicographic file-name order.
    ///
    /// Black pixels (value 0) of each image become one template's cell
    /// set. An unreadable directory or an undecodable image is an error;
    /// an empty directory yields an empty bank, which callers should
    /// surface at startup (every decode will then find no identity).
    pub fn load_dir(dir: &Path) -> Result<Self, BankError> {
        let io_err = |source| BankError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut bank = Self::default();
        for path in paths {
            let img = image::open(&path)
                .map_err(|source| BankError::Image {
                    path: path.clone(),
                    source,
                })?
                .to_luma8();

            let mut cells = Vec::new();
            for (x, y, px) in img.enumerate_pixels() {
                if px[0] == 0 {
                    cells.push((x as i32, y as i32));
                }
            }
            bank.templates.push(Template { cells });
            bank.names.push(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }

        log::info!("loaded {} marker template(s) from {}", bank.len(), dir.display());
        Ok(bank)
    }

    /// Build a bank from in-memory cell sets (synthetic banks in tests).
    pub fn from_cells(cell_sets: Vec<Vec<(i32, i32)>>) -> Self {
        let names = (0..cell_sets.len()).map(|i| format!("#{i}")).collect();
        let templates = cell_sets.into_iter().map(|cells| Template { cells }).collect();
        Self { templates, names }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// File name the identity was loaded from, for logs and stdout.
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}
