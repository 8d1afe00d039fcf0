use ab_glyph::FontVec;
use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};

/// Tried in order when no font is given on the command line.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub fn load_font_file(path: &Path) -> Result<FontVec> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    FontVec::try_from_vec(bytes).with_context(|| format!("parsing font {}", path.display()))
}

/// Loads `path` if given, otherwise the first font found on the system.
pub fn load_font(path: Option<&Path>) -> Result<FontVec> {
    if let Some(path) = path {
        return load_font_file(path);
    }
    let found = FONT_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or_else(|| anyhow!("no system font found; pass one with --font"))?;
    tracing::info!(font = %found.display(), "using system font");
    load_font_file(&found)
}
