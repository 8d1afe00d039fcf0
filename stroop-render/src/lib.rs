mod font;
mod render;
mod text;

pub use font::{FONT_SEARCH_PATHS, load_font, load_font_file};
pub use render::{SkiaRenderer, blit_centered, draw_color_block, draw_fixation};
pub use ab_glyph::FontVec;
pub use text::{TextCache, render_text_pixmap, text_width, wrap_text};
