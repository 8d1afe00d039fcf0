use ab_glyph::{Font, Glyph, PxScale, ScaleFont, point};
use std::collections::HashMap;
use std::sync::Arc;
use string_cache::DefaultAtom as Atom;
use stroop_core::Rgba;
use tiny_skia::{Pixmap, PremultipliedColorU8};

/// Rendered strings kept between frames. Cleared wholesale once it holds
/// `capacity` entries; a session only ever shows a few hundred distinct strings.
pub struct TextCache {
    map: HashMap<TextKey, Arc<Pixmap>>,
    capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TextKey {
    text: Atom,
    size_bits: u32,
    color: Rgba,
}

impl TextCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get_or_render<F: Font>(
        &mut self,
        font: &F,
        text: &str,
        size: f32,
        color: Rgba,
    ) -> Option<Arc<Pixmap>> {
        let key = TextKey {
            text: Atom::from(text),
            size_bits: size.to_bits(),
            color,
        };
        if let Some(pm) = self.map.get(&key) {
            return Some(Arc::clone(pm));
        }
        if self.map.len() >= self.capacity {
            tracing::debug!(entries = self.map.len(), "text cache full, clearing");
            self.map.clear();
        }
        let pm = Arc::new(render_text_pixmap(font, text, size, color)?);
        self.map.insert(key, Arc::clone(&pm));
        Some(pm)
    }
}

fn layout<F: Font>(font: &F, text: &str, size: f32) -> (Vec<Glyph>, f32) {
    let scale = PxScale::from(size);
    let sf = font.as_scaled(scale);

    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::with_capacity(text.len());
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }
    (glyphs, pen_x)
}

/// Advance width of `text` in pixels
pub fn text_width<F: Font>(font: &F, text: &str, size: f32) -> f32 {
    layout(font, text, size).1
}

/// Rasterizes one line of text. The pixmap spans the advance width and the
/// full ascent-to-descent height, so strings of different glyphs share a
/// baseline when centered the same way. `None` only for absurd sizes.
pub fn render_text_pixmap<F: Font>(
    font: &F,
    text: &str,
    size: f32,
    color: Rgba,
) -> Option<Pixmap> {
    let (glyphs, advance) = layout(font, text, size);
    let sf = font.as_scaled(PxScale::from(size));

    let w = advance.ceil().max(1.0) as u32;
    let h = sf.height().ceil().max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;

    let stride = w as usize;
    let dst = pm.pixels_mut();

    for g in glyphs {
        let Some(out) = font.outline_glyph(g) else {
            continue;
        };
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = x as i32 + b.min.x.floor() as i32;
            let iy = y as i32 + b.min.y.floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            // premultiplied source, then src-over onto what earlier glyphs left
            let a = (cov * color[3] as f32 / 255.0).clamp(0.0, 1.0);
            let sa = (a * 255.0).round();
            let [sr, sg, sb] = [color[0], color[1], color[2]].map(|c| (c as f32 * a).round());
            let bg = dst[i];
            let inv = 1.0 - sa / 255.0;
            let out_a = (sa + bg.alpha() as f32 * inv).round().min(255.0) as u8;
            let channel = |s: f32, d: u8| (s + d as f32 * inv).round().min(out_a as f32) as u8;

            if let Some(px) = PremultipliedColorU8::from_rgba(
                channel(sr, bg.red()),
                channel(sg, bg.green()),
                channel(sb, bg.blue()),
                out_a,
            ) {
                dst[i] = px;
            }
        });
    }

    Some(pm)
}

/// Greedy word wrap. Explicit newlines are kept, including blank lines;
/// a single word wider than `max_width` gets a line of its own.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure(&candidate) <= max_width {
                line = candidate;
            } else {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("the quick brown fox jumps", 10.0, chars);
        assert_eq!(lines, ["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn keeps_blank_lines_between_paragraphs() {
        let lines = wrap_text("Block 1 of 8\n\nPress SPACE", 40.0, chars);
        assert_eq!(lines, ["Block 1 of 8", "", "Press SPACE"]);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let lines = wrap_text("a incomprehensibilities b", 5.0, chars);
        assert_eq!(lines, ["a", "incomprehensibilities", "b"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", 100.0, chars), [""]);
    }
}
