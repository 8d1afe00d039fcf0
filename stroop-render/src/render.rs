use crate::text::{TextCache, text_width, wrap_text};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{Result, bail};
use stroop_core::{Rgba, Stimulus};
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

const TEXT_CACHE_CAPACITY: usize = 512;

fn skia_color(c: Rgba) -> Color {
    Color::from_rgba8(c[0], c[1], c[2], c[3])
}

/// Draws one `Stimulus` per frame into an offscreen canvas and copies it
/// into the window's RGBA frame buffer.
pub struct SkiaRenderer<F: Font = FontVec> {
    width: u32,
    height: u32,
    center: (f32, f32),
    font: F,
    text_cache: TextCache,
    canvas: Pixmap,
}

impl<F: Font> SkiaRenderer<F> {
    pub fn new(width: u32, height: u32, font: F) -> Result<Self> {
        let Some(canvas) = Pixmap::new(width.max(1), height.max(1)) else {
            bail!("cannot allocate a {width}x{height} canvas");
        };
        Ok(Self {
            width: canvas.width(),
            height: canvas.height(),
            center: (canvas.width() as f32 / 2.0, canvas.height() as f32 / 2.0),
            font,
            text_cache: TextCache::new(TEXT_CACHE_CAPACITY),
            canvas,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        let Some(canvas) = Pixmap::new(new_width.max(1), new_height.max(1)) else {
            bail!("cannot allocate a {new_width}x{new_height} canvas");
        };
        self.width = canvas.width();
        self.height = canvas.height();
        self.center = (self.width as f32 / 2.0, self.height as f32 / 2.0);
        self.canvas = canvas;
        Ok(())
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    /// Draws `stimulus` on a cleared canvas without presenting it.
    pub fn draw(&mut self, stimulus: &Stimulus, background: Rgba) {
        self.canvas.fill(skia_color(background));
        let center = self.center;

        match stimulus {
            Stimulus::Blank => {}
            Stimulus::Fixation { size, color } => {
                draw_fixation(&mut self.canvas, center, *size, *color);
            }
            Stimulus::ColorBlock {
                width,
                height,
                color,
            } => draw_color_block(&mut self.canvas, center, (*width, *height), *color),
            Stimulus::Text {
                content,
                size,
                color,
            } => {
                if let Some(pm) = self
                    .text_cache
                    .get_or_render(&self.font, content, *size, *color)
                {
                    blit_centered(&mut self.canvas, &pm, center);
                }
            }
            Stimulus::Message {
                content,
                size,
                wrap_width,
                color,
            } => self.draw_message(content, *size, *wrap_width, *color),
        }
    }

    fn draw_message(&mut self, content: &str, size: f32, wrap_width: f32, color: Rgba) {
        let font = &self.font;
        let lines = wrap_text(content, wrap_width, |s| text_width(font, s, size));

        let sf = font.as_scaled(PxScale::from(size));
        let line_height = sf.height() + sf.line_gap();
        let top = self.center.1 - line_height * lines.len() as f32 / 2.0;

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let Some(pm) = self.text_cache.get_or_render(&self.font, line, size, color) else {
                continue;
            };
            let y = top + line_height * (i as f32 + 0.5);
            blit_centered(&mut self.canvas, &pm, (self.center.0, y));
        }
    }

    /// Draws `stimulus` and copies the canvas into `frame_buffer`, which must
    /// be a `width * height * 4` RGBA slice.
    pub fn render_frame(
        &mut self,
        stimulus: &Stimulus,
        background: Rgba,
        frame_buffer: &mut [u8],
    ) -> Result<()> {
        let expected = self.canvas.data().len();
        if frame_buffer.len() != expected {
            bail!(
                "frame buffer is {} bytes, canvas needs {expected}",
                frame_buffer.len()
            );
        }
        self.draw(stimulus, background);
        // background is opaque, so premultiplied and straight RGBA agree
        frame_buffer.copy_from_slice(self.canvas.data());
        Ok(())
    }
}

/// Two crossing bars `size` long, centered on `center`.
pub fn draw_fixation(canvas: &mut Pixmap, center: (f32, f32), size: f32, color: Rgba) {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(skia_color(color));

    let thickness = (size / 15.0).round().max(2.0);
    let half = size / 2.0;
    let bars = [
        Rect::from_xywh(center.0 - half, center.1 - thickness / 2.0, size, thickness),
        Rect::from_xywh(center.0 - thickness / 2.0, center.1 - half, thickness, size),
    ];
    for bar in bars.into_iter().flatten() {
        canvas.fill_rect(bar, &paint, Transform::identity(), None);
    }
}

pub fn draw_color_block(canvas: &mut Pixmap, center: (f32, f32), size: (f32, f32), color: Rgba) {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(skia_color(color));
    let (w, h) = size;
    if let Some(rect) = Rect::from_xywh(center.0 - w / 2.0, center.1 - h / 2.0, w, h) {
        canvas.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

/// Composites `src` (premultiplied) over `canvas` with its center at
/// `pos`, clipped to the canvas.
pub fn blit_centered(canvas: &mut Pixmap, src: &Pixmap, pos: (f32, f32)) {
    let w = src.width() as i32;
    let h = src.height() as i32;
    let x0 = (pos.0 - w as f32 * 0.5).floor() as i32;
    let y0 = (pos.1 - h as f32 * 0.5).floor() as i32;

    let dst_x_start = x0.max(0);
    let dst_y_start = y0.max(0);
    let dst_x_end = (x0 + w).min(canvas.width() as i32);
    let dst_y_end = (y0 + h).min(canvas.height() as i32);
    if dst_x_end <= dst_x_start || dst_y_end <= dst_y_start {
        return;
    }

    let src_x_start = (dst_x_start - x0) as usize;
    let src_y_start = (dst_y_start - y0) as usize;
    let max_w = (dst_x_end - dst_x_start) as usize;
    let max_h = (dst_y_end - dst_y_start) as usize;
    let (dst_x_start, dst_y_start) = (dst_x_start as usize, dst_y_start as usize);

    let src_stride = src.width() as usize;
    let dst_stride = canvas.width() as usize;
    let src_data = src.data();
    let dst_data = canvas.data_mut();

    for y in 0..max_h {
        for x in 0..max_w {
            let s = ((src_y_start + y) * src_stride + src_x_start + x) * 4;
            let d = ((dst_y_start + y) * dst_stride + dst_x_start + x) * 4;

            let sa = src_data[s + 3] as u32;
            match sa {
                0 => {}
                255 => dst_data[d..d + 4].copy_from_slice(&src_data[s..s + 4]),
                _ => {
                    let inv_a = 255 - sa;
                    for c in 0..4 {
                        let blended =
                            src_data[s + c] as u32 + (dst_data[d + c] as u32 * inv_a + 127) / 255;
                        dst_data[d + c] = blended.min(255) as u8;
                    }
                }
            }
        }
    }
}
