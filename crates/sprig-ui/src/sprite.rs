use std::ops::Range;

use ratatui::{buffer::Buffer, layout::Rect, style::Color};

use sprig_engine::FrameImage;

/// Minimum alpha (0–255) for a pixel to be drawn.
const ALPHA_THRESHOLD: u8 = 128;

/// A destination rectangle in terminal cells. May start left of or above
/// the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Draw `image` scaled into `dest` using Unicode half-blocks.
///
/// Each cell shows two vertically stacked pixels through `▀`/`▄` with the
/// foreground and background colours. Scaling is nearest-neighbour. Only
/// cells inside `clip` are touched; transparent pixels leave the cell as is.
pub fn blit_half_blocks(buf: &mut Buffer, clip: Rect, dest: CellRect, image: &FrameImage) {
    let (src_w, src_h) = (image.width, image.height);
    if dest.width == 0 || dest.height == 0 || src_w == 0 || src_h == 0 {
        return;
    }
    let expected = u64::from(src_w) * u64::from(src_h) * 4;
    if (image.data.len() as u64) < expected {
        return;
    }

    let sub_rows = u64::from(dest.height) * 2;
    let cols = visible_span(dest.x, dest.width, clip.x, clip.width);
    for cy in visible_span(dest.y, dest.height, clip.y, clip.height) {
        let Some(y) = on_axis(dest.y, cy, clip.y, clip.height) else {
            continue;
        };
        let top_py = (u64::from(cy) * 2 * u64::from(src_h) / sub_rows) as u32;
        let bot_py = ((u64::from(cy) * 2 + 1) * u64::from(src_h) / sub_rows) as u32;

        for cx in cols.clone() {
            let Some(x) = on_axis(dest.x, cx, clip.x, clip.width) else {
                continue;
            };
            let px = (u64::from(cx) * u64::from(src_w) / u64::from(dest.width)) as u32;

            let (Some(top), Some(bot)) = (
                sample_pixel(&image.data, src_w, px, top_py),
                sample_pixel(&image.data, src_w, px, bot_py),
            ) else {
                continue;
            };
            let top_opaque = top[3] >= ALPHA_THRESHOLD;
            let bot_opaque = bot[3] >= ALPHA_THRESHOLD;
            let Some(cell) = buf.cell_mut((x, y)) else {
                continue;
            };

            match (top_opaque, bot_opaque) {
                (true, true) => {
                    cell.set_char('▀');
                    cell.set_fg(rgb(top));
                    cell.set_bg(rgb(bot));
                }
                (true, false) => {
                    cell.set_char('▀');
                    cell.set_fg(rgb(top));
                }
                (false, true) => {
                    cell.set_char('▄');
                    cell.set_fg(rgb(bot));
                }
                (false, false) => {}
            }
        }
    }
}

/// Offsets into a run of `len` cells starting at `origin` that land inside
/// `[start, start + extent)`.
fn visible_span(origin: i32, len: u32, start: u16, extent: u16) -> Range<u32> {
    let origin = i64::from(origin);
    let lo = (i64::from(start) - origin).clamp(0, i64::from(len));
    let hi = (i64::from(start) + i64::from(extent) - origin).clamp(lo, i64::from(len));
    lo as u32..hi as u32
}

/// Absolute cell coordinate of `origin + offset`, if it falls inside
/// `[start, start + len)`.
fn on_axis(origin: i32, offset: u32, start: u16, len: u16) -> Option<u16> {
    let pos = i64::from(origin) + i64::from(offset);
    let start = i64::from(start);
    if pos < start || pos >= start + i64::from(len) {
        return None;
    }
    u16::try_from(pos).ok()
}

fn rgb(p: [u8; 4]) -> Color {
    Color::Rgb(p[0], p[1], p[2])
}

/// Read an RGBA pixel from row-major data.
fn sample_pixel(data: &[u8], width: u32, x: u32, y: u32) -> Option<[u8; 4]> {
    let idx = (y as usize)
        .checked_mul(width as usize)?
        .checked_add(x as usize)?
        .checked_mul(4)?;
    data.get(idx..idx.checked_add(4)?)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red(w: u32, h: u32) -> FrameImage {
        FrameImage::solid(w, h, [255, 0, 0, 255])
    }

    fn rect(x: i32, y: i32, width: u32, height: u32) -> CellRect {
        CellRect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn opaque_image_fills_dest() {
        let area = Rect::new(0, 0, 6, 4);
        let mut buf = Buffer::empty(area);
        blit_half_blocks(&mut buf, area, rect(1, 1, 4, 2), &red(4, 4));

        let cell = buf.cell((1, 1)).unwrap();
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
        assert_eq!(buf.cell((4, 2)).unwrap().symbol(), "▀");
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
        assert_eq!(buf.cell((5, 3)).unwrap().symbol(), " ");
    }

    #[test]
    fn transparent_pixels_leave_cells_untouched() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        let clear = FrameImage::solid(4, 4, [0, 255, 0, 0]);
        blit_half_blocks(&mut buf, area, rect(0, 0, 4, 2), &clear);
        assert_eq!(buf.cell((1, 1)).unwrap().symbol(), " ");
    }

    #[test]
    fn bottom_only_uses_lower_half_block() {
        // Row 0 transparent, row 1 opaque blue.
        let image = FrameImage {
            data: vec![0, 0, 0, 0, 0, 0, 255, 255],
            width: 1,
            height: 2,
        };
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        blit_half_blocks(&mut buf, area, rect(0, 0, 1, 1), &image);
        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.symbol(), "▄");
        assert_eq!(cell.fg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn dest_partly_off_clip_draws_visible_part() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        blit_half_blocks(&mut buf, area, rect(-2, 0, 4, 2), &red(4, 4));
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "▀");
        assert_eq!(buf.cell((1, 1)).unwrap().symbol(), "▀");
        assert_eq!(buf.cell((2, 0)).unwrap().symbol(), " ");
    }

    #[test]
    fn clip_restricts_to_sub_area() {
        let area = Rect::new(0, 0, 6, 4);
        let mut buf = Buffer::empty(area);
        let clip = Rect::new(0, 1, 6, 2);
        blit_half_blocks(&mut buf, clip, rect(0, 0, 6, 4), &red(2, 2));
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
        assert_eq!(buf.cell((0, 1)).unwrap().symbol(), "▀");
        assert_eq!(buf.cell((5, 2)).unwrap().symbol(), "▀");
        assert_eq!(buf.cell((0, 3)).unwrap().symbol(), " ");
    }

    #[test]
    fn visible_span_covers_only_the_overlap() {
        assert_eq!(visible_span(-2, 4, 0, 4), 2..4);
        assert_eq!(visible_span(3, 10, 0, 6), 0..3);
        assert_eq!(visible_span(10, 5, 0, 6), 0..0);
        assert_eq!(visible_span(-10, 5, 0, 6), 5..5);
        assert_eq!(visible_span(i32::MIN, u32::MAX, 2, 3), 2_147_483_650..2_147_483_653);
    }

    #[test]
    fn huge_dest_only_visits_the_clip() {
        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        let start = std::time::Instant::now();
        blit_half_blocks(
            &mut buf,
            area,
            rect(-1_000_000, -1_000_000, 4_000_000_000, 4_000_000_000),
            &red(4, 4),
        );
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "▀");
        assert_eq!(buf.cell((2, 1)).unwrap().symbol(), "▀");
    }

    #[test]
    fn short_data_is_ignored() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        let broken = FrameImage {
            data: vec![0; 8],
            width: 4,
            height: 4,
        };
        blit_half_blocks(&mut buf, area, rect(0, 0, 4, 2), &broken);
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
    }
}
