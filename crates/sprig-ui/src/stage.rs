use ratatui::{buffer::Buffer, layout::Rect};

use sprig_engine::{DrawRect, FrameImage, Screen, Surface};

use crate::sprite::{blit_half_blocks, CellRect};

/// Maps the engine's pixel screen onto a block of terminal cells.
///
/// The whole screen is stretched over `area`, so one cell covers
/// `screen.width / area.width` pixels horizontally and
/// `screen.height / area.height` vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageMapping {
    pub area: Rect,
    pub screen: Screen,
}

impl StageMapping {
    pub fn new(area: Rect, screen: Screen) -> Self {
        Self { area, screen }
    }

    /// Cell rectangle covering a pixel rectangle. Anything visible is at
    /// least one cell in each direction.
    pub fn to_cells(&self, rect: DrawRect) -> CellRect {
        let cols = i64::from(self.area.width);
        let rows = i64::from(self.area.height);
        let sw = i64::from(self.screen.width.max(1));
        let sh = i64::from(self.screen.height.max(1));

        let x = i64::from(rect.x) * cols;
        let y = i64::from(rect.y) * rows;
        let width = (i64::from(rect.width) * cols / sw).max(1);
        let height = (i64::from(rect.height) * rows / sh).max(1);

        CellRect {
            x: clamp_i32(i64::from(self.area.x) + x.div_euclid(sw)),
            y: clamp_i32(i64::from(self.area.y) + y.div_euclid(sh)),
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
        }
    }

    /// Screen pixel at the centre of terminal cell `(col, row)`, or `None`
    /// when the cell is outside the stage.
    pub fn to_screen(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let Rect {
            x,
            y,
            width,
            height,
        } = self.area;
        if width == 0 || height == 0 || col < x || row < y {
            return None;
        }
        let (dc, dr) = (col - x, row - y);
        if dc >= width || dr >= height {
            return None;
        }
        let sx = (2 * i64::from(dc) + 1) * i64::from(self.screen.width) / (2 * i64::from(width));
        let sy = (2 * i64::from(dr) + 1) * i64::from(self.screen.height) / (2 * i64::from(height));
        Some((clamp_i32(sx), clamp_i32(sy)))
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// A [`Surface`] that draws into a ratatui buffer through a
/// [`StageMapping`], clipped to the stage.
pub struct TerminalSurface<'a> {
    buf: &'a mut Buffer,
    mapping: StageMapping,
}

impl<'a> TerminalSurface<'a> {
    pub fn new(buf: &'a mut Buffer, mapping: StageMapping) -> Self {
        Self { buf, mapping }
    }
}

impl Surface for TerminalSurface<'_> {
    fn draw_image(&mut self, image: &FrameImage, rect: DrawRect) {
        let clip = self.mapping.area.intersection(self.buf.area);
        if clip.is_empty() {
            return;
        }
        let dest = self.mapping.to_cells(rect);
        blit_half_blocks(self.buf, clip, dest, image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> StageMapping {
        StageMapping::new(
            Rect::new(2, 1, 80, 20),
            Screen {
                width: 800,
                height: 600,
            },
        )
    }

    fn px(x: i32, y: i32, width: i32, height: i32) -> DrawRect {
        DrawRect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn pixels_scale_to_cells() {
        let cells = mapping().to_cells(px(100, 300, 120, 90));
        assert_eq!(
            cells,
            CellRect {
                x: 12,
                y: 11,
                width: 12,
                height: 3
            }
        );
    }

    #[test]
    fn negative_positions_floor() {
        let cells = mapping().to_cells(px(-15, 0, 100, 100));
        assert_eq!(cells.x, 2 - 2);
    }

    #[test]
    fn tiny_sprites_keep_one_cell() {
        let cells = mapping().to_cells(px(0, 0, 3, 3));
        assert_eq!((cells.width, cells.height), (1, 1));
    }

    #[test]
    fn cell_centres_map_back_to_pixels() {
        let m = mapping();
        assert_eq!(m.to_screen(2, 1), Some((5, 15)));
        assert_eq!(m.to_screen(81, 20), Some((795, 585)));
        assert_eq!(m.to_screen(1, 5), None);
        assert_eq!(m.to_screen(82, 5), None);
        assert_eq!(m.to_screen(10, 21), None);
    }

    #[test]
    fn surface_draws_inside_stage_only() {
        let full = Rect::new(0, 0, 10, 6);
        let mut buf = Buffer::empty(full);
        let m = StageMapping::new(
            Rect::new(0, 1, 10, 4),
            Screen {
                width: 100,
                height: 40,
            },
        );
        let image = FrameImage::solid(2, 2, [10, 20, 30, 255]);
        {
            let mut surface = TerminalSurface::new(&mut buf, m);
            surface.draw_image(&image, px(-20, -20, 40, 80));
        }
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
        assert_eq!(buf.cell((0, 1)).unwrap().symbol(), "▀");
        assert_eq!(buf.cell((1, 4)).unwrap().symbol(), "▀");
        assert_eq!(buf.cell((2, 1)).unwrap().symbol(), " ");
        assert_eq!(buf.cell((0, 5)).unwrap().symbol(), " ");
    }
}
