//! Ring geometry and rasterization.
//!
//! The gadget draws two concentric rings in a square window: the primary
//! ring on the outside and the echo ring inside it. Each arc starts at 12
//! o'clock and sweeps clockwise, `value * 3.6` degrees. The current
//! percentage is printed in the empty middle, in the primary ring's color.

use crate::palette::Brush;
use crate::rect::Rect;

/// Which of the two rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ring {
    Primary,
    Echo,
}

/// Sweep angle in degrees for a utilization value.
pub fn value_to_angle(value: u8) -> f64 {
    f64::from(value.min(100)) * 3.6
}

/// Text drawn in the middle of the rings.
pub fn label(value: u8) -> String {
    format!("{}%", value.min(100))
}

/// What a pixel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPixel {
    Empty,
    Track(Ring),
    Fill(Ring),
}

/// Echo ring opacity relative to the primary ring.
pub const ECHO_OPACITY: f64 = 0.7;

/// Ring dimensions in pixels for a square window of side `size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingLayout {
    pub size: i32,
    pub thickness: f64,
    pub gap: f64,
}

impl RingLayout {
    /// Layout proportional to the window size.
    pub fn for_size(size: i32) -> Self {
        let s = f64::from(size.max(1));
        Self {
            size,
            thickness: (s * 0.12).max(3.0),
            gap: (s * 0.03).max(1.0),
        }
    }

    fn center(&self) -> f64 {
        f64::from(self.size) / 2.0
    }

    /// `(inner, outer)` radii of a ring.
    pub fn radii(&self, ring: Ring) -> (f64, f64) {
        let outer = self.center() - 1.0;
        match ring {
            Ring::Primary => (outer - self.thickness, outer),
            Ring::Echo => {
                let o = outer - self.thickness - self.gap;
                ((o - self.thickness).max(0.0), o)
            }
        }
    }

    /// Box for the label: a band across the middle that stays clear of
    /// the echo ring, including its anti-aliased edge.
    pub fn label_area(&self) -> Rect {
        let (inner, _) = self.radii(Ring::Echo);
        let radius = (inner - 1.0).max(0.0);
        let width = (radius * 1.6).floor() as i32;
        let height = (radius * 1.0).floor() as i32;
        let c = self.size / 2;
        Rect::new(c - width / 2, c - height / 2, width, height)
    }

    /// Font height for the label, in pixels.
    pub fn label_height(&self) -> i32 {
        (self.label_area().height * 4 / 5).max(6)
    }

    /// Classifies the pixel centered at `(x + 0.5, y + 0.5)`.
    pub fn classify(&self, x: i32, y: i32, primary: u8, echo: u8) -> RingPixel {
        let (dist, angle) = self.polar(x, y);
        for (ring, value) in [(Ring::Primary, primary), (Ring::Echo, echo)] {
            let (inner, outer) = self.radii(ring);
            if dist >= inner && dist < outer {
                return if angle < value_to_angle(value) {
                    RingPixel::Fill(ring)
                } else {
                    RingPixel::Track(ring)
                };
            }
        }
        RingPixel::Empty
    }

    /// Distance from the center and clockwise angle from 12 o'clock.
    fn polar(&self, x: i32, y: i32) -> (f64, f64) {
        let c = self.center();
        let dx = f64::from(x) + 0.5 - c;
        let dy = f64::from(y) + 0.5 - c;
        let angle = dx.atan2(-dy).to_degrees();
        let angle = if angle < 0.0 { angle + 360.0 } else { angle };
        (dx.hypot(dy), angle)
    }

    /// Edge coverage of a ring at distance `dist`, for anti-aliasing.
    fn coverage(&self, ring: Ring, dist: f64) -> f64 {
        let (inner, outer) = self.radii(ring);
        let outside = (outer - dist + 0.5).clamp(0.0, 1.0);
        let inside = (dist - inner + 0.5).clamp(0.0, 1.0);
        outside.min(inside)
    }
}

/// Value and paint of one ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingState {
    pub value: u8,
    pub brush: Brush,
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub primary: RingState,
    pub echo: RingState,
    pub track: Brush,
}

/// Rasterizes a frame into premultiplied BGRA pixels, row-major, top-down.
pub fn render(layout: &RingLayout, frame: &Frame) -> Vec<u32> {
    let size = layout.size.max(0);
    let mut pixels = vec![0u32; (size * size) as usize];
    let height = f64::from(size.max(1));

    for y in 0..size {
        let t = (f64::from(y) + 0.5) / height;
        for x in 0..size {
            let (dist, angle) = layout.polar(x, y);
            // Coverage extends half a pixel past each edge for anti-aliasing.
            let Some(ring) = [Ring::Primary, Ring::Echo]
                .into_iter()
                .find(|r| layout.coverage(*r, dist) > 0.0)
            else {
                continue;
            };
            let (state, opacity) = match ring {
                Ring::Primary => (&frame.primary, 1.0),
                Ring::Echo => (&frame.echo, ECHO_OPACITY),
            };
            let brush = if angle < value_to_angle(state.value) {
                state.brush
            } else {
                frame.track
            };
            let alpha = (layout.coverage(ring, dist) * opacity * 255.0).round() as u8;
            pixels[(y * size + x) as usize] = brush.color_at(t).premultiplied(alpha);
        }
    }
    pixels
}

/// Recolors glyphs drawn white on the transparent middle with `brush`.
///
/// GDI text output leaves alpha at zero. The brightest channel of each
/// pixel is taken as glyph coverage and becomes the alpha of the tinted,
/// premultiplied pixel. Only pixels inside `area` are touched.
pub fn tint_glyphs(pixels: &mut [u32], size: i32, area: Rect, brush: &Brush) {
    let height = f64::from(size.max(1));
    let x0 = area.x.max(0);
    let y0 = area.y.max(0);
    let x1 = (area.x + area.width).min(size);
    let y1 = (area.y + area.height).min(size);

    for y in y0..y1 {
        let color = brush.color_at((f64::from(y) + 0.5) / height);
        for x in x0..x1 {
            let Some(px) = pixels.get_mut((y * size + x) as usize) else {
                continue;
            };
            let [b, g, r, _] = px.to_le_bytes();
            let coverage = r.max(g).max(b);
            *px = if coverage == 0 {
                0
            } else {
                color.premultiplied(coverage)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn layout() -> RingLayout {
        RingLayout {
            size: 100,
            thickness: 10.0,
            gap: 4.0,
        }
    }

    #[test]
    fn angle_is_value_times_three_point_six() {
        // Assert
        assert_eq!(value_to_angle(0), 0.0);
        assert_eq!(value_to_angle(50), 180.0);
        assert_eq!(value_to_angle(100), 360.0);
        assert_eq!(value_to_angle(250), 360.0);
    }

    #[test]
    fn arc_starts_at_twelve_and_sweeps_clockwise() {
        // Arrange: primary ring spans radii 39..49 around (50, 50).
        let l = layout();
        let top = (50, 5);
        let right = (95, 50);
        let left = (4, 50);

        // Act / Assert: 30% covers 12 o'clock to just past 3 o'clock.
        assert_eq!(l.classify(top.0, top.1, 30, 0), RingPixel::Fill(Ring::Primary));
        assert_eq!(l.classify(right.0, right.1, 30, 0), RingPixel::Fill(Ring::Primary));
        assert_eq!(l.classify(left.0, left.1, 30, 0), RingPixel::Track(Ring::Primary));
        assert_eq!(l.classify(left.0, left.1, 80, 0), RingPixel::Fill(Ring::Primary));
    }

    #[test]
    fn echo_ring_sits_inside_primary() {
        // Arrange: echo spans radii 25..35.
        let l = layout();

        // Act / Assert
        assert_eq!(l.classify(50, 18, 0, 10), RingPixel::Fill(Ring::Echo));
        assert_eq!(l.classify(50, 18, 100, 0), RingPixel::Track(Ring::Echo));
        assert_eq!(l.classify(50, 50, 100, 100), RingPixel::Empty);
        assert_eq!(l.classify(0, 0, 100, 100), RingPixel::Empty);
    }

    #[test]
    fn render_paints_fill_with_brush_color() {
        // Arrange
        let l = layout();
        let red = Color::rgb(255, 0, 0);
        let frame = Frame {
            primary: RingState {
                value: 100,
                brush: Brush::Solid(red),
            },
            echo: RingState {
                value: 0,
                brush: Brush::Solid(red),
            },
            track: Brush::Solid(Color::rgb(0, 0, 255)),
        };

        // Act
        let px = render(&l, &frame);

        // Assert
        assert_eq!(px.len(), 100 * 100);
        assert_eq!(px[5 * 100 + 50], red.premultiplied(255));
        assert_eq!(px[50 * 100 + 50], 0);
        assert_eq!(px[0], 0);
        let echo_track = px[18 * 100 + 50];
        let echo_alpha = (ECHO_OPACITY * 255.0).round() as u8;
        assert_eq!(echo_track, Color::rgb(0, 0, 255).premultiplied(echo_alpha));
    }

    #[test]
    fn layout_scales_with_size() {
        // Act
        let small = RingLayout::for_size(48);
        let large = RingLayout::for_size(240);

        // Assert
        assert!(large.thickness > small.thickness);
        let (inner, _) = small.radii(Ring::Echo);
        assert!(inner > 0.0);
    }

    #[test]
    fn label_is_the_clamped_percentage() {
        // Assert
        assert_eq!(label(0), "0%");
        assert_eq!(label(57), "57%");
        assert_eq!(label(250), "100%");
    }

    #[test]
    fn label_area_sits_in_the_empty_middle() {
        // Arrange
        let l = RingLayout::for_size(120);
        let red = Brush::Solid(Color::rgb(255, 0, 0));
        let full = RingState {
            value: 100,
            brush: red,
        };
        let frame = Frame {
            primary: full,
            echo: full,
            track: red,
        };
        let area = l.label_area();

        // Act
        let px = render(&l, &frame);

        // Assert
        assert!(area.width > area.height && area.height > 0);
        assert!(l.label_height() < area.height);
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                assert_eq!(px[(y * 120 + x) as usize], 0, "ring pixel at {x},{y}");
            }
        }
    }

    #[test]
    fn glyph_coverage_becomes_brush_alpha() {
        // Arrange
        let orange = Color::rgb(0xFF, 0xA5, 0x00);
        let mut px = vec![0u32; 16];
        px[5] = 0x00FF_FFFF;
        px[6] = 0x0080_8080;
        px[0] = 0x00FF_FFFF;
        let area = Rect::new(1, 1, 2, 2);

        // Act
        tint_glyphs(&mut px, 4, area, &Brush::Solid(orange));

        // Assert
        assert_eq!(px[5], orange.premultiplied(255));
        assert_eq!(px[6], orange.premultiplied(0x80));
        assert_eq!(px[9], 0);
        assert_eq!(px[0], 0x00FF_FFFF);
    }

    #[test]
    fn glyph_tint_follows_gradient_rows() {
        // Arrange
        let top = Color::rgb(0, 0, 0);
        let bottom = Color::rgb(200, 200, 200);
        let brush = Brush::Gradient { top, bottom };
        let mut px = vec![0x00FF_FFFF; 4];

        // Act
        tint_glyphs(&mut px, 2, Rect::new(0, 0, 2, 2), &brush);

        // Assert
        assert_eq!(px[0], brush.color_at(0.25).premultiplied(255));
        assert_eq!(px[2], brush.color_at(0.75).premultiplied(255));
        assert_ne!(px[0], px[2]);
    }
}
