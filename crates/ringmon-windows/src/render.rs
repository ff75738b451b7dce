//! Paints ring frames into a layered window.
//!
//! Pixels come from [`ringmon_core::ring::render`], the percentage label
//! is drawn over them with GDI, and the result is pushed with
//! `UpdateLayeredWindow` and per-pixel alpha, so the window needs no
//! `WM_PAINT` handling.

use std::mem;

use ringmon_core::ring::{self, Frame, RingState};
use ringmon_core::{Brush, Palette, Ring, RingLayout};
use windows::Win32::Foundation::{COLORREF, HWND, POINT, SIZE};
use windows::Win32::Graphics::Gdi::{
    ANTIALIASED_QUALITY, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION, CreateCompatibleDC,
    CreateDIBSection, CreateFontW, DIB_RGB_COLORS, DeleteDC, DeleteObject, FONT_CHARSET,
    FONT_CLIP_PRECISION, FONT_OUTPUT_PRECISION, GdiFlush, GetDC, GetTextExtentPoint32W, HDC,
    IntersectClipRect, ReleaseDC, SelectObject, SetBkMode, SetTextColor, TRANSPARENT, TextOutW,
};
use windows::Win32::UI::WindowsAndMessaging::{ULW_ALPHA, UpdateLayeredWindow};
use windows::core::w;

/// Semibold.
const LABEL_WEIGHT: i32 = 600;

/// The last painted state of both rings for one window.
pub struct RingSurface {
    layout: RingLayout,
    frame: Frame,
}

impl RingSurface {
    pub fn new(size: i32, palette: &Palette) -> Self {
        let empty = RingState {
            value: 0,
            brush: palette.brush_for(0),
        };
        Self {
            layout: RingLayout::for_size(size),
            frame: Frame {
                primary: empty,
                echo: empty,
                track: palette.track(),
            },
        }
    }

    pub fn size(&self) -> i32 {
        self.layout.size
    }

    /// Updates one ring. Returns false when nothing changed.
    pub fn set(&mut self, which: Ring, value: u8, brush: &Brush) -> bool {
        let state = match which {
            Ring::Primary => &mut self.frame.primary,
            Ring::Echo => &mut self.frame.echo,
        };
        let next = RingState {
            value,
            brush: *brush,
        };
        if *state == next {
            return false;
        }
        *state = next;
        true
    }

    /// Rasterizes the current frame and applies it to `hwnd`.
    pub fn present(&self, hwnd: HWND) {
        let pixels = ring::render(&self.layout, &self.frame);
        let size = self.layout.size;
        if size <= 0 {
            return;
        }

        unsafe {
            let screen_dc = GetDC(None);
            let mem_dc = CreateCompatibleDC(Some(screen_dc));

            let bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: size,
                    biHeight: -size, // top-down
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                ..Default::default()
            };

            let mut bits = std::ptr::null_mut();
            let Ok(bmp) = CreateDIBSection(Some(mem_dc), &bmi, DIB_RGB_COLORS, &mut bits, None, 0)
            else {
                let _ = DeleteDC(mem_dc);
                let _ = ReleaseDC(None, screen_dc);
                return;
            };
            if bits.is_null() {
                let _ = DeleteObject(bmp.into());
                let _ = DeleteDC(mem_dc);
                let _ = ReleaseDC(None, screen_dc);
                return;
            }

            let old = SelectObject(mem_dc, bmp.into());

            // SAFETY: `bits` is non-null and holds `size * size` pixels,
            // the same count `ring::render` produced.
            let buf = std::slice::from_raw_parts_mut(bits as *mut u32, pixels.len());
            buf.copy_from_slice(&pixels);
            draw_label(mem_dc, buf, &self.layout, &self.frame.primary);

            let extent = SIZE { cx: size, cy: size };
            let pt_src = POINT::default();
            let blend = BLENDFUNCTION {
                BlendOp: 0,               // AC_SRC_OVER
                SourceConstantAlpha: 255, // per-pixel alpha only
                AlphaFormat: 1,           // AC_SRC_ALPHA
                ..Default::default()
            };

            // No destination point: the window keeps its position.
            let _ = UpdateLayeredWindow(
                hwnd,
                Some(screen_dc),
                None,
                Some(&extent),
                Some(mem_dc),
                Some(&pt_src),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            );

            SelectObject(mem_dc, old);
            let _ = DeleteObject(bmp.into());
            let _ = DeleteDC(mem_dc);
            let _ = ReleaseDC(None, screen_dc);
        }
    }
}

/// Draws the percentage in the middle of the rings, colored like the
/// primary ring.
///
/// # Safety
///
/// `dc` must have the DIB section backing `buf` selected.
unsafe fn draw_label(dc: HDC, buf: &mut [u32], layout: &RingLayout, primary: &RingState) {
    let area = layout.label_area();
    if area.width <= 0 || area.height <= 0 {
        return;
    }
    let wide: Vec<u16> = ring::label(primary.value).encode_utf16().collect();

    unsafe {
        let font = CreateFontW(
            layout.label_height(),
            0,
            0,
            0,
            LABEL_WEIGHT,
            0,
            0,
            0,
            FONT_CHARSET(0),
            FONT_OUTPUT_PRECISION(0),
            FONT_CLIP_PRECISION(0),
            ANTIALIASED_QUALITY,
            0,
            w!("Segoe UI"),
        );
        let old_font = SelectObject(dc, font.into());
        let _ = SetBkMode(dc, TRANSPARENT);
        // White on the transparent middle; `tint_glyphs` reads it back as coverage.
        let _ = SetTextColor(dc, COLORREF(0x00FF_FFFF));

        let mut extent = SIZE::default();
        let _ = GetTextExtentPoint32W(dc, &wide, &mut extent);
        let x = area.x + (area.width - extent.cx) / 2;
        let y = area.y + (area.height - extent.cy) / 2;

        let _ = IntersectClipRect(dc, area.x, area.y, area.x + area.width, area.y + area.height);
        let _ = TextOutW(dc, x, y, &wide);
        let _ = GdiFlush();

        SelectObject(dc, old_font);
        let _ = DeleteObject(font.into());
    }

    ring::tint_glyphs(buf, layout.size, area, &primary.brush);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringmon_core::Color;

    #[test]
    fn set_reports_changes_only() {
        // Arrange
        let mut surface = RingSurface::new(120, &Palette::fallback());
        let red = Brush::Solid(Color::rgb(255, 0, 0));

        // Act
        let first = surface.set(Ring::Primary, 40, &red);
        let again = surface.set(Ring::Primary, 40, &red);
        let echo = surface.set(Ring::Echo, 40, &red);

        // Assert
        assert!(first);
        assert!(!again);
        assert!(echo);
        assert_eq!(surface.size(), 120);
    }
}
