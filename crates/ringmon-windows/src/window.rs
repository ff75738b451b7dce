use ringmon_core::{Position, StyleError, WindowStyler};

use windows::Win32::Foundation::{ERROR_INVALID_WINDOW_HANDLE, HWND, RECT};
use windows::Win32::UI::WindowsAndMessaging::{
    GWL_EXSTYLE, GetWindowLongPtrW, GetWindowRect, GetWindowTextLengthW, GetWindowTextW,
    HWND_TOPMOST, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_SHOWWINDOW, SetWindowPos,
    SetWindowTextW, WS_EX_TOPMOST,
};
use windows::core::HSTRING;

/// A top-level window owned by this process, wrapping a Win32 `HWND`.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    hwnd: HWND,
}

impl Window {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Current top-left corner in screen pixels.
    pub fn position(&self) -> Position {
        let mut rect = RECT::default();
        // SAFETY: GetWindowRect writes into a live stack RECT. On failure
        // the zeroed rect is reported.
        unsafe {
            let _ = GetWindowRect(self.hwnd, &mut rect);
        }
        Position {
            x: rect.left,
            y: rect.top,
        }
    }

    pub fn set_title(&self, title: &str) {
        // SAFETY: SetWindowTextW copies the string before returning.
        unsafe {
            let _ = SetWindowTextW(self.hwnd, &HSTRING::from(title));
        }
    }

    pub fn title(&self) -> String {
        window_text(self.hwnd)
    }
}

impl WindowStyler for Window {
    fn pin_topmost(&mut self) -> Result<(), StyleError> {
        // SAFETY: SetWindowPos only reorders the window; position and
        // size are kept.
        unsafe {
            SetWindowPos(
                self.hwnd,
                Some(HWND_TOPMOST),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_SHOWWINDOW,
            )
        }
        .map_err(|e| style_error(&e))
    }

    fn is_topmost(&mut self) -> Result<bool, StyleError> {
        // SAFETY: reads the extended style of our own window.
        let ex_style = unsafe { GetWindowLongPtrW(self.hwnd, GWL_EXSTYLE) } as u32;
        // A layered tool window never has an empty extended style, so zero
        // means the handle is gone.
        if ex_style == 0 {
            return Err(StyleError::InvalidWindow);
        }
        Ok(ex_style & WS_EX_TOPMOST.0 == WS_EX_TOPMOST.0)
    }
}

fn style_error(err: &windows::core::Error) -> StyleError {
    if err.code() == ERROR_INVALID_WINDOW_HANDLE.to_hresult() {
        StyleError::InvalidWindow
    } else {
        StyleError::Platform(err.message())
    }
}

/// Reads a window's title text.
pub(crate) fn window_text(hwnd: HWND) -> String {
    // SAFETY: GetWindowTextLengthW and GetWindowTextW only read window
    // text into our buffer.
    unsafe {
        let length = GetWindowTextLengthW(hwnd);
        if length <= 0 {
            return String::new();
        }

        // +1 for the null terminator that Windows requires
        let mut buffer = vec![0u16; (length + 1) as usize];
        let copied = GetWindowTextW(hwnd, &mut buffer);
        String::from_utf16_lossy(&buffer[..copied.max(0) as usize])
    }
}
