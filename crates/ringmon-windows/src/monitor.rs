use std::mem;

use ringmon_core::{Rect, WindowResult};
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MONITOR_DEFAULTTOPRIMARY, MONITORINFO, MonitorFromWindow,
};

/// Returns the work area of the primary monitor.
///
/// The work area excludes the taskbar, so the default gadget position
/// never lands underneath it.
pub fn primary_work_area() -> WindowResult<Rect> {
    // A null HWND with MONITOR_DEFAULTTOPRIMARY yields the primary monitor.
    let monitor = unsafe { MonitorFromWindow(HWND::default(), MONITOR_DEFAULTTOPRIMARY) };

    let mut info = MONITORINFO {
        cbSize: mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };

    // SAFETY: cbSize is set as the API requires.
    let success = unsafe { GetMonitorInfoW(monitor, &mut info) };
    if !success.as_bool() {
        return Err("Failed to get monitor info".into());
    }

    let rc = info.rcWork;
    Ok(Rect::new(
        rc.left,
        rc.top,
        rc.right - rc.left,
        rc.bottom - rc.top,
    ))
}
