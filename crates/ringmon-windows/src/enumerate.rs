use std::collections::HashMap;

use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowThreadProcessId, IsWindowVisible,
};
use windows::core::BOOL;

use crate::window::window_text;

/// Maps each process to the title of its first visible, titled top-level
/// window. Processes without one are absent from the map.
///
/// Enumeration failures yield whatever was collected so far; titles are
/// informational only.
pub fn window_titles() -> HashMap<u32, String> {
    let mut titles: HashMap<u32, String> = HashMap::new();

    // SAFETY: EnumWindows runs synchronously and calls the callback with
    // our map pointer as LPARAM. The map outlives the call.
    unsafe {
        let _ = EnumWindows(
            Some(enum_title_callback),
            LPARAM(&mut titles as *mut _ as isize),
        );
    }

    titles
}

unsafe extern "system" fn enum_title_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the map pointer passed by window_titles().
    let titles = unsafe { &mut *(lparam.0 as *mut HashMap<u32, String>) };

    // SAFETY: simple queries on a handle supplied by EnumWindows.
    let (visible, pid) = unsafe {
        let mut pid = 0u32;
        GetWindowThreadProcessId(hwnd, Some(&mut pid));
        (IsWindowVisible(hwnd).as_bool(), pid)
    };

    if visible && pid != 0 && !titles.contains_key(&pid) {
        let title = window_text(hwnd);
        if !title.is_empty() {
            titles.insert(pid, title);
        }
    }

    BOOL(1)
}
