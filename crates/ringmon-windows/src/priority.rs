use ringmon_core::WindowResult;
use windows::Win32::System::Threading::{
    GetCurrentProcess, IDLE_PRIORITY_CLASS, SetPriorityClass,
};

/// Runs the whole process at idle priority so the monitor never competes
/// with the load it is measuring.
pub fn lower_process_priority() -> WindowResult<()> {
    // SAFETY: the pseudo-handle of the current process needs no cleanup.
    unsafe { SetPriorityClass(GetCurrentProcess(), IDLE_PRIORITY_CLASS)? };
    Ok(())
}
