use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE};
use windows::Win32::System::Threading::CreateMutexW;
use windows::core::HSTRING;

/// Name of the per-session mutex that marks a running gadget.
pub const MUTEX_NAME: &str = r"Local\ringmon-gadget-v1";

/// Holds the single-instance mutex until dropped.
pub struct InstanceGuard {
    handle: HANDLE,
}

impl InstanceGuard {
    /// Claims the named mutex.
    ///
    /// Returns `Ok(None)` when another process already holds it.
    pub fn acquire(name: &str) -> windows::core::Result<Option<Self>> {
        // SAFETY: CreateMutexW opens or creates a named mutex. The handle
        // is closed in Drop or right here when we are not first.
        let handle = unsafe { CreateMutexW(None, false, &HSTRING::from(name))? };
        let already = unsafe { GetLastError() } == ERROR_ALREADY_EXISTS;

        if already {
            unsafe {
                let _ = CloseHandle(handle);
            }
            return Ok(None);
        }
        Ok(Some(Self { handle }))
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        // SAFETY: the handle came from CreateMutexW and is closed once.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}
