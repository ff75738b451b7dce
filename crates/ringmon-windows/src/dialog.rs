use std::sync::Arc;
use std::thread;

use ringmon_core::{DialogRequest, Dialogs, LogSink, log_debug, log_error};
use windows::Win32::UI::WindowsAndMessaging::{
    MB_ICONINFORMATION, MB_ICONWARNING, MB_OK, MB_SETFOREGROUND, MB_TOPMOST, MESSAGEBOX_STYLE,
    MessageBoxW,
};
use windows::core::HSTRING;

/// Shows dialogs with `MessageBoxW`.
///
/// Modal requests block the calling thread. Non-modal requests get their
/// own thread so the caller's message loop keeps running.
pub struct MessageBoxDialogs {
    log: Arc<dyn LogSink>,
}

impl MessageBoxDialogs {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }
}

impl Dialogs for MessageBoxDialogs {
    fn show(&self, request: DialogRequest) {
        if let Some(icon) = &request.icon {
            // Message boxes only take stock icons.
            log_debug!(self.log, "dialog icon {} ignored", icon.display());
        }

        if request.modal {
            run(request);
            return;
        }

        let spawned = thread::Builder::new()
            .name("ringmon-dialog".into())
            .spawn(move || run(request));
        if let Err(e) = spawned {
            log_error!(self.log, "failed to open dialog: {e}");
        }
    }
}

fn run(mut request: DialogRequest) {
    // SAFETY: MessageBoxW copies both strings and blocks until dismissed.
    unsafe {
        MessageBoxW(
            None,
            &HSTRING::from(request.message.as_str()),
            &HSTRING::from(request.caption.as_str()),
            style(request.is_warning()),
        );
    }
    request.finish();
}

fn style(warning: bool) -> MESSAGEBOX_STYLE {
    let icon = if warning {
        MB_ICONWARNING
    } else {
        MB_ICONINFORMATION
    };
    MB_OK | icon | MB_TOPMOST | MB_SETFOREGROUND
}
