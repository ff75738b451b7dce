use std::fmt;
use std::path::PathBuf;

/// Callback run after the user dismisses a dialog.
pub type OnClose = Box<dyn FnOnce() + Send + 'static>;

/// A message box to show, built with a small fluent API.
///
/// ```
/// use ringmon_core::DialogRequest;
///
/// let req = DialogRequest::new("Could not read CPU counters")
///     .caption("ringmon")
///     .warning()
///     .modal(false);
/// assert!(req.is_warning());
/// ```
pub struct DialogRequest {
    pub message: String,
    pub caption: String,
    pub warning: bool,
    pub modal: bool,
    pub icon: Option<PathBuf>,
    pub on_close: Option<OnClose>,
}

impl DialogRequest {
    /// An informational, modal dialog with the default caption.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            caption: "ringmon".into(),
            warning: false,
            modal: true,
            icon: None,
            on_close: None,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Uses the warning icon instead of the information icon.
    pub fn warning(mut self) -> Self {
        self.warning = true;
        self
    }

    /// Modal dialogs block the caller until dismissed. Non-modal dialogs run
    /// on their own thread and return immediately.
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    pub fn icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon = Some(path.into());
        self
    }

    pub fn on_close(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn is_warning(&self) -> bool {
        self.warning
    }

    /// Runs the close callback, if any. Called once by the dialog backend
    /// after dismissal.
    pub fn finish(&mut self) {
        if let Some(f) = self.on_close.take() {
            f();
        }
    }
}

impl fmt::Debug for DialogRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogRequest")
            .field("message", &self.message)
            .field("caption", &self.caption)
            .field("warning", &self.warning)
            .field("modal", &self.modal)
            .field("icon", &self.icon)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// Something that can show dialogs.
pub trait Dialogs: Send + Sync {
    fn show(&self, request: DialogRequest);
}
