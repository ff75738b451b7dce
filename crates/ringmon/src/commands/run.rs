/// Shows the gadget and blocks until the primary window is closed.
pub fn execute() {
    if let Err(e) = platform::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(windows)]
mod platform {
    use std::backtrace::Backtrace;
    use std::sync::{Arc, Mutex};

    use chrono::Local;
    use ringmon_core::{
        Context, DialogRequest, Dialogs, FileLog, LogSink, Role, Settings, SharedSettings,
        WindowResult, diagnostic, log_error, log_info, log_warn, settings,
    };
    use ringmon_windows::instance::MUTEX_NAME;
    use ringmon_windows::{InstanceGuard, Launcher, MessageBoxDialogs, dpi, priority};

    pub fn run() -> WindowResult<()> {
        let Some(_instance) = InstanceGuard::acquire(MUTEX_NAME)? else {
            println!("ringmon is already running.");
            return Ok(());
        };

        dpi::enable_dpi_awareness();

        let (loaded, load_error) = settings::load();
        let log: Arc<dyn LogSink> = Arc::new(FileLog::new(&loaded.logging));
        if let Some(e) = load_error {
            log_warn!(log, "settings not loaded, using defaults: {e}");
        }
        if let Err(e) = priority::lower_process_priority() {
            log_warn!(log, "could not lower process priority: {e}");
        }

        let dialogs: Arc<dyn Dialogs> = Arc::new(MessageBoxDialogs::new(log.clone()));
        install_panic_hook(log.clone(), dialogs.clone());

        let shared: SharedSettings = Arc::new(Mutex::new(loaded.clone()));
        let mut launcher = Launcher::new(shared.clone(), Context::new(log.clone()), dialogs.clone());
        if let Some(path) = settings::settings_path() {
            launcher = launcher.with_store(path);
        }

        log_info!(log, "ringmon {} started", env!("CARGO_PKG_VERSION"));
        let result = Arc::new(launcher).run(Role::Primary, None);
        flush(&loaded, &shared, &*log);

        if let Err(e) = &result {
            let text = diagnostic::report(&**e, "run", &Local::now());
            log_error!(log, "{text}");
            dialogs.show(DialogRequest::new(text).caption("ringmon error").warning());
        }
        log_info!(log, "ringmon stopped");
        result
    }

    /// Writes the settings back when anything changed since startup.
    fn flush(loaded: &Settings, shared: &SharedSettings, log: &dyn LogSink) {
        let current = shared.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if current == *loaded {
            return;
        }
        if let Err(e) = settings::save(&current) {
            log_error!(log, "failed to save settings: {e}");
        }
    }

    /// Logs panics and shows them in a dialog on the panicking thread.
    fn install_panic_hook(log: Arc<dyn LogSink>, dialogs: Arc<dyn Dialogs>) {
        std::panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture();
            let text = diagnostic::panic_report(info, &backtrace, &Local::now());
            log_error!(log, "{text}");
            dialogs.show(DialogRequest::new(text).caption("ringmon error").warning());
        }));
    }
}

#[cfg(not(windows))]
mod platform {
    use ringmon_core::WindowResult;

    pub fn run() -> WindowResult<()> {
        Err("the gadget is only available on Windows".into())
    }
}
