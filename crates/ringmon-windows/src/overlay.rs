//! The gadget window: a borderless, layered, topmost popup with its own
//! message loop.
//!
//! Each window lives on one thread. Its [`Gadget`], scheduler and host are
//! kept in a thread-local slot and driven from the window procedure. A
//! single Win32 timer is re-armed after every event for the next due task.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, Once};
use std::thread;
use std::time::{Duration, Instant};

use ringmon_core::rect::initial_position;
use ringmon_core::{
    AttributionScanner, Brush, Context, DialogRequest, Dialogs, Gadget, GadgetHost, Position,
    Ring, Role, Scheduler, SharedSettings, StyleError, Task, WindowResult, WindowStyler,
    log_debug, log_error, run_until,
};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, HTCAPTION,
    IDC_ARROW, KillTimer, LoadCursorW, MSG, PostQuitMessage, RegisterClassW, SW_SHOWNOACTIVATE,
    SetTimer, ShowWindow, TranslateMessage, WA_INACTIVE, WM_ACTIVATE, WM_DESTROY,
    WM_EXITSIZEMOVE, WM_NCHITTEST, WM_NCLBUTTONDBLCLK, WM_NCMBUTTONUP, WM_NCRBUTTONUP, WM_TIMER,
    WNDCLASSW, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};
use windows::core::w;

use crate::cpu::SystemCpuSampler;
use crate::monitor;
use crate::process::WinProcessSampler;
use crate::render::RingSurface;
use crate::window::Window;

const TICK_TIMER_ID: usize = 0x524D;

/// Shortest timer Windows will honor.
const MIN_TIMER_MS: u32 = 10;

/// Offset of a secondary gadget from the window that spawned it.
const SECONDARY_OFFSET: i32 = 40;

static REGISTER_CLASS: Once = Once::new();

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
}

/// Creates gadget windows. Shared by the primary and every secondary.
pub struct Launcher {
    settings: SharedSettings,
    context: Context,
    dialogs: Arc<dyn Dialogs>,
    scanner: Arc<AttributionScanner>,
    store: Option<PathBuf>,
}

impl Launcher {
    pub fn new(settings: SharedSettings, context: Context, dialogs: Arc<dyn Dialogs>) -> Self {
        let scan = settings
            .lock()
            .map(|s| s.scan.clone())
            .unwrap_or_else(|e| e.into_inner().scan.clone());
        let scanner = AttributionScanner::new(
            Arc::new(WinProcessSampler::new()),
            context.clone(),
            scan,
        );
        Self {
            settings,
            context,
            dialogs,
            scanner: Arc::new(scanner),
            store: None,
        }
    }

    /// Settings file the primary writes its position to.
    pub fn with_store(mut self, path: PathBuf) -> Self {
        self.store = Some(path);
        self
    }

    /// Creates a gadget window on the calling thread and pumps its messages
    /// until the window is closed.
    ///
    /// Without `at`, the window opens at the saved position or the default
    /// corner of the primary work area.
    pub fn run(self: &Arc<Self>, role: Role, at: Option<Position>) -> WindowResult<()> {
        ensure_class_registered();

        let (size, saved) = {
            let s = self.settings.lock().unwrap_or_else(|e| e.into_inner());
            (s.size, s.position)
        };
        let origin = match at {
            Some(p) => p,
            None => initial_position(saved, &monitor::primary_work_area()?, size),
        };

        // SAFETY: the class is registered above; the window is destroyed by
        // the user (right-click) or when the thread's loop ends.
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TOOLWINDOW | WS_EX_TOPMOST,
                w!("RingmonGadget"),
                w!("ringmon"),
                WS_POPUP,
                origin.x,
                origin.y,
                size,
                size,
                None,
                None,
                None,
                None,
            )?
        };

        let gadget = self.build_gadget(role);
        let host = WinHost {
            window: Window::new(hwnd),
            surface: RingSurface::new(size, gadget.palette()),
        };
        let mut runtime = Runtime {
            gadget,
            sched: Scheduler::new(),
            host,
            started: Instant::now(),
            launcher: Arc::clone(self),
        };

        runtime.gadget.start(&mut runtime.sched, &mut runtime.host);
        // SAFETY: shows our own window without stealing focus.
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        }
        runtime.arm_timer();
        RUNTIME.with(|cell| *cell.borrow_mut() = Some(runtime));

        log_debug!(self.context.log, "{role:?} gadget window at {},{}", origin.x, origin.y);
        run_message_pump();
        Ok(())
    }

    fn build_gadget(&self, role: Role) -> Gadget {
        let mut gadget = Gadget::new(role, self.settings.clone(), self.context.clone());

        match SystemCpuSampler::new() {
            Ok(sampler) => gadget = gadget.with_sampler(Box::new(sampler)),
            Err(e) => {
                log_error!(self.context.log, "{e}");
                self.dialogs.show(
                    DialogRequest::new(format!("{e}\n\nThe gadget will show no readings."))
                        .warning()
                        .modal(false),
                );
            }
        }

        if role == Role::Primary {
            gadget = gadget.with_scanner(Arc::clone(&self.scanner));
            if let Some(store) = &self.store {
                gadget = gadget.with_store(store.clone());
            }
        }
        gadget
    }

    /// Opens a secondary gadget on its own thread, offset from `from`.
    fn spawn_secondary(self: &Arc<Self>, from: Position) {
        let launcher = Arc::clone(self);
        let at = Position {
            x: from.x + SECONDARY_OFFSET,
            y: from.y + SECONDARY_OFFSET,
        };
        let spawned = thread::Builder::new()
            .name("ringmon-secondary".into())
            .spawn(move || {
                if let Err(e) = launcher.run(Role::Secondary, Some(at)) {
                    log_error!(launcher.context.log, "secondary gadget failed: {e}");
                }
            });
        if let Err(e) = spawned {
            log_error!(self.context.log, "failed to start secondary gadget: {e}");
        }
    }
}

/// One window's state, owned by its thread.
struct Runtime {
    gadget: Gadget,
    sched: Scheduler<Task>,
    host: WinHost,
    started: Instant,
    launcher: Arc<Launcher>,
}

impl Runtime {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Runs every task that is due.
    fn pump(&mut self) {
        let now = self.elapsed();
        run_until(&mut self.gadget, &mut self.sched, &mut self.host, now);
    }

    fn arm_timer(&self) {
        let hwnd = Some(self.host.window.hwnd());
        match timer_delay(self.sched.next_due(), self.elapsed()) {
            // SAFETY: re-arming an existing timer ID replaces it.
            Some(ms) => unsafe {
                let _ = SetTimer(hwnd, TICK_TIMER_ID, ms, None);
            },
            // SAFETY: killing a timer that is not armed is a no-op.
            None => unsafe {
                let _ = KillTimer(hwnd, TICK_TIMER_ID);
            },
        }
    }
}

/// Milliseconds until the next task is due, or `None` when the queue is
/// empty and the timer should stop.
fn timer_delay(next_due: Option<Duration>, elapsed: Duration) -> Option<u32> {
    let wait = next_due?.saturating_sub(elapsed).as_millis();
    Some(u32::try_from(wait).unwrap_or(u32::MAX).max(MIN_TIMER_MS))
}

/// The layered window seen through the gadget's host trait.
struct WinHost {
    window: Window,
    surface: RingSurface,
}

impl WindowStyler for WinHost {
    fn pin_topmost(&mut self) -> Result<(), StyleError> {
        self.window.pin_topmost()
    }

    fn is_topmost(&mut self) -> Result<bool, StyleError> {
        self.window.is_topmost()
    }
}

impl GadgetHost for WinHost {
    fn paint_ring(&mut self, ring: Ring, value: u8, brush: &Brush) {
        if self.surface.set(ring, value, brush) {
            self.surface.present(self.window.hwnd());
        }
    }

    fn set_caption(&mut self, caption: &str) {
        self.window.set_title(caption);
    }

    fn position(&self) -> Position {
        self.window.position()
    }
}

fn ensure_class_registered() {
    REGISTER_CLASS.call_once(|| {
        let wc = WNDCLASSW {
            lpfnWndProc: Some(gadget_wnd_proc),
            lpszClassName: w!("RingmonGadget"),
            // SAFETY: loads a stock cursor; no module handle needed.
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            ..Default::default()
        };
        // SAFETY: `wc` outlives the call. A failed registration surfaces as
        // a CreateWindowExW error.
        unsafe {
            RegisterClassW(&wc);
        }
    });
}

/// Runs `f` against this thread's runtime, then re-arms the timer.
///
/// Messages sent while the runtime is already borrowed (re-entrant calls
/// from inside a Win32 API) are dropped.
fn with_runtime(f: impl FnOnce(&mut Runtime)) {
    RUNTIME.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        if let Some(runtime) = slot.as_mut() {
            runtime.pump();
            f(runtime);
            runtime.arm_timer();
        }
    });
}

unsafe extern "system" fn gadget_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // The whole window acts as a caption: left-drag moves it.
        WM_NCHITTEST => return LRESULT(HTCAPTION as isize),
        WM_TIMER if wparam.0 == TICK_TIMER_ID => {
            with_runtime(|_| {});
            return LRESULT(0);
        }
        WM_ACTIVATE if (wparam.0 & 0xFFFF) as u32 == WA_INACTIVE => {
            with_runtime(|rt| rt.gadget.on_deactivated(&mut rt.sched, &mut rt.host));
        }
        WM_EXITSIZEMOVE => {
            with_runtime(|rt| rt.gadget.on_drag_finished(&mut rt.sched));
        }
        WM_NCRBUTTONUP => {
            // SAFETY: destroys our own window; WM_DESTROY ends the loop.
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            return LRESULT(0);
        }
        WM_NCMBUTTONUP => {
            with_runtime(|rt| {
                let from = rt.host.position();
                rt.launcher.spawn_secondary(from);
            });
            return LRESULT(0);
        }
        // No maximize on double-click.
        WM_NCLBUTTONDBLCLK => return LRESULT(0),
        WM_DESTROY => {
            // SAFETY: both calls act on this thread's own window and queue.
            unsafe {
                let _ = KillTimer(Some(hwnd), TICK_TIMER_ID);
                PostQuitMessage(0);
            }
            RUNTIME.with(|cell| {
                if let Ok(mut slot) = cell.try_borrow_mut() {
                    slot.take();
                }
            });
            return LRESULT(0);
        }
        _ => {}
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// Dispatches messages until `WM_QUIT`.
fn run_message_pump() {
    let mut msg = MSG::default();

    while unsafe { GetMessageW(&mut msg, None, 0, 0).as_bool() } {
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}
