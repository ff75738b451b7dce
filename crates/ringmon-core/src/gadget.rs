//! The gadget's behavior, independent of any window system.
//!
//! A [`Gadget`] reacts to scheduled [`Task`]s and to a few window events.
//! It never touches a clock or a timer itself: follow-up work goes into
//! the [`Scheduler`] and all drawing goes through a [`GadgetHost`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::attribution::AttributionScanner;
use crate::context::Context;
use crate::palette::{Brush, Palette};
use crate::rect::Position;
use crate::ring::Ring;
use crate::sampler::CpuSampler;
use crate::scheduler::Scheduler;
use crate::settings::{self, Settings};
use crate::topmost::{TopmostCheck, TopmostEnforcer, WindowStyler};
use crate::{log_debug, log_error, log_info, log_warn};

/// Settings shared by every gadget in the process.
pub type SharedSettings = Arc<Mutex<Settings>>;

/// Delay between the end of a drag and the position save.
pub const SAVE_POSITION_DELAY: Duration = Duration::from_secs(5);

/// Caption shown when no CPU counter is available.
pub const CAPTION_UNAVAILABLE: &str = "CPU: n/a";

/// The first gadget in a process is the primary; gadgets spawned from it
/// are secondaries. Only the primary runs attribution scans and saves its
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Secondary,
}

/// Work queued in the gadget's scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Read the CPU and update the primary ring.
    Sample,
    /// Show a previously sampled value on the echo ring.
    EchoRing(u8),
    /// Persist the window position.
    SavePosition,
    /// Re-check the topmost style.
    TopmostCheck { attempt: u32 },
}

/// The window a gadget draws into.
pub trait GadgetHost: WindowStyler {
    /// Redraws one ring with the given value and brush.
    fn paint_ring(&mut self, ring: Ring, value: u8, brush: &Brush);

    /// Sets the window title.
    fn set_caption(&mut self, caption: &str);

    /// Current top-left corner of the window.
    fn position(&self) -> Position;
}

pub fn caption(value: u8) -> String {
    format!("CPU: {value}%")
}

/// State machine for one gadget window.
pub struct Gadget {
    role: Role,
    context: Context,
    settings: SharedSettings,
    sampler: Option<Box<dyn CpuSampler>>,
    scanner: Option<Arc<AttributionScanner>>,
    store: Option<PathBuf>,
    palette: Palette,
    enforcer: TopmostEnforcer,
    threshold: u8,
    interval: Duration,
    echo_delay: Duration,
    tick_count: u64,
    save_due: Option<Duration>,
}

impl Gadget {
    /// Creates a gadget with no sampler, scanner or settings file.
    ///
    /// The threshold and timings are read from `settings` once, here.
    pub fn new(role: Role, settings: SharedSettings, context: Context) -> Self {
        let snapshot = settings
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|e| e.into_inner().clone());
        let palette = Palette::from_theme(&snapshot.theme, &*context.log);
        Self {
            role,
            context,
            settings,
            sampler: None,
            scanner: None,
            store: None,
            palette,
            enforcer: TopmostEnforcer::new(),
            threshold: snapshot.cpu_threshold,
            interval: snapshot.sample_interval(),
            echo_delay: snapshot.echo_delay(),
            tick_count: 0,
            save_due: None,
        }
    }

    pub fn with_sampler(mut self, sampler: Box<dyn CpuSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Attaches the attribution scanner. Ignored for secondaries.
    pub fn with_scanner(mut self, scanner: Arc<AttributionScanner>) -> Self {
        if self.role == Role::Primary {
            self.scanner = Some(scanner);
        }
        self
    }

    /// Settings file written when the position is saved.
    pub fn with_store(mut self, path: PathBuf) -> Self {
        self.store = Some(path);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Draws the empty rings, pins the window and queues the first sample.
    pub fn start<H: GadgetHost + ?Sized>(&mut self, sched: &mut Scheduler<Task>, host: &mut H) {
        let brush = self.palette.brush_for(0);
        host.paint_ring(Ring::Primary, 0, &brush);
        host.paint_ring(Ring::Echo, 0, &brush);

        if self.sampler.is_some() {
            host.set_caption(&caption(0));
            sched.schedule(self.interval, Task::Sample);
        } else {
            log_error!(
                self.context.log,
                "CPU counter unavailable, the gadget will not update"
            );
            host.set_caption(CAPTION_UNAVAILABLE);
        }

        let check = self.enforcer.begin(host, &*self.context.log);
        schedule_check(sched, check);
        log_info!(self.context.log, "{:?} gadget started", self.role);
    }

    /// Runs one scheduled task.
    pub fn handle<H: GadgetHost + ?Sized>(
        &mut self,
        task: Task,
        sched: &mut Scheduler<Task>,
        host: &mut H,
    ) {
        match task {
            Task::Sample => self.on_sample(sched, host),
            Task::EchoRing(value) => {
                let brush = self.palette.brush_for(value);
                host.paint_ring(Ring::Echo, value, &brush);
            }
            Task::SavePosition => self.on_save_position(sched.now(), host),
            Task::TopmostCheck { attempt } => {
                let next = self.enforcer.check(attempt, host, &*self.context.log);
                schedule_check(sched, next);
            }
        }
    }

    fn on_sample<H: GadgetHost + ?Sized>(&mut self, sched: &mut Scheduler<Task>, host: &mut H) {
        sched.schedule(self.interval, Task::Sample);
        self.tick_count = self.tick_count.wrapping_add(1);

        if let Some(sampler) = self.sampler.as_mut() {
            match sampler.sample() {
                Ok(value) => {
                    let value = value.min(100);
                    let brush = self.palette.brush_for(value);
                    host.paint_ring(Ring::Primary, value, &brush);
                    host.set_caption(&caption(value));
                    sched.schedule(self.echo_delay, Task::EchoRing(value));
                    self.maybe_scan(value);
                }
                Err(e) => log_warn!(self.context.log, "{e}"),
            }
        }

        if TopmostEnforcer::due_on_tick(self.tick_count) {
            let check = self.enforcer.begin(host, &*self.context.log);
            schedule_check(sched, check);
        }
    }

    /// Moves the clock to `now` when the pending sample is a full interval
    /// late, so the sample and its follow-ups are timed from `now`.
    fn skip_missed_samples(&self, sched: &mut Scheduler<Task>, now: Duration) {
        let late = now.saturating_sub(sched.now());
        if late >= self.interval {
            log_debug!(
                self.context.log,
                "sampling resumed {} ms late, missed ticks dropped",
                late.as_millis()
            );
            sched.advance_to(now);
        }
    }

    fn maybe_scan(&self, value: u8) {
        if self.threshold == 0 || value < self.threshold {
            return;
        }
        if let Some(scanner) = &self.scanner {
            if scanner.trigger(self.threshold) {
                log_debug!(
                    self.context.log,
                    "CPU at {value}% (threshold {}), attribution scan started",
                    self.threshold
                );
            }
        }
    }

    /// The window lost activation; push it back on top.
    pub fn on_deactivated<H: GadgetHost + ?Sized>(
        &mut self,
        sched: &mut Scheduler<Task>,
        host: &mut H,
    ) {
        let check = self.enforcer.begin(host, &*self.context.log);
        schedule_check(sched, check);
    }

    /// A drag ended. The position is saved once no further drag has ended
    /// for [`SAVE_POSITION_DELAY`].
    pub fn on_drag_finished(&mut self, sched: &mut Scheduler<Task>) {
        if self.role != Role::Primary {
            return;
        }
        let due = sched.now() + SAVE_POSITION_DELAY;
        self.save_due = Some(due);
        sched.schedule_at(due, Task::SavePosition);
    }

    fn on_save_position<H: GadgetHost + ?Sized>(&mut self, now: Duration, host: &H) {
        match self.save_due {
            Some(due) if now >= due => self.save_due = None,
            // Superseded by a later drag.
            _ => return,
        }
        let position = host.position();
        let snapshot = {
            let mut settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
            settings.position = Some(position);
            settings.clone()
        };
        log_debug!(self.context.log, "saving position {},{}", position.x, position.y);

        if let Some(path) = &self.store {
            if let Err(e) = settings::save_to(&snapshot, path) {
                log_error!(self.context.log, "failed to save settings: {e}");
            }
        }
    }
}

fn schedule_check(sched: &mut Scheduler<Task>, check: Option<TopmostCheck>) {
    if let Some(check) = check {
        sched.schedule(
            check.delay,
            Task::TopmostCheck {
                attempt: check.attempt,
            },
        );
    }
}

/// Runs every task due at or before `now`, then settles the clock at `now`.
///
/// A sample that is a full interval or more behind `now` runs once, at
/// `now`, and the missed ticks are dropped.
pub fn run_until<H: GadgetHost + ?Sized>(
    gadget: &mut Gadget,
    sched: &mut Scheduler<Task>,
    host: &mut H,
    now: Duration,
) {
    while let Some(task) = sched.pop_due(now) {
        if task == Task::Sample {
            gadget.skip_missed_samples(sched, now);
        }
        gadget.handle(task, sched, host);
    }
    sched.advance_to(now);
}
