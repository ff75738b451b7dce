//! Keeps the gadget above other windows.
//!
//! Windows does not always honor a topmost request right away, and other
//! topmost windows can push the gadget down later. The enforcer pins the
//! window, then checks the extended style a few times and pins again
//! whenever the bit is missing.

use std::time::Duration;

use crate::error::StyleError;
use crate::log::LogSink;
use crate::{log_debug, log_warn};

/// Delay between topmost checks.
pub const RETRY_DELAY: Duration = Duration::from_millis(200);

/// Checks per chain.
pub const MAX_CHECKS: u32 = 10;

/// Ticks between periodic reassertions.
pub const REASSERT_EVERY: u64 = 200;

/// Always-on-top control for one window.
pub trait WindowStyler {
    /// Asks the OS to bring the window to the front and pin it topmost.
    fn pin_topmost(&mut self) -> Result<(), StyleError>;

    /// Returns whether the window currently has the topmost style bit.
    fn is_topmost(&mut self) -> Result<bool, StyleError>;
}

/// A pending topmost check to schedule `delay` from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopmostCheck {
    pub attempt: u32,
    pub delay: Duration,
}

/// Bounded retry chain around [`WindowStyler::pin_topmost`].
///
/// At most one chain is active. A request that arrives while a chain is
/// running only pins once more.
#[derive(Debug, Default)]
pub struct TopmostEnforcer {
    chain_active: bool,
}

impl TopmostEnforcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.chain_active
    }

    /// Returns true when the periodic reassertion is due for `tick_count`.
    pub fn due_on_tick(tick_count: u64) -> bool {
        tick_count > 0 && tick_count % REASSERT_EVERY == 0
    }

    /// Pins the window and starts a retry chain if none is running.
    ///
    /// Returns the first check to schedule, if a chain was started.
    pub fn begin<S: WindowStyler + ?Sized>(
        &mut self,
        styler: &mut S,
        log: &dyn LogSink,
    ) -> Option<TopmostCheck> {
        if let Err(e) = styler.pin_topmost() {
            log_warn!(log, "topmost request failed: {e}");
            return None;
        }
        if self.chain_active {
            return None;
        }
        self.chain_active = true;
        Some(TopmostCheck {
            attempt: 1,
            delay: RETRY_DELAY,
        })
    }

    /// Runs check number `attempt`. Pins again when the style bit is
    /// missing and returns the next check while attempts remain.
    pub fn check<S: WindowStyler + ?Sized>(
        &mut self,
        attempt: u32,
        styler: &mut S,
        log: &dyn LogSink,
    ) -> Option<TopmostCheck> {
        let next = self.step(attempt, styler, log);
        if next.is_none() {
            self.chain_active = false;
        }
        next
    }

    fn step<S: WindowStyler + ?Sized>(
        &mut self,
        attempt: u32,
        styler: &mut S,
        log: &dyn LogSink,
    ) -> Option<TopmostCheck> {
        match styler.is_topmost() {
            Ok(true) => {
                log_debug!(log, "topmost confirmed after {attempt} check(s)");
                return None;
            }
            Ok(false) => {}
            Err(e) => {
                log_warn!(log, "topmost query failed: {e}");
                return None;
            }
        }

        if let Err(e) = styler.pin_topmost() {
            log_warn!(log, "topmost request failed: {e}");
            return None;
        }

        if attempt >= MAX_CHECKS {
            log_debug!(log, "topmost not confirmed after {MAX_CHECKS} checks, giving up");
            return None;
        }
        Some(TopmostCheck {
            attempt: attempt + 1,
            delay: RETRY_DELAY,
        })
    }
}
