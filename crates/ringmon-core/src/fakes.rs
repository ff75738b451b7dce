//! Test doubles for the platform capabilities.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, SystemTime};

use crate::error::{SamplerError, ScanError, StyleError};
use crate::gadget::GadgetHost;
use crate::palette::Brush;
use crate::rect::Position;
use crate::ring::Ring;
use crate::sampler::{CpuSampler, ProcessCpuSampler, ProcessSnapshot};
use crate::topmost::WindowStyler;

/// Replays a fixed sequence of readings, then repeats the last one.
pub struct ScriptedSampler {
    values: Vec<Result<u8, SamplerError>>,
    next: usize,
}

impl ScriptedSampler {
    pub fn new(values: impl IntoIterator<Item = u8>) -> Self {
        Self::with_results(values.into_iter().map(Ok))
    }

    pub fn with_results(values: impl IntoIterator<Item = Result<u8, SamplerError>>) -> Self {
        Self {
            values: values.into_iter().collect(),
            next: 0,
        }
    }
}

impl CpuSampler for ScriptedSampler {
    fn sample(&mut self) -> Result<u8, SamplerError> {
        let Some(last) = self.values.len().checked_sub(1) else {
            return Err(SamplerError::ReadFailed("no values scripted".into()));
        };
        let value = self.values[self.next.min(last)].clone();
        self.next += 1;
        value
    }
}

pub fn snapshot(pid: u32, name: &str, total_cpu_secs: f64) -> ProcessSnapshot {
    ProcessSnapshot {
        pid,
        name: name.into(),
        window_title: None,
        total_cpu_time: Duration::from_secs_f64(total_cpu_secs),
        working_set: 64 * 1024 * 1024,
        thread_count: 12,
        start_time: Some(SystemTime::UNIX_EPOCH),
    }
}

/// How a fake process reacts to `cpu_time`.
#[derive(Clone, Copy)]
pub enum Behavior {
    /// Burns this much CPU time between consecutive reads.
    Busy(Duration),
    Idle,
    Denied,
    Exits,
}

/// Synthetic process table.
pub struct FakeProcesses {
    pub list: Vec<ProcessSnapshot>,
    pub behavior: HashMap<u32, Behavior>,
    pub cores: usize,
    pub fail_enumeration: bool,
    pub panic_on_enumeration: bool,
    pub enumerations: AtomicUsize,
    pub measured: Mutex<Vec<u32>>,
    reads: Mutex<HashMap<u32, u32>>,
    gate: Option<(Mutex<bool>, Condvar)>,
}

impl FakeProcesses {
    pub fn new(list: Vec<ProcessSnapshot>) -> Self {
        Self {
            list,
            behavior: HashMap::new(),
            cores: 4,
            fail_enumeration: false,
            panic_on_enumeration: false,
            enumerations: AtomicUsize::new(0),
            measured: Mutex::new(Vec::new()),
            reads: Mutex::new(HashMap::new()),
            gate: None,
        }
    }

    pub fn with(mut self, pid: u32, behavior: Behavior) -> Self {
        self.behavior.insert(pid, behavior);
        self
    }

    /// Makes `processes()` block until [`FakeProcesses::open_gate`].
    pub fn gated(mut self) -> Self {
        self.gate = Some((Mutex::new(false), Condvar::new()));
        self
    }

    pub fn open_gate(&self) {
        if let Some((open, cv)) = &self.gate {
            *open.lock().unwrap() = true;
            cv.notify_all();
        }
    }

    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub fn measured(&self) -> Vec<u32> {
        let mut pids = self.measured.lock().unwrap().clone();
        pids.dedup();
        pids
    }
}

impl ProcessCpuSampler for FakeProcesses {
    fn processes(&self) -> Result<Vec<ProcessSnapshot>, ScanError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        if let Some((open, cv)) = &self.gate {
            let mut open = open.lock().unwrap();
            while !*open {
                open = cv.wait(open).unwrap();
            }
        }
        if self.panic_on_enumeration {
            panic!("enumeration blew up");
        }
        if self.fail_enumeration {
            return Err(ScanError::Enumeration("snapshot failed".into()));
        }
        Ok(self.list.clone())
    }

    fn cpu_time(&self, pid: u32) -> Result<Duration, ScanError> {
        self.measured.lock().unwrap().push(pid);
        let reads = {
            let mut reads = self.reads.lock().unwrap();
            let n = reads.entry(pid).or_insert(0);
            *n += 1;
            *n
        };
        let base = self
            .list
            .iter()
            .find(|p| p.pid == pid)
            .map(|p| p.total_cpu_time)
            .unwrap_or_default();
        match self.behavior.get(&pid).copied().unwrap_or(Behavior::Idle) {
            Behavior::Busy(step) => Ok(base + step * reads),
            Behavior::Idle => Ok(base),
            Behavior::Denied => Err(ScanError::AccessDenied { pid }),
            Behavior::Exits if reads > 1 => Err(ScanError::ProcessExited { pid }),
            Behavior::Exits => Ok(base),
        }
    }

    fn core_count(&self) -> usize {
        self.cores
    }
}

/// Window styler whose topmost query answers from a script.
pub struct FakeStyler {
    /// Answers to `is_topmost`, in order; the last one repeats.
    pub answers: Vec<Result<bool, StyleError>>,
    queries: usize,
    pub pins: Vec<Duration>,
    /// Clock read when a pin is recorded.
    pub clock: Duration,
}

impl FakeStyler {
    pub fn never_topmost() -> Self {
        Self::answering([false])
    }

    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().map(Ok).collect(),
            queries: 0,
            pins: Vec::new(),
            clock: Duration::ZERO,
        }
    }

    pub fn queries(&self) -> usize {
        self.queries
    }
}

impl WindowStyler for FakeStyler {
    fn pin_topmost(&mut self) -> Result<(), StyleError> {
        self.pins.push(self.clock);
        Ok(())
    }

    fn is_topmost(&mut self) -> Result<bool, StyleError> {
        let last = self.answers.len().saturating_sub(1);
        let answer = match self.answers.get(self.queries.min(last)) {
            Some(Ok(v)) => Ok(*v),
            Some(Err(StyleError::InvalidWindow)) => Err(StyleError::InvalidWindow),
            Some(Err(StyleError::Platform(m))) => Err(StyleError::Platform(m.clone())),
            None => Ok(false),
        };
        self.queries += 1;
        answer
    }
}

/// A gadget window that records everything it is asked to do.
pub struct FakeHost {
    pub styler: FakeStyler,
    pub paints: Vec<(Duration, Ring, u8, Brush)>,
    pub captions: Vec<String>,
    pub position: Position,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            styler: FakeStyler::answering([true]),
            paints: Vec::new(),
            captions: Vec::new(),
            position: Position { x: 0, y: 0 },
        }
    }

    pub fn set_clock(&mut self, now: Duration) {
        self.styler.clock = now;
    }

    /// Times and values of paints for one ring.
    pub fn paints_of(&self, ring: Ring) -> Vec<(Duration, u8)> {
        self.paints
            .iter()
            .filter(|p| p.1 == ring)
            .map(|p| (p.0, p.2))
            .collect()
    }
}

impl WindowStyler for FakeHost {
    fn pin_topmost(&mut self) -> Result<(), StyleError> {
        self.styler.pin_topmost()
    }

    fn is_topmost(&mut self) -> Result<bool, StyleError> {
        self.styler.is_topmost()
    }
}

impl GadgetHost for FakeHost {
    fn paint_ring(&mut self, ring: Ring, value: u8, brush: &Brush) {
        self.paints.push((self.styler.clock, ring, value, *brush));
    }

    fn set_caption(&mut self, caption: &str) {
        self.captions.push(caption.to_string());
    }

    fn position(&self) -> Position {
        self.position
    }
}
