use std::sync::Arc;

use crate::attribution::EvaluationLock;
use crate::log::LogSink;

/// Process-wide collaborators handed to every gadget and scanner.
///
/// Cloning is cheap; clones share the same sink and the same evaluation
/// lock.
#[derive(Clone)]
pub struct Context {
    pub log: Arc<dyn LogSink>,
    pub evaluation: EvaluationLock,
}

impl Context {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self {
            log,
            evaluation: EvaluationLock::new(),
        }
    }
}
