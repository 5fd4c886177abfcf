//! Ordered log of handler invocations.

use onboard_core::{HandlerKind, ProvisioningContext};
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded handler call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Handler that was invoked
    pub kind: HandlerKind,
    /// Context as the handler received it (empty for signup)
    pub context: ProvisioningContext,
}

/// Shared, cloneable call log
#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: HandlerKind, context: &ProvisioningContext) {
        self.calls.lock().push(RecordedCall {
            kind,
            context: context.clone(),
        });
    }

    /// Handler kinds in call order
    pub fn calls(&self) -> Vec<HandlerKind> {
        self.calls.lock().iter().map(|call| call.kind).collect()
    }

    /// Full records in call order
    pub fn records(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, kind: HandlerKind) -> usize {
        self.calls.lock().iter().filter(|call| call.kind == kind).count()
    }

    pub fn was_called(&self, kind: HandlerKind) -> bool {
        self.count(kind) > 0
    }

    /// Context seen by the first call of `kind`
    pub fn context_seen_by(&self, kind: HandlerKind) -> Option<ProvisioningContext> {
        self.calls
            .lock()
            .iter()
            .find(|call| call.kind == kind)
            .map(|call| call.context.clone())
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
