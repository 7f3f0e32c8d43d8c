//! Priority request queue
//!
//! Requests are popped highest priority first (clear, then content change,
//! then status), first-in first-out within a priority. Equivalent requests
//! coalesce, so the queue holds at most one request of each class.

use heapless::Vec;

use crate::content::DisplayMode;
use crate::render::StatusMessage;

/// Queue capacity
pub const QUEUE_CAPACITY: usize = 4;

/// A content change: show `mode`, re-rendering it if `redraw` is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContentChange {
    pub mode: DisplayMode,
    /// Paint even if the mode is already shown and unchanged
    pub redraw: bool,
}

/// A pending state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendingRequest {
    /// Blank the panel
    Clear,
    /// Show a mode or new payload
    Content(ContentChange),
    /// Show a status message
    Status(StatusMessage),
}

impl PendingRequest {
    pub fn priority(&self) -> u8 {
        match self {
            PendingRequest::Clear => 2,
            PendingRequest::Content(_) => 1,
            PendingRequest::Status(_) => 0,
        }
    }
}

/// Bounded priority queue of requests
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    items: Vec<PendingRequest, QUEUE_CAPACITY>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn remove_where(&mut self, f: impl Fn(&PendingRequest) -> bool) {
        self.items.retain(|r| !f(r));
    }

    /// Queue a request
    ///
    /// A clear drops pending content changes. A content change replaces a
    /// pending one, keeping its `redraw` flag. Duplicates are dropped.
    /// Returns false if the queue was full.
    pub fn push(&mut self, request: PendingRequest) -> bool {
        let request = match request {
            PendingRequest::Clear => {
                self.remove_where(|r| matches!(r, PendingRequest::Content(_)));
                request
            }
            PendingRequest::Content(change) => {
                let mut merged = change;
                if let Some(PendingRequest::Content(old)) = self
                    .items
                    .iter()
                    .find(|r| matches!(r, PendingRequest::Content(_)))
                {
                    merged.redraw |= old.redraw;
                }
                self.remove_where(|r| matches!(r, PendingRequest::Content(_)));
                PendingRequest::Content(merged)
            }
            PendingRequest::Status(_) => request,
        };

        if self.items.contains(&request) {
            trace!("Coalesced {}", request);
            return true;
        }
        if self.items.push(request).is_err() {
            warn!("Request queue full, dropping {}", request);
            return false;
        }
        true
    }

    /// Drop a pending clear (a payload write supersedes it)
    pub fn cancel_clear(&mut self) {
        self.remove_where(|r| matches!(r, PendingRequest::Clear));
    }

    /// Take the highest-priority request
    pub fn pop(&mut self) -> Option<PendingRequest> {
        let mut best: Option<usize> = None;
        for (i, r) in self.items.iter().enumerate() {
            match best {
                Some(b) if self.items[b].priority() >= r.priority() => {}
                _ => best = Some(i),
            }
        }
        best.map(|i| self.items.remove(i))
    }
}
