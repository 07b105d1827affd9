use std::collections::HashMap;
use std::collections::VecDeque;

/// How many values each per-device window retains.
pub const WINDOW_CAPACITY: usize = 20;

/// The two metrics a device reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Gas,
}

/// A count-bounded FIFO of recent values. Pushing into a full window
/// evicts the oldest entry.
pub struct SlidingWindow {
    capacity: usize,
    data: VecDeque<f64>,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            data: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(value);
    }

    /// Oldest-first copy of the current contents.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Owns every per-(device, metric) window. Injected into the engine so the
/// window lifecycle is tied to the engine instance, not to module state;
/// windows are created lazily on first observation and are never persisted
/// (lost on restart).
pub struct WindowTracker {
    capacity: usize,
    windows: HashMap<(String, Metric), SlidingWindow>,
}

impl WindowTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            windows: HashMap::new(),
        }
    }

    /// Pushes `value` into the device's window for `metric`, evicting the
    /// oldest value when the window is already full.
    pub fn observe(&mut self, device_id: &str, metric: Metric, value: f64) {
        let capacity = self.capacity;
        self.windows
            .entry((device_id.to_string(), metric))
            .or_insert_with(|| SlidingWindow::new(capacity))
            .push(value);
    }

    /// Read-only snapshot of the window contents, oldest first. Empty for
    /// devices that have not reported yet.
    pub fn snapshot(&self, device_id: &str, metric: Metric) -> Vec<f64> {
        self.windows
            .get(&(device_id.to_string(), metric))
            .map(SlidingWindow::values)
            .unwrap_or_default()
    }

    /// Drops all window state. Test hook; equivalent to a process restart.
    pub fn reset(&mut self) {
        self.windows.clear();
    }
}
