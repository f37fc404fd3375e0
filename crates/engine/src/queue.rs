//! Pausable step queue
//!
//! Steps run strictly in FIFO order and a step only starts once the previous
//! one has fully resolved. The queue itself is plain data owned by the
//! process; pausing and cancelling go through a [`QueueControl`], a cheap
//! cloneable handle that another task can hold while the queue is running.
//!
//! # Epochs
//!
//! Every [`QueueControl::reset`] starts a new epoch. A run records the epoch
//! it started in; once the epoch moves on, the run is cancelled at its next
//! suspension point (waiting on a pause, or inside an in-flight step).

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ControlState {
    paused: bool,
    epoch: u64,
}

/// Pause / resume / reset handle for a [`StepQueue`]
#[derive(Debug, Clone)]
pub struct QueueControl {
    tx: Arc<watch::Sender<ControlState>>,
}

impl Default for QueueControl {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueControl {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ControlState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Suspend before the next un-started step
    pub fn pause(&self) {
        self.tx.send_modify(|state| state.paused = true);
    }

    pub fn resume(&self) {
        self.tx.send_modify(|state| state.paused = false);
    }

    /// Cancel the current run (if any) and clear the pause
    pub fn reset(&self) {
        self.tx.send_modify(|state| {
            state.epoch = state.epoch.wrapping_add(1);
            state.paused = false;
        });
    }

    pub fn is_paused(&self) -> bool {
        self.tx.borrow().paused
    }

    pub fn epoch(&self) -> u64 {
        self.tx.borrow().epoch
    }

    /// Wait until the queue is not paused.
    ///
    /// Returns `false` if the run started in `epoch` was reset meanwhile.
    pub async fn wait_resumed(&self, epoch: u64) -> bool {
        let mut rx = self.tx.subscribe();
        let current = match rx.wait_for(|state| !state.paused || state.epoch != epoch).await {
            Ok(state) => state.epoch,
            Err(_) => return false,
        };
        current == epoch
    }

    /// Completes once the run started in `epoch` has been reset
    pub async fn cancelled(&self, epoch: u64) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|state| state.epoch != epoch).await;
    }
}

/// FIFO of pending steps plus the count of steps already executed
#[derive(Debug)]
pub struct StepQueue<S> {
    steps: VecDeque<S>,
    executed: usize,
    control: QueueControl,
}

impl<S> Default for StepQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StepQueue<S> {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            executed: 0,
            control: QueueControl::new(),
        }
    }

    pub fn push(&mut self, step: S) {
        self.steps.push_back(step);
    }

    /// Take the next step to run
    pub fn take_next(&mut self) -> Option<S> {
        self.steps.pop_front()
    }

    /// Record that the step taken by [`StepQueue::take_next`] has completed
    pub fn complete_step(&mut self) {
        self.executed += 1;
    }

    /// Index of the next step to run, counted since the queue was created
    pub fn current_step(&self) -> usize {
        self.executed
    }

    /// Steps waiting to run
    pub fn pending(&self) -> impl Iterator<Item = &S> + '_ {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Drop every pending step
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn control(&self) -> &QueueControl {
        &self.control
    }
}

impl<S> Extend<S> for StepQueue<S> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.steps.extend(iter);
    }
}
