use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Sender};

/// Trailing-edge debounce as a pure state machine: Idle, or Pending with
/// a deadline. Callers supply every `Instant`, so tests drive it without
/// sleeping.
#[derive(Debug)]
pub struct DebounceState {
    window: Duration,
    deadline: Option<Instant>,
}

impl DebounceState {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the timer: the deadline becomes `now + window`,
    /// replacing any pending deadline.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// True when a pending deadline has elapsed; clears the pending
    /// state so the action fires exactly once per quiet window.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Remaining wait before the pending deadline, if any.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Runs one action on a worker thread after a quiet window, coalescing
/// bursts of [`trigger`](Debouncer::trigger) calls into a single
/// execution. A trigger arriving while a run is pending replaces the
/// deadline; the last trigger always fires.
pub struct Debouncer {
    triggers: Sender<()>,
    stop: Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Debouncer {
    pub fn new<F>(window: Duration, action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (trigger_tx, trigger_rx) = unbounded::<()>();
        let (stop_tx, stop_rx) = unbounded::<()>();
        let handle = thread::spawn(move || {
            let mut state = DebounceState::new(window);
            let mut action = action;
            loop {
                if let Some(wait) = state.time_until_due(Instant::now()) {
                    crossbeam_channel::select! {
                        recv(stop_rx) -> _ => break,
                        recv(trigger_rx) -> msg => match msg {
                            Ok(()) => state.trigger(Instant::now()),
                            Err(_) => break,
                        },
                        default(wait) => {
                            if state.poll(Instant::now()) {
                                action();
                            }
                        }
                    }
                } else {
                    crossbeam_channel::select! {
                        recv(stop_rx) -> _ => break,
                        recv(trigger_rx) -> msg => match msg {
                            Ok(()) => state.trigger(Instant::now()),
                            Err(_) => break,
                        },
                    }
                }
            }
        });
        Self {
            triggers: trigger_tx,
            stop: stop_tx,
            handle: Some(handle),
        }
    }

    /// Requests a run after the quiet window, replacing any pending one.
    pub fn trigger(&self) {
        let _ = self.triggers.send(());
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
