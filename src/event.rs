use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::app::{Frame, Monitor, View};
use crate::config::RefreshConfig;

/// A periodic sampling task for one view.
///
/// Each tick runs the blocking sample on tokio's blocking pool while
/// holding the monitor lock, then sends the frame. Dropping the cadence
/// aborts the task and marks it cancelled; a tick still waiting for the
/// monitor lock then skips its sample. A sample that has already started
/// runs to completion and its frame is discarded, so a Graphs sample in
/// flight at a view switch still advances the rate tracker and history.
pub struct Cadence {
    view: View,
    rx: mpsc::UnboundedReceiver<Frame>,
    task: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

impl Cadence {
    pub fn start(view: View, period: Duration, monitor: Arc<Mutex<Monitor>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Frame>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancelled);

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;

                let monitor = Arc::clone(&monitor);
                let cancel_flag = Arc::clone(&cancel_flag);
                let sampled = tokio::task::spawn_blocking(move || {
                    let mut guard = monitor.lock().unwrap_or_else(|e| e.into_inner());
                    if cancel_flag.load(Ordering::Acquire) {
                        return None;
                    }
                    Some(guard.sample(view))
                })
                .await;

                let frame = match sampled {
                    Ok(Some(frame)) => frame,
                    Ok(None) => break,
                    Err(err) => {
                        error!(view = view.label(), error = %err, "sampling task failed");
                        break;
                    }
                };
                if tx.send(frame).is_err() {
                    break;
                }
            }
        });

        debug!(view = view.label(), period_ms = period.as_millis() as u64, "cadence started");
        Self {
            view,
            rx,
            task,
            cancelled,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub async fn next(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Cadence {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.task.abort();
        debug!(view = self.view.label(), "cadence stopped");
    }
}

/// Keeps at most one cadence live. Switching views stops the old cadence
/// before the new one starts, so the monitor never sees overlapping callers
/// from two views.
pub struct Driver {
    monitor: Arc<Mutex<Monitor>>,
    periods: RefreshConfig,
    current: Option<Cadence>,
}

impl Driver {
    pub fn new(monitor: Monitor, periods: RefreshConfig) -> Self {
        Self {
            monitor: Arc::new(Mutex::new(monitor)),
            periods,
            current: None,
        }
    }

    pub fn view(&self) -> Option<View> {
        self.current.as_ref().map(Cadence::view)
    }

    pub fn switch(&mut self, view: View) {
        if let Some(previous) = self.current.take() {
            previous.stop();
        }
        let period = self.periods.period(view);
        self.current = Some(Cadence::start(view, period, Arc::clone(&self.monitor)));
    }

    pub fn stop(&mut self) {
        self.current = None;
    }

    /// `None` once stopped.
    pub async fn next(&mut self) -> Option<Frame> {
        match self.current.as_mut() {
            Some(cadence) => cadence.next().await,
            None => None,
        }
    }
}
