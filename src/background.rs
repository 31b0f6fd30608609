//! Threaded periodic-task registrar.

use fragstream_core::{RegisterError, Task, TaskId, TaskRegistrar, TaskTable};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Default interval between two sweeps of the task table.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(10);
/// Default number of tasks the manager accepts.
pub const DEFAULT_CAPACITY: usize = 16;

/// Runs every registered task once per period on a dedicated thread.
///
/// Tasks run one after the other, in registration order. Unregistering a task waits for the
/// sweep in progress, so a stream can release its resources as soon as
/// [`TaskRegistrar::unregister`] returns. The thread is stopped and joined on drop.
pub struct BackgroundManager {
    table: Arc<TaskTable>,
    stop_signal: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl BackgroundManager {
    pub fn new() -> std::io::Result<Self> {
        Self::with_period(DEFAULT_PERIOD, DEFAULT_CAPACITY)
    }

    /// Spawn the update thread with a custom period and task capacity.
    pub fn with_period(period: Duration, capacity: usize) -> std::io::Result<Self> {
        let table = Arc::new(TaskTable::with_capacity(capacity));
        let stop_signal = Arc::new(AtomicBool::new(false));
        let join_handle = std::thread::Builder::new()
            .name("fragstream-bg".into())
            .spawn({
                let table = table.clone();
                let stop_signal = stop_signal.clone();
                move || {
                    log::debug!(period_ms = period.as_millis() as u64; "Background thread started");
                    while !stop_signal.load(Ordering::Relaxed) {
                        table.run_all();
                        std::thread::sleep(period);
                    }
                    log::debug!("Background thread stopped");
                }
            })?;
        Ok(Self {
            table,
            stop_signal,
            join_handle: Some(join_handle),
        })
    }

    pub fn num_tasks(&self) -> usize {
        self.table.len()
    }
}

impl TaskRegistrar for BackgroundManager {
    fn register(&self, task: Task) -> Result<TaskId, RegisterError> {
        if self.stop_signal.load(Ordering::Relaxed) {
            return Err(RegisterError::ShutDown);
        }
        self.table.insert(task)
    }

    fn unregister(&self, id: TaskId) {
        self.table.remove(id)
    }
}

impl Drop for BackgroundManager {
    fn drop(&mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                log::error!("Background thread panicked");
            }
        }
    }
}
