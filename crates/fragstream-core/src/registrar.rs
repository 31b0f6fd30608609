//! Periodic-task registration. The registrar owns the scheduling thread (or loop); streams only
//! hand it a callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::RegisterError;

/// Callback invoked once per scheduling period.
pub type Task = Arc<dyn Fn() + Send + Sync>;

/// Identifies a registered task so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Allocate a process-wide unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Registry of periodic tasks.
///
/// Implementations never run a task concurrently with itself, and [`TaskRegistrar::unregister`]
/// returns only once any in-progress invocation of the task has completed.
pub trait TaskRegistrar: Send + Sync {
    fn register(&self, task: Task) -> Result<TaskId, RegisterError>;

    fn unregister(&self, id: TaskId);
}

impl<R: TaskRegistrar + ?Sized> TaskRegistrar for Arc<R> {
    fn register(&self, task: Task) -> Result<TaskId, RegisterError> {
        (**self).register(task)
    }

    fn unregister(&self, id: TaskId) {
        (**self).unregister(id)
    }
}

/// Ordered task table with a capacity limit. Running the table holds its lock, which is what
/// makes `unregister` wait for an in-progress sweep.
#[derive(Default)]
pub struct TaskTable {
    tasks: Mutex<Vec<(TaskId, Task)>>,
    capacity: Option<usize>,
}

impl TaskTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: Mutex::default(),
            capacity: Some(capacity),
        }
    }

    pub fn insert(&self, task: Task) -> Result<TaskId, RegisterError> {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(capacity) = self.capacity {
            if tasks.len() >= capacity {
                return Err(RegisterError::Full(capacity));
            }
        }
        let id = TaskId::next();
        tasks.push((id, task));
        Ok(id)
    }

    pub fn remove(&self, id: TaskId) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|(task_id, _)| *task_id != id);
    }

    pub fn len(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every task once, in registration order.
    pub fn run_all(&self) {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, task) in tasks.iter() {
            task();
        }
    }
}

/// Registrar for hosts that drive audio updates from their own loop instead of a background
/// thread. Call [`ManualRegistrar::run_pending`] once per period.
#[derive(Default)]
pub struct ManualRegistrar {
    table: TaskTable,
}

impl ManualRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_pending(&self) {
        self.table.run_all();
    }

    pub fn num_tasks(&self) -> usize {
        self.table.len()
    }
}

impl TaskRegistrar for ManualRegistrar {
    fn register(&self, task: Task) -> Result<TaskId, RegisterError> {
        self.table.insert(task)
    }

    fn unregister(&self, id: TaskId) {
        self.table.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_register_run_unregister() {
        let registrar = ManualRegistrar::new();
        let count = Arc::new(AtomicUsize::new(0));
        let id = registrar
            .register(Arc::new({
                let count = count.clone();
                move || {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            }))
            .unwrap();
        registrar.run_pending();
        registrar.run_pending();
        assert_eq!(2, count.load(Ordering::SeqCst));

        registrar.unregister(id);
        registrar.run_pending();
        assert_eq!(2, count.load(Ordering::SeqCst));
        assert_eq!(0, registrar.num_tasks());
    }

    #[test]
    fn test_capacity() {
        let table = TaskTable::with_capacity(1);
        table.insert(Arc::new(|| {})).unwrap();
        assert_eq!(
            Err(RegisterError::Full(1)),
            table.insert(Arc::new(|| {}))
        );
    }
}
