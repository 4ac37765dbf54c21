// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Task scheduler for timed operations.
//!
//! Tasks are self-rescheduling: after every tick the next delay is drawn
//! again, so randomized delays accumulate instead of snapping to a fixed
//! period. Each task is owned by a cancellable [`TaskHandle`].

use std::collections::HashMap;
use std::time::Duration;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Owner of one scheduled task. Cancelling (or dropping) the handle stops
/// the task; a tick that has not started yet never runs.
pub struct TaskHandle {
    name: String,
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cancel(&self) {
        let _ = self.stop_tx.send(true);
        self.join.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawn a self-rescheduling task on the current tokio runtime
pub fn spawn_task<D, T>(name: &str, mut next_delay: D, mut tick: T) -> Result<TaskHandle>
where
    D: FnMut() -> Duration + Send + 'static,
    T: FnMut() + Send + 'static,
{
    let runtime = tokio::runtime::Handle::try_current()
        .with_context(|| format!("task '{}' needs a running tokio runtime", name))?;
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let task_name = name.to_string();

    let join = runtime.spawn(async move {
        loop {
            let delay = next_delay();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stop_rx.changed() => break,
            }
            if *stop_rx.borrow() {
                break;
            }
            tick();
        }
        debug!(task = %task_name, "Scheduled task stopped");
    });

    debug!(task = %name, "Scheduled task started");
    Ok(TaskHandle {
        name: name.to_string(),
        stop_tx,
        join,
    })
}

/// Named registry of scheduled tasks
pub struct Scheduler {
    tasks: Mutex<HashMap<String, TaskHandle>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule a task whose delay is re-drawn before every tick. An existing
    /// task with the same name is cancelled first.
    pub fn schedule<D, T>(&self, name: &str, next_delay: D, tick: T) -> Result<()>
    where
        D: FnMut() -> Duration + Send + 'static,
        T: FnMut() + Send + 'static,
    {
        let handle = spawn_task(name, next_delay, tick)?;
        if let Some(previous) = self.tasks.lock().insert(name.to_string(), handle) {
            warn!(task = %name, "Replacing already scheduled task");
            previous.cancel();
        }
        Ok(())
    }

    /// Schedule a task with a fixed period
    pub fn schedule_every<T>(&self, name: &str, period: Duration, tick: T) -> Result<()>
    where
        T: FnMut() + Send + 'static,
    {
        self.schedule(name, move || period, tick)
    }

    /// Cancel a task by name. Returns whether it was scheduled.
    pub fn cancel(&self, name: &str) -> bool {
        match self.tasks.lock().remove(name) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, handle) in self.tasks.lock().drain() {
            handle.cancel();
        }
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.tasks.lock().contains_key(name)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_period_ticks_until_cancelled() {
        let scheduler = Scheduler::new();
        let (count, tick) = counter();
        scheduler
            .schedule_every("probe", Duration::from_millis(100), tick)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        assert!(scheduler.cancel("probe"));
        assert!(!scheduler.cancel("probe"));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_redrawn_each_tick() {
        let scheduler = Scheduler::new();
        let (count, tick) = counter();
        let mut delays = vec![300u64, 200, 100].into_iter();
        scheduler
            .schedule(
                "jitter",
                move || Duration::from_millis(delays.next().unwrap_or(10_000)),
                tick,
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_task() {
        let (count, tick) = counter();
        let handle = spawn_task("dropped", || Duration::from_millis(50), tick).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduling_same_name_replaces() {
        let scheduler = Scheduler::new();
        let (first, tick_a) = counter();
        let (second, tick_b) = counter();
        scheduler.schedule_every("dup", Duration::from_millis(100), tick_a).unwrap();
        scheduler.schedule_every("dup", Duration::from_millis(100), tick_b).unwrap();
        assert_eq!(scheduler.task_count(), 1);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        scheduler.cancel_all();
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let (_, tick) = counter();
        assert!(spawn_task("orphan", || Duration::from_millis(1), tick).is_err());
    }
}
