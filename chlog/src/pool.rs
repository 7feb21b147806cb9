//! Fixed worker pool used for per-sink dispatch in synchronous mode.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    tasks: VecDeque<Task>,
    stop: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    work: Condvar,
}

pub(crate) struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Spawns `size` workers (at least one).
    pub(crate) fn new(size: usize) -> Self {
        let size = size.max(1);
        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                tasks: VecDeque::new(),
                stop: false,
            }),
            work: Condvar::new(),
        });

        let workers = (0..size)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("chlog-pool-{i}"))
                    .spawn(move || worker(&shared))
                    .expect("failed to spawn chlog pool worker")
            })
            .collect();

        Self { shared, workers }
    }

    /// Queues a task. Silently ignored once the pool is shutting down.
    pub(crate) fn execute(&self, task: impl FnOnce() + Send + 'static) {
        {
            let mut state = self.shared.state.lock();
            if state.stop {
                return;
            }
            state.tasks.push_back(Box::new(task));
        }
        self.shared.work.notify_one();
    }

    /// Drains queued tasks and joins all workers. Idempotent.
    pub(crate) fn shutdown(&mut self) {
        self.shared.state.lock().stop = true;
        self.shared.work.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker(shared: &PoolShared) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            while !state.stop && state.tasks.is_empty() {
                shared.work.wait(&mut state);
            }
            match state.tasks.pop_front() {
                Some(task) => task,
                // Stopped and drained.
                None => return,
            }
        };
        task();
    }
}
