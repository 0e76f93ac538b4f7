use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub trait Scheduler {
    fn spawn<F>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static;
}

pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn<F>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::spawn(f)
    }
}

/// Cooperative cancellation flag polled by every worker loop.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn test_thread_scheduler_spawn() {
        let scheduler = ThreadScheduler::new();
        let flag = Arc::new(Mutex::new(false));
        let flag_clone = flag.clone();

        let handle = scheduler.spawn(move || {
            let mut flag = flag_clone.lock().unwrap();
            *flag = true;
        });

        handle.join().unwrap();
        assert!(*flag.lock().unwrap());
    }

    #[test]
    fn test_stop_signal_is_shared_between_clones() {
        let stop = StopSignal::new();
        let worker_stop = stop.clone();
        let scheduler = ThreadScheduler::new();

        let handle = scheduler.spawn(move || {
            while !worker_stop.is_set() {
                thread::sleep(Duration::from_millis(1));
            }
        });

        assert!(!stop.is_set());
        stop.set();
        handle.join().unwrap();
        assert!(stop.is_set());
    }
}
