use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Counting semaphore bounding how many encode chunks run at once.
pub struct Semaphore {
    free: Mutex<usize>,
    freed: Condvar,
}

/// Returns its permit to the [`Semaphore`] when dropped, including on early return.
pub struct Permit<'a> {
    sem: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        *self.sem.lock() += 1;
        self.sem.freed.notify_one();
    }
}

impl Semaphore {
    /// `permits` is clamped to at least one.
    pub fn new(permits: usize) -> Self {
        Self {
            free: Mutex::new(permits.max(1)),
            freed: Condvar::new(),
        }
    }

    // A panic while holding the count cannot leave it inconsistent, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a permit is free; also returns how long that took.
    pub fn acquire(&self) -> (Permit<'_>, Duration) {
        let start = Instant::now();
        let guard = self.lock();
        let contended = *guard == 0;
        let mut free = self
            .freed
            .wait_while(guard, |free| *free == 0)
            .unwrap_or_else(PoisonError::into_inner);
        *free -= 1;
        let waited = if contended { start.elapsed() } else { Duration::ZERO };
        (Permit { sem: self }, waited)
    }
}
