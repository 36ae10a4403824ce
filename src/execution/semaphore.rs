use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A small, blocking counting semaphore bounding in-flight chunks.
pub(crate) struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

/// A held permit; released when dropped, so a failing chunk cannot leak it.
pub(crate) struct Permit<'a> {
    semaphore: &'a Semaphore,
    /// Time spent blocked before the permit was granted (zero if none).
    pub(crate) waited: Duration,
}

impl Semaphore {
    /// `permits` must be non-zero; the engine validates this before building one.
    pub(crate) fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            cv: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        // The counter stays consistent even if a holder panicked.
        self.permits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire one permit, blocking until available.
    pub(crate) fn acquire(&self) -> Permit<'_> {
        let start = Instant::now();
        let mut waited = false;
        let mut g = self.lock();
        while *g == 0 {
            waited = true;
            g = self.cv.wait(g).unwrap_or_else(PoisonError::into_inner);
        }
        *g -= 1;
        Permit {
            semaphore: self,
            waited: if waited { start.elapsed() } else { Duration::ZERO },
        }
    }

    fn release(&self) {
        let mut g = self.lock();
        *g += 1;
        self.cv.notify_one();
    }

    #[cfg(test)]
    fn available(&self) -> usize {
        *self.lock()
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}

#[cfg(test)]
mod tests {
    use super::Semaphore;

    #[test]
    fn permits_return_on_drop() {
        let sem = Semaphore::new(2);
        let a = sem.acquire();
        let b = sem.acquire();
        assert_eq!(sem.available(), 0);
        drop(a);
        assert_eq!(sem.available(), 1);
        drop(b);
        assert_eq!(sem.available(), 2);
    }

    #[test]
    fn waiter_is_woken_by_release() {
        let sem = Semaphore::new(1);
        let held = sem.acquire();
        std::thread::scope(|s| {
            let waiter = s.spawn(|| sem.acquire().waited);
            std::thread::sleep(std::time::Duration::from_millis(10));
            drop(held);
            assert!(waiter.join().unwrap() > std::time::Duration::ZERO);
        });
    }
}
