//! # Synchronization Primitives
//!
//! The lock that makes a multi-step screen update (move cursor, then write)
//! atomic with respect to every other task that draws.
//!
//! The lock is scoped to the resource it protects: only tasks that want the
//! screen ever wait on it, and tasks that do not draw keep running. A waiter
//! that finds the lock taken calls its [`Backoff`] strategy before trying
//! again. On the target that strategy sleeps for one kernel tick, which lets a
//! lower-priority holder run to its unlock; on a host with OS threads plain
//! spinning is enough.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// What a waiter does between two failed acquisition attempts.
pub trait Backoff {
    fn backoff();
}

/// Busy-wait backoff. Only sound when the holder can make progress while the
/// waiter spins (OS threads, or a holder with higher priority than the
/// waiter).
pub struct Spin;

impl Backoff for Spin {
    #[inline]
    fn backoff() {
        core::hint::spin_loop();
    }
}

/// Mutual exclusion for a single owned value, acquired by test-and-set.
///
/// # Usage
/// ```ignore
/// static SCREEN_LOCK: ScreenLock<Uart, Spin> = ScreenLock::new(Uart::new());
/// let mut uart = SCREEN_LOCK.lock();
/// uart.write_byte(b'*');
/// // released when `uart` goes out of scope
/// ```
pub struct ScreenLock<T, B = Spin> {
    held: AtomicBool,
    value: UnsafeCell<T>,
    _backoff: PhantomData<fn() -> B>,
}

// Safety: access to `value` is serialized by `held`.
unsafe impl<T: Send, B> Sync for ScreenLock<T, B> {}

impl<T, B> ScreenLock<T, B> {
    /// Wrap `value` in an unlocked lock.
    pub const fn new(value: T) -> Self {
        Self {
            held: AtomicBool::new(false),
            value: UnsafeCell::new(value),
            _backoff: PhantomData,
        }
    }

    /// Try to acquire without waiting.
    pub fn try_lock(&self) -> Option<ScreenGuard<'_, T, B>> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ScreenGuard { lock: self })
    }

    /// Whether some task currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.held.load(Ordering::Relaxed)
    }

    /// Consume the lock and return the protected value.
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T, B: Backoff> ScreenLock<T, B> {
    /// Acquire the lock, backing off for as long as another task holds it.
    pub fn lock(&self) -> ScreenGuard<'_, T, B> {
        loop {
            if let Some(guard) = self.try_lock() {
                return guard;
            }
            while self.is_locked() {
                B::backoff();
            }
        }
    }
}

/// Exclusive access to the value inside a [`ScreenLock`]. Unlocks on drop.
pub struct ScreenGuard<'a, T, B> {
    lock: &'a ScreenLock<T, B>,
}

impl<T, B> Deref for ScreenGuard<'_, T, B> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: the guard exists only while `held` is set by us.
        unsafe { &*self.lock.value.get() }
    }
}

impl<T, B> DerefMut for ScreenGuard<'_, T, B> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: as above, and `&mut self` prevents aliasing through the guard.
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T, B> Drop for ScreenGuard<'_, T, B> {
    fn drop(&mut self) {
        self.lock.held.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_and_release() {
        let lock: ScreenLock<u32> = ScreenLock::new(7);
        assert!(!lock.is_locked());
        {
            let mut guard = lock.lock();
            assert!(lock.is_locked());
            *guard += 1;
        }
        assert!(!lock.is_locked());
        assert_eq!(lock.into_inner(), 8);
    }

    #[test]
    fn test_try_lock_fails_while_held() {
        let lock: ScreenLock<()> = ScreenLock::new(());
        let guard = lock.try_lock();
        assert!(guard.is_some());
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn test_contended_increments_are_not_lost() {
        let lock: ScreenLock<u32> = ScreenLock::new(0);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        let mut guard = lock.lock();
                        let seen = *guard;
                        std::thread::yield_now();
                        *guard = seen + 1;
                    }
                });
            }
        });
        assert_eq!(lock.into_inner(), 4000);
    }
}
