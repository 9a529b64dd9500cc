use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Holds at most one running task. A second [`try_acquire`](TaskSlot::try_acquire)
/// is refused until the first task's [`SlotGuard`] is dropped; there is no queue.
#[derive(Debug, Clone, Default)]
pub struct TaskSlot {
    inner: Arc<Mutex<Option<String>>>,
}

/// Occupies the slot until dropped, including when the task panics.
pub struct SlotGuard {
    inner: Arc<Mutex<Option<String>>>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, label: impl Into<String>) -> Option<SlotGuard> {
        let mut slot = lock(&self.inner);
        if slot.is_some() {
            return None;
        }
        *slot = Some(label.into());
        Some(SlotGuard { inner: Arc::clone(&self.inner), on_release: None })
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.inner).is_some()
    }

    /// Label of the running task, if any.
    pub fn current(&self) -> Option<String> {
        lock(&self.inner).clone()
    }
}

impl SlotGuard {
    /// Runs `f` once the slot is free again, on normal exit or unwind.
    pub fn on_release(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for SlotGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotGuard").field("label", &*lock(&self.inner)).finish()
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        *lock(&self.inner) = None;
        if let Some(f) = self.on_release.take() {
            f();
        }
    }
}

// The slot only ever holds an `Option<String>`, which a panicking holder
// cannot leave half-written.
fn lock(m: &Mutex<Option<String>>) -> MutexGuard<'_, Option<String>> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let slot = TaskSlot::new();
        let guard = slot.try_acquire("/scans").unwrap();
        assert!(slot.is_busy());
        assert_eq!(slot.current().as_deref(), Some("/scans"));
        assert!(slot.try_acquire("/other").is_none());

        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire("/other").is_some());
    }

    #[test]
    fn clones_share_the_slot() {
        let slot = TaskSlot::new();
        let ui_side = slot.clone();
        let _guard = slot.try_acquire("a").unwrap();
        assert!(ui_side.is_busy());
        assert!(ui_side.try_acquire("b").is_none());
    }

    #[test]
    fn guard_moved_to_thread_clears_on_completion() {
        let slot = TaskSlot::new();
        let guard = slot.try_acquire("job").unwrap();
        std::thread::spawn(move || {
            let _guard = guard;
        })
        .join()
        .unwrap();
        assert!(!slot.is_busy());
    }

    #[test]
    fn panicking_task_still_frees_the_slot() {
        let slot = TaskSlot::new();
        let guard = slot.try_acquire("job").unwrap();
        let result = std::thread::spawn(move || {
            let _guard = guard;
            panic!("extraction blew up");
        })
        .join();
        assert!(result.is_err());
        assert!(!slot.is_busy());
    }

    #[test]
    fn release_hook_runs_after_panic_with_slot_free() {
        let slot = TaskSlot::new();
        let seen = Arc::new(Mutex::new(None));
        let (watcher, record) = (slot.clone(), Arc::clone(&seen));
        let guard = slot.try_acquire("job").unwrap().on_release(move || {
            *record.lock().unwrap() = Some(watcher.is_busy());
        });

        let result = std::thread::spawn(move || {
            let _guard = guard;
            panic!("extraction blew up");
        })
        .join();

        assert!(result.is_err());
        assert_eq!(*seen.lock().unwrap(), Some(false));
    }
}
