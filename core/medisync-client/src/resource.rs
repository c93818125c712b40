//! The generic synchronized resource.
//!
//! A [`SyncedResource`] keeps one typed value consistent between memory
//! and a [`ResourceBackend`], tracking loading/error/dirty state and
//! coalescing rapid `update` calls into a single debounced save.

use crate::backend::ResourceBackend;
use crate::config::SyncOptions;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Snapshot of a resource's sync state.
struct ResourceState<T> {
    /// Current in-memory value.
    value: Option<T>,
    /// True only while a load, save, or remove is in flight.
    is_loading: bool,
    /// Message from the most recent failed operation.
    error: Option<String>,
    /// True iff the value diverged from the last successful save/load.
    is_dirty: bool,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            value: None,
            is_loading: false,
            error: None,
            is_dirty: false,
        }
    }
}

struct Inner<T> {
    backend: Arc<dyn ResourceBackend>,
    options: SyncOptions,
    state: Mutex<ResourceState<T>>,
    /// Pending debounced autosave task, if any.
    pending_save: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        // A discarded resource must never fire a queued save.
        if let Ok(mut pending) = self.pending_save.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

/// A typed value kept in sync with a remote slot.
///
/// Cheap to clone; all clones share the same state and debounce timer.
/// Operations never panic and never return errors directly: failures
/// land in [`error`](Self::error) and the operation's return value.
///
/// Overlapping `load`/`save`/`remove` calls are not serialized against
/// each other; the last one to finish wins the in-memory state.
pub struct SyncedResource<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SyncedResource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SyncedResource<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates a resource over `backend` with the given options.
    ///
    /// The value starts as `None` with all flags clear.
    pub fn new(backend: Arc<dyn ResourceBackend>, options: SyncOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                options,
                state: Mutex::new(ResourceState::default()),
                pending_save: Mutex::new(None),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ResourceState<T>> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the value from the backend.
    ///
    /// On success the in-memory value is replaced and the dirty flag
    /// cleared. On failure `error` is set and `None` returned. The
    /// loading flag is cleared on every exit path.
    pub async fn load(&self) -> Option<T> {
        {
            let mut state = self.state();
            state.is_loading = true;
            state.error = None;
        }

        let result = match self.inner.backend.load().await {
            Ok(raw) => match raw.map(serde_json::from_value::<T>).transpose() {
                Ok(value) => {
                    let mut state = self.state();
                    state.value = value.clone();
                    state.is_dirty = false;
                    value
                }
                Err(e) => {
                    self.state().error = Some(format!("failed to decode value: {e}"));
                    None
                }
            },
            Err(e) => {
                self.state().error = Some(e.to_string());
                None
            }
        };

        self.state().is_loading = false;
        result
    }

    /// Saves the current value to the backend.
    ///
    /// Returns `false` without a network call when there is no value.
    pub async fn save(&self) -> bool {
        self.save_inner(None).await
    }

    /// Saves `new_value` to the backend; on success it replaces the
    /// in-memory value.
    pub async fn save_with(&self, new_value: T) -> bool {
        self.save_inner(Some(new_value)).await
    }

    async fn save_inner(&self, new_value: Option<T>) -> bool {
        let explicit = new_value.is_some();
        let candidate = match new_value {
            Some(value) => Some(value),
            None => self.state().value.clone(),
        };
        let Some(value) = candidate else {
            return false;
        };

        {
            let mut state = self.state();
            state.is_loading = true;
            state.error = None;
        }

        let result = match serde_json::to_value(&value) {
            Ok(json) => match self.inner.backend.save(&json).await {
                Ok(()) => {
                    let mut state = self.state();
                    if explicit {
                        state.value = Some(value);
                    }
                    state.is_dirty = false;
                    true
                }
                Err(e) => {
                    // Dirty flag stays set: the value is still unsaved.
                    self.state().error = Some(e.to_string());
                    false
                }
            },
            Err(e) => {
                self.state().error = Some(format!("failed to encode value: {e}"));
                false
            }
        };

        self.state().is_loading = false;
        result
    }

    /// Replaces the in-memory value and marks the resource dirty.
    ///
    /// Synchronous and infallible. With `auto_sync` enabled this
    /// (re)arms the debounce timer: each call restarts the countdown,
    /// and only the most recent value is ever sent.
    ///
    /// Must be called from within a tokio runtime when `auto_sync` is
    /// enabled.
    pub fn update(&self, new_value: T) {
        {
            let mut state = self.state();
            state.value = Some(new_value);
            state.is_dirty = true;
        }

        if self.inner.options.auto_sync {
            self.arm_autosave();
        }
    }

    fn arm_autosave(&self) {
        let delay = Duration::from_millis(self.inner.options.debounce_ms);
        // The task holds only a weak reference, so dropping the last
        // resource handle drops Inner, which aborts the task.
        let weak = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                debug!("Debounce timer fired, autosaving");
                let resource = SyncedResource { inner };
                let _ = resource.save().await;
            }
        });

        let mut pending = self
            .inner
            .pending_save
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Deletes the value from the backend.
    ///
    /// On success the in-memory value is cleared along with the dirty
    /// flag.
    pub async fn remove(&self) -> bool {
        {
            let mut state = self.state();
            state.is_loading = true;
            state.error = None;
        }

        let result = match self.inner.backend.remove().await {
            Ok(()) => {
                let mut state = self.state();
                state.value = None;
                state.is_dirty = false;
                true
            }
            Err(e) => {
                self.state().error = Some(e.to_string());
                false
            }
        };

        self.state().is_loading = false;
        result
    }

    /// The current in-memory value.
    pub fn value(&self) -> Option<T> {
        self.state().value.clone()
    }

    /// Whether a load, save, or remove is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    /// Message from the most recent failed operation.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Whether the value diverged from the last successful save/load.
    pub fn is_dirty(&self) -> bool {
        self.state().is_dirty
    }

    /// Not loading and no recorded error.
    pub fn is_online(&self) -> bool {
        let state = self.state();
        !state.is_loading && state.error.is_none()
    }

    /// Whether a value is present in memory.
    pub fn has_data(&self) -> bool {
        self.state().value.is_some()
    }
}
