use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::store::TaskStore;
use crate::theme::{ThemeMode, ThemePreference};

/// Store and theme owned by the root of the app and handed to every screen.
///
/// Every mutation goes through the lock, so hosts that touch the state from
/// more than one thread still see a single writer.
#[derive(Debug)]
pub struct AppState {
    store: Mutex<TaskStore>,
    theme: Mutex<ThemePreference>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(theme: ThemeMode) -> Self {
        Self {
            store: Mutex::new(TaskStore::new()),
            theme: Mutex::new(ThemePreference::new(theme)),
        }
    }

    pub fn shared(theme: ThemeMode) -> SharedState {
        Arc::new(Self::new(theme))
    }

    pub fn store(&self) -> MutexGuard<'_, TaskStore> {
        self.store.lock()
    }

    pub fn theme(&self) -> MutexGuard<'_, ThemePreference> {
        self.theme.lock()
    }

    pub fn is_dark_mode(&self) -> bool {
        self.theme.lock().is_dark_mode()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::AppState;
    use crate::theme::ThemeMode;

    #[test]
    fn concurrent_adds_keep_ids_unique() {
        let state = AppState::shared(ThemeMode::Light);
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let state = state.clone();
                thread::spawn(move || {
                    for n in 0..25 {
                        state.store().add(&format!("w{worker} #{n}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = state.store();
        let mut ids: Vec<u64> = store.active().iter().map(|t| t.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }
}
