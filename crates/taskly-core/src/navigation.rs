use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::state::SharedState;
use crate::task::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tasks,
    CompletedTasks,
}

impl Route {
    pub fn title(self) -> &'static str {
        match self {
            Self::Tasks => "Taskly",
            Self::CompletedTasks => "Completed Tasks",
        }
    }
}

/// Stack navigator rooted at [`Route::Tasks`].
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            stack: vec![Route::Tasks],
        }
    }
}

impl Navigator {
    pub fn current(&self) -> Route {
        self.stack.last().copied().unwrap_or(Route::Tasks)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn navigate(&mut self, route: Route) {
        if self.current() == route {
            debug!(?route, "already on route");
            return;
        }
        self.stack.push(route);
        debug!(?route, depth = self.stack.len(), "pushed route");
    }

    /// Pops one route. Returns false on the root, which is never popped.
    pub fn go_back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        let popped = self.stack.pop();
        debug!(?popped, depth = self.stack.len(), "popped route");
        true
    }
}

pub type OnDelete = Arc<dyn Fn(TaskId) + Send + Sync>;

/// What the completed-tasks view receives on transition: the live shared state
/// and a delete callback bound to the store that opened it.
#[derive(Clone)]
pub struct CompletedTasksParams {
    pub state: SharedState,
    pub on_delete: OnDelete,
}

impl CompletedTasksParams {
    pub fn bound_to(state: SharedState) -> Self {
        let target = state.clone();
        let on_delete: OnDelete = Arc::new(move |id| target.store().delete_completed(id));
        Self { state, on_delete }
    }
}

impl fmt::Debug for CompletedTasksParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletedTasksParams")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletedTasksParams, Navigator, Route};
    use crate::state::AppState;
    use crate::task::TaskId;
    use crate::theme::ThemeMode;

    #[test]
    fn root_is_never_popped() {
        let mut nav = Navigator::default();
        assert_eq!(nav.current(), Route::Tasks);
        assert!(!nav.go_back());

        nav.navigate(Route::CompletedTasks);
        nav.navigate(Route::CompletedTasks);
        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.current(), Route::CompletedTasks);

        assert!(nav.go_back());
        assert_eq!(nav.current(), Route::Tasks);
        assert!(!nav.go_back());
    }

    #[test]
    fn delete_callback_reaches_originating_store() {
        let state = AppState::shared(ThemeMode::Light);
        {
            let mut store = state.store();
            store.add("a").unwrap();
            store.complete(TaskId(1)).unwrap();
        }

        let params = CompletedTasksParams::bound_to(state.clone());
        (params.on_delete)(TaskId(1));

        assert!(state.store().completed().is_empty());
    }
}
