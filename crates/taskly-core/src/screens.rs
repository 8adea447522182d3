//! View models for the two screens. They hold input and menu state, and read
//! and write tasks only through the shared [`AppState`](crate::state::AppState).

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::navigation::{CompletedTasksParams, Navigator, Route};
use crate::state::SharedState;
use crate::store::StoreError;
use crate::task::{Task, TaskId};

pub const EMPTY_COMPLETED_MESSAGE: &str = "No completed tasks yet!";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideConfig {
    pub width: f32,
    pub duration: Duration,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            duration: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slide {
    from: f32,
    to: f32,
    started: Instant,
}

/// Settings drawer that slides in from the left edge.
///
/// Offset is `-width` when hidden and `0` when shown.
#[derive(Debug, Clone)]
pub struct SettingsPanel {
    cfg: SlideConfig,
    visible: bool,
    slide: Option<Slide>,
}

impl SettingsPanel {
    pub fn new(cfg: SlideConfig) -> Self {
        Self {
            cfg,
            visible: false,
            slide: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn rest_offset(&self, visible: bool) -> f32 {
        if visible { 0.0 } else { -self.cfg.width }
    }

    pub fn toggle(&mut self, now: Instant) {
        let from = self.offset_at(now);
        self.visible = !self.visible;
        self.slide = Some(Slide {
            from,
            to: self.rest_offset(self.visible),
            started: now,
        });
        debug!(visible = self.visible, from, "settings panel toggled");
    }

    pub fn offset_at(&self, now: Instant) -> f32 {
        let Some(slide) = self.slide else {
            return self.rest_offset(self.visible);
        };

        let total = self.cfg.duration.as_secs_f32();
        let elapsed = now.saturating_duration_since(slide.started).as_secs_f32();
        if total <= 0.0 || elapsed >= total {
            return slide.to;
        }
        slide.from + (slide.to - slide.from) * (elapsed / total)
    }
}

#[derive(Debug)]
pub struct TasksScreen {
    state: SharedState,
    draft: String,
    query: String,
    edit_buffers: BTreeMap<TaskId, String>,
    settings: SettingsPanel,
}

impl TasksScreen {
    pub fn new(state: SharedState, slide: SlideConfig) -> Self {
        Self {
            state,
            draft: String::new(),
            query: String::new(),
            edit_buffers: BTreeMap::new(),
            settings: SettingsPanel::new(slide),
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Adds the draft as a new task. The draft is cleared only on success.
    #[instrument(skip(self))]
    pub fn submit_draft(&mut self) -> Result<Task, StoreError> {
        let task = self.state.store().add(&self.draft)?;
        self.draft.clear();
        Ok(task)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn visible_tasks(&self) -> Vec<Task> {
        self.state.store().search(&self.query)
    }

    pub fn begin_edit(&mut self, id: TaskId) {
        let mut store = self.state.store();
        store.begin_edit(id);
        if let Some(task) = store.get_active(id) {
            self.edit_buffers
                .entry(id)
                .or_insert_with(|| task.title.clone());
        }
    }

    /// Replaces the inline edit text of a task in edit mode.
    pub fn type_edit(&mut self, id: TaskId, text: impl Into<String>) -> Result<(), StoreError> {
        let editing = self
            .state
            .store()
            .get_active(id)
            .is_some_and(|t| t.is_editing);
        if !editing {
            return Err(StoreError::NotFound(id));
        }
        self.edit_buffers.insert(id, text.into());
        Ok(())
    }

    pub fn edit_text(&self, id: TaskId) -> Option<&str> {
        self.edit_buffers.get(&id).map(String::as_str)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub fn submit_edit(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let mut store = self.state.store();
        let text = match self.edit_buffers.get(&id) {
            Some(text) => text.clone(),
            None => store
                .get_active(id)
                .map(|t| t.title.clone())
                .ok_or(StoreError::NotFound(id))?,
        };

        let saved = store.commit_edit(id, &text)?;
        self.edit_buffers.remove(&id);
        Ok(saved)
    }

    pub fn blur_edit(&mut self, id: TaskId) -> Result<Task, StoreError> {
        self.submit_edit(id)
    }

    pub fn delete(&mut self, id: TaskId) {
        self.state.store().delete_active(id);
        self.edit_buffers.remove(&id);
    }

    pub fn complete(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let task = self.state.store().complete(id)?;
        self.edit_buffers.remove(&id);
        Ok(task)
    }

    pub fn settings(&self) -> &SettingsPanel {
        &self.settings
    }

    pub fn toggle_settings(&mut self, now: Instant) {
        self.settings.toggle(now);
    }

    pub fn choose_light(&self) {
        self.state.theme().set_light();
    }

    pub fn choose_dark(&self) {
        self.state.theme().set_dark();
    }

    pub fn open_completed(&self, nav: &mut Navigator) -> CompletedTasksScreen {
        nav.navigate(Route::CompletedTasks);
        CompletedTasksScreen::new(CompletedTasksParams::bound_to(self.state.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct CompletedTasksScreen {
    params: CompletedTasksParams,
}

impl CompletedTasksScreen {
    pub fn new(params: CompletedTasksParams) -> Self {
        Self { params }
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.params.state.store().completed().to_vec()
    }

    pub fn is_empty(&self) -> bool {
        self.params.state.store().completed().is_empty()
    }

    pub fn delete(&self, id: TaskId) {
        (self.params.on_delete)(id);
    }
}
