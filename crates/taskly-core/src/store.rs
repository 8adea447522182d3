use tracing::{debug, instrument};

use crate::task::{Task, TaskId, normalize_title};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Task cannot be empty. Please enter a valid task.")]
    EmptyTitle,
    #[error("task {0} not found")]
    NotFound(TaskId),
}

/// Owns the active and completed lists.
///
/// Ids come from a counter that only moves forward, so a task added after a
/// deletion never collides with one still held in either list.
#[derive(Debug, Clone)]
pub struct TaskStore {
    active: Vec<Task>,
    completed: Vec<Task>,
    last_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            completed: Vec::new(),
            last_id: 0,
        }
    }

    pub fn active(&self) -> &[Task] {
        &self.active
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn get_active(&self, id: TaskId) -> Option<&Task> {
        self.active.iter().find(|t| t.id == id)
    }

    pub fn get_completed(&self, id: TaskId) -> Option<&Task> {
        self.completed.iter().find(|t| t.id == id)
    }

    /// Id the next successful `add` will hand out.
    pub fn next_id(&self) -> TaskId {
        TaskId(self.last_id + 1)
    }

    #[instrument(skip(self, title))]
    pub fn add(&mut self, title: &str) -> Result<Task, StoreError> {
        let Some(title) = normalize_title(title) else {
            debug!("rejected add with blank title");
            return Err(StoreError::EmptyTitle);
        };

        self.last_id += 1;
        let task = Task::new_active(TaskId(self.last_id), title);
        self.active.push(task.clone());

        debug!(id = %task.id, active = self.active.len(), "added task");
        Ok(task)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub fn begin_edit(&mut self, id: TaskId) {
        match self.active.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.is_editing = true;
                debug!("entered edit mode");
            }
            None => debug!("begin_edit on unknown active task; ignoring"),
        }
    }

    /// Saves an inline edit. A blank title leaves the task untouched and still
    /// in edit mode.
    #[instrument(skip_all, fields(id = %id))]
    pub fn commit_edit(&mut self, id: TaskId, new_title: &str) -> Result<Task, StoreError> {
        let Some(title) = normalize_title(new_title) else {
            debug!("rejected edit with blank title");
            return Err(StoreError::EmptyTitle);
        };

        let task = self
            .active
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;

        task.title = title;
        task.is_editing = false;
        debug!(title = %task.title, "committed edit");
        Ok(task.clone())
    }

    /// Blur and submit share one handler.
    pub fn cancel_edit_on_blur(&mut self, id: TaskId, title: &str) -> Result<Task, StoreError> {
        self.commit_edit(id, title)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub fn delete_active(&mut self, id: TaskId) {
        let before = self.active.len();
        self.active.retain(|t| t.id != id);
        debug!(removed = before - self.active.len(), "delete active");
    }

    #[instrument(skip_all, fields(id = %id))]
    pub fn complete(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let idx = self
            .active
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| {
                debug!("complete on unknown active task");
                StoreError::NotFound(id)
            })?;

        let mut task = self.active.remove(idx);
        task.is_editing = false;
        self.completed.push(task.clone());

        debug!(
            active = self.active.len(),
            completed = self.completed.len(),
            "completed task"
        );
        Ok(task)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub fn delete_completed(&mut self, id: TaskId) {
        let before = self.completed.len();
        self.completed.retain(|t| t.id != id);
        debug!(removed = before - self.completed.len(), "delete completed");
    }

    /// Active tasks whose title contains `query`, ignoring case, in list order.
    pub fn search_iter<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Task> + use<'a> {
        let needle = query.to_lowercase();
        self.active
            .iter()
            .filter(move |task| task.title_contains(&needle))
    }

    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Vec<Task> {
        let out: Vec<Task> = self.search_iter(query).cloned().collect();
        debug!(matches = out.len(), "searched active tasks");
        out
    }
}
