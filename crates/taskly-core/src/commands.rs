use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::{Context, anyhow};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::navigation::{Navigator, Route};
use crate::render::Renderer;
use crate::screens::{CompletedTasksScreen, SlideConfig, TasksScreen};
use crate::state::SharedState;
use crate::task::TaskId;

pub const HELP: &str = "\
commands:
  add <title>            add a task
  edit <id>              start editing a task inline
  type <id> <text>       replace the text of a task being edited
  save <id>              submit the inline edit
  blur <id>              leave the inline edit (same as save)
  rm <id>                delete a task (a completed one on the completed view)
  done <id>              mark a task complete
  search [query]         filter tasks by title; no query clears the filter
  list                   redraw the current view
  completed              open the completed tasks view
  back                   return to the task list
  theme toggle           switch between light and dark
  theme light|dark       pick a mode from the open settings menu
  settings               show or hide the settings menu
  export                 print all tasks as JSON
  help                   show this help
  quit                   leave taskly";

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add",
        "edit",
        "type",
        "save",
        "blur",
        "rm",
        "done",
        "search",
        "list",
        "completed",
        "back",
        "theme",
        "settings",
        "export",
        "help",
        "quit",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add(String),
    Edit(TaskId),
    Type(TaskId, String),
    Save(TaskId),
    Blur(TaskId),
    Remove(TaskId),
    Done(TaskId),
    Search(String),
    List,
    Completed,
    Back,
    Theme(ThemeChoice),
    Settings,
    Export,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parses one input line. Blank lines parse to `None`.
    ///
    /// The `search` query is kept exactly as typed after the first space.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let line = line.trim_start().trim_end_matches(['\r', '\n']);
        let (head, raw_rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = raw_rest.trim();

        let known = known_command_names();
        let command = expand_command_abbrev(head, &known)
            .ok_or_else(|| anyhow!("unknown or ambiguous command: {head} (try `help`)"))?;
        debug!(token = %head, expanded = %command, "resolved command token");

        let id = |rest: &str| -> anyhow::Result<TaskId> {
            let token = rest.split_whitespace().next().unwrap_or_default();
            if token.is_empty() {
                return Err(anyhow!("{command} needs a task id"));
            }
            token.parse::<TaskId>()
        };

        let parsed = match command {
            "add" => Self::Add(rest.to_string()),
            "edit" => Self::Edit(id(rest)?),
            "type" => {
                let (id_token, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Self::Type(id(id_token)?, text.to_string())
            }
            "save" => Self::Save(id(rest)?),
            "blur" => Self::Blur(id(rest)?),
            "rm" => Self::Remove(id(rest)?),
            "done" => Self::Done(id(rest)?),
            "search" => Self::Search(raw_rest.to_string()),
            "list" => Self::List,
            "completed" => Self::Completed,
            "back" => Self::Back,
            "theme" => Self::Theme(match rest.to_ascii_lowercase().as_str() {
                "" | "toggle" => ThemeChoice::Toggle,
                "light" | "day" => ThemeChoice::Light,
                "dark" | "night" => ThemeChoice::Dark,
                other => return Err(anyhow!("unknown theme: {other} (light, dark or toggle)")),
            }),
            "settings" => Self::Settings,
            "export" => Self::Export,
            "help" => Self::Help,
            "quit" => Self::Quit,
            other => return Err(anyhow!("unhandled command: {other}")),
        };

        Ok(Some(parsed))
    }

    fn is_tasks_only(&self) -> bool {
        matches!(
            self,
            Self::Add(_)
                | Self::Edit(_)
                | Self::Type(..)
                | Self::Save(_)
                | Self::Blur(_)
                | Self::Done(_)
                | Self::Search(_)
                | Self::Completed
                | Self::Settings
                | Self::Theme(ThemeChoice::Light | ThemeChoice::Dark)
        )
    }

    fn needs_settings_menu(&self) -> bool {
        matches!(self, Self::Theme(ThemeChoice::Light | ThemeChoice::Dark))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Terminal host for the two screens. Owns navigation and forwards input to the
/// view models.
#[derive(Debug)]
pub struct Shell<W: Write> {
    state: SharedState,
    nav: Navigator,
    tasks: TasksScreen,
    completed: Option<CompletedTasksScreen>,
    renderer: Renderer,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(state: SharedState, slide: SlideConfig, renderer: Renderer, out: W) -> Self {
        Self {
            tasks: TasksScreen::new(state.clone(), slide),
            state,
            nav: Navigator::default(),
            completed: None,
            renderer,
            out,
        }
    }

    pub fn route(&self) -> Route {
        self.nav.current()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    #[instrument(skip(self, input, prompt))]
    pub fn run<R: BufRead>(&mut self, input: R, prompt: Option<&str>) -> anyhow::Result<()> {
        info!("starting taskly shell");
        self.render()?;

        let mut lines = input.lines();
        loop {
            if let Some(prompt) = prompt {
                write!(self.out, "{prompt}")?;
                self.out.flush()?;
            }

            let Some(line) = lines.next() else {
                debug!("input closed");
                break;
            };
            let line = line.context("failed to read shell input")?;

            let command = match ShellCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    warn!(error = %err, "rejected shell input");
                    self.renderer.print_notice(&mut self.out, &format!("error: {err}"))?;
                    continue;
                }
            };

            if self.execute(command)? == Outcome::Quit {
                break;
            }
        }

        info!("shell finished");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn execute(&mut self, command: ShellCommand) -> anyhow::Result<Outcome> {
        if self.nav.current() == Route::CompletedTasks && command.is_tasks_only() {
            self.renderer.print_notice(
                &mut self.out,
                "not available on Completed Tasks; use `back` first",
            )?;
            return Ok(Outcome::Continue);
        }

        if command.needs_settings_menu() && !self.tasks.settings().is_visible() {
            self.renderer.print_notice(
                &mut self.out,
                "Light Mode and Dark Mode are in the settings menu; open it with `settings`",
            )?;
            return Ok(Outcome::Continue);
        }

        let result = match command {
            ShellCommand::Add(title) => {
                self.tasks.set_draft(title);
                self.tasks.submit_draft().map(drop)
            }
            ShellCommand::Edit(id) => {
                self.tasks.begin_edit(id);
                Ok(())
            }
            ShellCommand::Type(id, text) => self.tasks.type_edit(id, text),
            ShellCommand::Save(id) => self.tasks.submit_edit(id).map(drop),
            ShellCommand::Blur(id) => self.tasks.blur_edit(id).map(drop),
            ShellCommand::Remove(id) => {
                match (self.nav.current(), self.completed.as_ref()) {
                    (Route::CompletedTasks, Some(screen)) => screen.delete(id),
                    _ => self.tasks.delete(id),
                }
                Ok(())
            }
            ShellCommand::Done(id) => self.tasks.complete(id).map(drop),
            ShellCommand::Search(query) => {
                self.tasks.set_query(query);
                Ok(())
            }
            ShellCommand::List => Ok(()),
            ShellCommand::Completed => {
                self.completed = Some(self.tasks.open_completed(&mut self.nav));
                Ok(())
            }
            ShellCommand::Back => {
                if self.nav.go_back() && self.nav.current() == Route::Tasks {
                    self.completed = None;
                }
                Ok(())
            }
            ShellCommand::Theme(choice) => {
                match choice {
                    ThemeChoice::Light => self.tasks.choose_light(),
                    ThemeChoice::Dark => self.tasks.choose_dark(),
                    ThemeChoice::Toggle => self.state.theme().toggle(),
                }
                Ok(())
            }
            ShellCommand::Settings => {
                self.tasks.toggle_settings(Instant::now());
                Ok(())
            }
            ShellCommand::Export => {
                self.export()?;
                return Ok(Outcome::Continue);
            }
            ShellCommand::Help => {
                self.renderer.print_notice(&mut self.out, HELP)?;
                return Ok(Outcome::Continue);
            }
            ShellCommand::Quit => return Ok(Outcome::Quit),
        };

        if let Err(err) = result {
            debug!(error = %err, "store rejected command");
            self.renderer.print_notice(&mut self.out, &err.to_string())?;
        }

        self.render()?;
        Ok(Outcome::Continue)
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let theme = self.state.theme().clone();
        match (self.nav.current(), self.completed.as_ref()) {
            (Route::CompletedTasks, Some(screen)) => {
                let tasks = screen.tasks();
                self.renderer
                    .print_completed_screen(&mut self.out, &theme, &tasks)
            }
            _ => {
                let tasks = self.tasks.visible_tasks();
                let screen = &self.tasks;
                self.renderer.print_tasks_screen(
                    &mut self.out,
                    &theme,
                    screen.query(),
                    &tasks,
                    |task| screen.edit_text(task.id).map(str::to_string),
                    screen.settings(),
                )
            }
        }
    }

    fn export(&mut self) -> anyhow::Result<()> {
        let doc = {
            let theme = self.state.theme();
            let store = self.state.store();
            json!({
                "theme": theme.mode(),
                "palette": theme.palette(),
                "active": store.active(),
                "completed": store.completed(),
            })
        };
        let text = serde_json::to_string_pretty(&doc).context("failed to serialize tasks")?;
        writeln!(self.out, "{text}")?;
        Ok(())
    }
}
