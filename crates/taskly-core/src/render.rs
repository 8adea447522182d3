use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::screens::{EMPTY_COMPLETED_MESSAGE, SettingsPanel};
use crate::task::Task;
use crate::theme::{Color, ThemePreference, placeholder_color};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            color: cfg.color()? && io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn print_tasks_screen<W: Write>(
        &self,
        out: &mut W,
        theme: &ThemePreference,
        query: &str,
        tasks: &[Task],
        edit_text: impl Fn(&Task) -> Option<String>,
        settings: &SettingsPanel,
    ) -> anyhow::Result<()> {
        let palette = theme.palette();

        writeln!(
            out,
            "{}",
            self.paint("Taskly", palette.text, Some(palette.background))
        )?;

        if query.is_empty() {
            writeln!(
                out,
                "{}",
                self.paint("Search tasks", placeholder_color(theme.is_dark_mode()), None)
            )?;
        } else {
            writeln!(out, "search: {query}")?;
        }

        if settings.is_visible() {
            let mark = |dark: bool| if theme.is_dark_mode() == dark { "*" } else { " " };
            writeln!(
                out,
                "{}",
                self.paint(
                    &format!(
                        "Settings  [{}] Light Mode  [{}] Dark Mode",
                        mark(false),
                        mark(true)
                    ),
                    palette.text,
                    Some(palette.box_primary)
                )
            )?;
        }

        let headers = vec!["ID".to_string(), "Title".to_string()];
        let rows = tasks
            .iter()
            .map(|task| {
                let title = match edit_text(task) {
                    Some(buffer) if task.is_editing => format!("[{buffer}]"),
                    _ => task.title.clone(),
                };
                vec![
                    task.id.to_string(),
                    self.paint(&title, palette.text, Some(palette.box_secondary)),
                ]
            })
            .collect();

        write_table(&mut *out, headers, rows)?;
        Ok(())
    }

    pub fn print_completed_screen<W: Write>(
        &self,
        out: &mut W,
        theme: &ThemePreference,
        tasks: &[Task],
    ) -> anyhow::Result<()> {
        let palette = theme.completed_palette();

        writeln!(
            out,
            "{}",
            self.paint("Completed Tasks", palette.title_text, Some(palette.background))
        )?;

        if tasks.is_empty() {
            writeln!(
                out,
                "{}",
                self.paint(EMPTY_COMPLETED_MESSAGE, palette.empty_text, None)
            )?;
            return Ok(());
        }

        let headers = vec!["ID".to_string(), "Title".to_string()];
        let rows = tasks
            .iter()
            .map(|task| {
                vec![
                    task.id.to_string(),
                    self.paint(&task.title, palette.title_text, Some(palette.inner_box)),
                ]
            })
            .collect();

        write_table(&mut *out, headers, rows)?;
        Ok(())
    }

    pub fn print_notice<W: Write>(&self, out: &mut W, message: &str) -> anyhow::Result<()> {
        writeln!(out, "{message}")?;
        Ok(())
    }

    fn paint(&self, text: &str, fg: Color, bg: Option<Color>) -> String {
        if !self.color {
            return text.to_string();
        }
        let (r, g, b) = fg.rgb();
        let mut out = format!("\x1b[38;2;{r};{g};{b}m");
        if let Some(bg) = bg {
            let (r, g, b) = bg.rgb();
            out.push_str(&format!("\x1b[48;2;{r};{g};{b}m"));
        }
        out.push_str(text);
        out.push_str("\x1b[0m");
        out
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let mut line = String::new();
    for (idx, header) in headers.iter().enumerate() {
        line.push_str(&format!("{:width$} ", header, width = widths[idx]));
    }
    writeln!(writer, "{}", line.trim_end())?;

    line.clear();
    for width in &widths {
        line.push_str(&format!("{:-<width$} ", "", width = *width));
    }
    writeln!(writer, "{}", line.trim_end())?;

    for row in rows {
        line.clear();
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            line.push_str(&format!("{}{} ", cell, " ".repeat(padding)));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{Renderer, strip_ansi, write_table};
    use crate::config::Config;
    use crate::screens::{SettingsPanel, SlideConfig};
    use crate::task::{Task, TaskId};
    use crate::theme::{ThemeMode, ThemePreference, palette_for};

    #[test]
    fn table_pads_wide_characters() {
        let mut out = Vec::new();
        write_table(
            &mut out,
            vec!["ID".to_string(), "Title".to_string()],
            vec![
                vec!["1".to_string(), "茶を買う".to_string()],
                vec!["12".to_string(), "tea".to_string()],
            ],
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID Title");
        assert_eq!(lines[1], "-- --------");
        assert_eq!(lines[2], "1  茶を買う");
        assert_eq!(lines[3], "12 tea");
    }

    #[test]
    fn color_setting_is_validated_at_startup() {
        let mut cfg = Config::default();
        cfg.apply_overrides(vec![("color".to_string(), "off".to_string())]);
        assert!(!Renderer::new(&cfg).unwrap().color);

        cfg.apply_overrides(vec![("color".to_string(), "y".to_string())]);
        let err = Renderer::new(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("invalid `color` setting"));
    }

    #[test]
    fn painted_cells_strip_back_to_text() {
        let renderer = Renderer { color: true };
        let palette = palette_for(true);
        let painted = renderer.paint("hi", palette.text, Some(palette.background));
        assert!(painted.starts_with("\x1b[38;2;255;255;255m\x1b[48;2;51;51;51m"));
        assert_eq!(strip_ansi(&painted), "hi");
    }

    #[test]
    fn tasks_screen_shows_edit_buffer_and_settings() {
        let renderer = Renderer::plain();
        let theme = ThemePreference::new(ThemeMode::Dark);
        let mut settings = SettingsPanel::new(SlideConfig::default());
        settings.toggle(std::time::Instant::now());

        let mut editing = Task::new_active(TaskId(1), "Buy milk".to_string());
        editing.is_editing = true;
        let tasks = vec![editing, Task::new_active(TaskId(2), "Walk dog".to_string())];

        let mut out = Vec::new();
        renderer
            .print_tasks_screen(
                &mut out,
                &theme,
                "",
                &tasks,
                |t| (t.id == TaskId(1)).then(|| "Buy oat".to_string()),
                &settings,
            )
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Search tasks"));
        assert!(text.contains("[ ] Light Mode  [*] Dark Mode"));
        assert!(text.contains("1  [Buy oat]"));
        assert!(text.contains("2  Walk dog"));
    }

    #[test]
    fn completed_screen_has_empty_state() {
        let mut out = Vec::new();
        Renderer::plain()
            .print_completed_screen(&mut out, &ThemePreference::default(), &[])
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No completed tasks yet!"));
    }
}
