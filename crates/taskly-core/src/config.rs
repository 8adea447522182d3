use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::screens::SlideConfig;
use crate::theme::ThemeMode;

pub const DEFAULT_PROMPT: &str =
  "taskly> ";

/// Settings that can be overridden from
/// the command line.
pub const KNOWN_KEYS: &[&str] = &[
  "theme",
  "color",
  "settings.slide.ms",
  "settings.slide.width",
  "prompt"
];

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "theme".to_string(),
      "light".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );
    map.insert(
      "settings.slide.ms".to_string(),
      "300".to_string()
    );
    map.insert(
      "settings.slide.width"
        .to_string(),
      "300".to_string()
    );
    map.insert(
      "prompt".to_string(),
      DEFAULT_PROMPT.to_string()
    );

    Self {
      map,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(tasklyrc = %path.display(), "loading tasklyrc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no tasklyrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, v) in overrides {
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
      .transpose()
      .with_context(|| {
        format!("invalid `{key}` setting")
      })
  }

  pub fn color(
    &self
  ) -> anyhow::Result<bool> {
    Ok(
      self
        .get_bool("color")?
        .unwrap_or(true)
    )
  }

  pub fn theme(
    &self
  ) -> anyhow::Result<ThemeMode> {
    self
      .get("theme")
      .unwrap_or_else(|| {
        "light".to_string()
      })
      .parse::<ThemeMode>()
      .context("invalid `theme` setting")
  }

  pub fn slide(
    &self
  ) -> anyhow::Result<SlideConfig> {
    let defaults =
      SlideConfig::default();

    let duration = match self
      .get("settings.slide.ms")
    {
      | Some(raw) => {
        Duration::from_millis(
          raw.trim().parse::<u64>().with_context(|| {
            format!(
              "invalid settings.slide.ms: {raw}"
            )
          })?
        )
      }
      | None => defaults.duration
    };

    let width = match self
      .get("settings.slide.width")
    {
      | Some(raw) => {
        let w = raw
          .trim()
          .parse::<f32>()
          .with_context(|| {
            format!(
              "invalid settings.slide.width: {raw}"
            )
          })?;
        if !w.is_finite() || w < 0.0 {
          return Err(anyhow!(
            "settings.slide.width must \
             be a non-negative number"
          ));
        }
        w
      }
      | None => defaults.width
    };

    Ok(SlideConfig {
      width,
      duration
    })
  }

  pub fn prompt(&self) -> String {
    self
      .get("prompt")
      .unwrap_or_else(|| {
        DEFAULT_PROMPT.to_string()
      })
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    if self.loaded_files.contains(&path)
    {
      warn!(file = %path.display(), "config file already loaded; skipping include cycle");
      return Ok(());
    }

    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("TASKLYRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping tasklyrc"
    );
    return Ok(None);
  };
  let candidate =
    home.join(".tasklyrc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(
  s: &str
) -> anyhow::Result<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "yes" | "on" | "true" => {
      Ok(true)
    }
    | "0" | "no" | "off" | "false" => {
      Ok(false)
    }
    | other => Err(anyhow!(
      "expected on or off, got: {other}"
    ))
  }
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::time::Duration;

  use super::Config;
  use crate::theme::ThemeMode;

  #[test]
  fn defaults_without_file() {
    let cfg = Config::default();
    assert_eq!(
      cfg.theme().unwrap(),
      ThemeMode::Light
    );
    assert!(cfg.color().unwrap());
    let slide = cfg.slide().unwrap();
    assert_eq!(
      slide.duration,
      Duration::from_millis(300)
    );
    assert_eq!(slide.width, 300.0);
    assert_eq!(cfg.prompt(), "taskly> ");
  }

  #[test]
  fn loads_file_with_comments_and_includes()
  {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let extra = dir.path().join("extra.rc");
    fs::write(
      &extra,
      "settings.slide.ms = 120\n"
    )
    .expect("write include");

    let main = dir.path().join("main.rc");
    fs::write(
      &main,
      "# taskly settings\n\
       theme = night   # trailing\n\
       \n\
       include extra.rc\n\
       include missing.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&main))
      .expect("load config");
    assert_eq!(
      cfg.theme().unwrap(),
      ThemeMode::Dark
    );
    assert_eq!(
      cfg.slide().unwrap().duration,
      Duration::from_millis(120)
    );
    assert_eq!(cfg.loaded_files.len(), 2);
  }

  #[test]
  fn include_cycles_are_ignored() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let main = dir.path().join("main.rc");
    fs::write(
      &main,
      "include main.rc\ncolor = off\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&main))
      .expect("load config");
    assert!(!cfg.color().unwrap());
  }

  #[test]
  fn invalid_line_is_an_error() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let main = dir.path().join("bad.rc");
    fs::write(&main, "theme dark\n")
      .expect("write rc");

    let err = Config::load(Some(&main))
      .expect_err("should fail");
    assert!(
      err
        .to_string()
        .contains("invalid config line")
    );
  }

  #[test]
  fn overrides_replace_file_values() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![
      (
        "theme".to_string(),
        "dark".to_string()
      ),
      (
        "settings.slide.width"
          .to_string(),
        "-5".to_string()
      ),
    ]);
    assert_eq!(
      cfg.theme().unwrap(),
      ThemeMode::Dark
    );
    assert!(cfg.slide().is_err());
  }

  #[test]
  fn bad_theme_reports_context() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![(
      "theme".to_string(),
      "sepia".to_string()
    )]);
    let err = cfg.theme().unwrap_err();
    assert!(
      format!("{err:#}")
        .contains("invalid `theme`")
    );
  }

  #[test]
  fn color_accepts_only_on_off_words() {
    let mut cfg = Config::default();
    for (raw, expected) in [
      ("OFF", false),
      ("no", false),
      ("0", false),
      ("Yes", true),
      ("true", true)
    ] {
      cfg.apply_overrides(vec![(
        "color".to_string(),
        raw.to_string()
      )]);
      assert_eq!(
        cfg.color().unwrap(),
        expected,
        "{raw}"
      );
    }

    cfg.apply_overrides(vec![(
      "color".to_string(),
      "y".to_string()
    )]);
    let err = cfg.color().unwrap_err();
    assert!(
      format!("{err:#}")
        .contains("invalid `color`")
    );
  }
}
