use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::clock::{
  DEFAULT_REFERENCE_TIMEZONE,
  parse_timezone
};

const CONFIG_ENV_VAR: &str =
  "DUALCAL_CONFIG";
const TIMEZONE_ENV_VAR: &str =
  "DUALCAL_TIMEZONE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// IANA zone that decides "today".
  pub timezone:     String,
  pub color:        bool,
  pub latin_digits: bool,
  pub tasks_file:   Option<PathBuf>,

  #[serde(skip)]
  pub loaded_file:  Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      timezone:     DEFAULT_REFERENCE_TIMEZONE
        .to_string(),
      color:        true,
      latin_digits: false,
      tasks_file:   None,
      loaded_file:  None
    }
  }
}

impl Config {
  #[tracing::instrument]
  pub fn load(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg =
      match resolve_config_path(
        override_path
      ) {
        | Some(path)
          if path.exists() =>
        {
          info!(config = %path.display(), "loading config");
          Self::load_file(&path)?
        }
        | Some(path) => {
          if override_path.is_some() {
            return Err(anyhow!(
              "config file {} does \
               not exist",
              path.display()
            ));
          }
          warn!(config = %path.display(), "no config file; using defaults");
          Self::default()
        }
        | None => {
          warn!(
            "cannot locate config \
             directory; using defaults"
          );
          Self::default()
        }
      };

    if let Ok(raw) =
      std::env::var(TIMEZONE_ENV_VAR)
      && !raw.trim().is_empty()
    {
      debug!(timezone = %raw, "timezone from environment");
      cfg.timezone = raw;
    }

    cfg.sanitize();
    Ok(cfg)
  }

  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg =
      toml::from_str::<Config>(&text)
        .with_context(|| {
          format!(
            "failed to parse {}",
            path.display()
          )
        })?;
    cfg.loaded_file = Some(path);
    cfg.sanitize();
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .trim()
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      match key.as_str() {
        | "timezone" => {
          self.timezone = v
        }
        | "color" => {
          self.color = parse_bool(&v)
        }
        | "latin_digits" => {
          self.latin_digits =
            parse_bool(&v)
        }
        | "tasks_file" => {
          self.tasks_file =
            Some(expand_tilde(
              Path::new(v.trim())
            ))
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: \
             {other}"
          ));
        }
      }
    }
    self.sanitize();
    Ok(())
  }

  /// The configured zone, falling back
  /// to the default zone and then UTC.
  pub fn reference_timezone(
    &self
  ) -> Tz {
    parse_timezone(
      &self.timezone,
      "config"
    )
    .or_else(|| {
      parse_timezone(
        DEFAULT_REFERENCE_TIMEZONE,
        "default"
      )
    })
    .unwrap_or(chrono_tz::UTC)
  }

  fn sanitize(&mut self) {
    if self.timezone.trim().is_empty()
    {
      self.timezone =
        DEFAULT_REFERENCE_TIMEZONE
          .to_string();
    }
    self.timezone =
      self.timezone.trim().to_string();
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  dirs::config_dir().map(|dir| {
    dir
      .join("dualcal")
      .join("config.toml")
  })
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

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
