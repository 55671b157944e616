use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use tracing::{
  debug,
  info
};

use crate::catalog::Catalog;

/// Environment variable naming the catalog
/// file. `/dev/null` disables the lookup.
pub const CONFIG_ENV: &str =
  "FCEVENTS_CONFIG";

const CONFIG_SUBDIR: &str = "fcevents";
const CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Clone)]
pub struct Config {
  pub catalog:      Catalog,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  /// Resolves the catalog file (override,
  /// then `FCEVENTS_CONFIG`, then the user
  /// config directory) and falls back to
  /// the built-in catalog.
  #[tracing::instrument(skip(
    catalog_override
  ))]
  pub fn load(
    catalog_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let path = resolve_catalog_path(
      catalog_override,
      std::env::var(CONFIG_ENV).ok(),
      dirs::config_dir()
    );

    match path {
      | Some(path) => {
        info!(catalog = %path.display(), "loading catalog");
        Self::load_file(&path)
      }
      | None => {
        debug!(
          "no catalog file found; using \
           built-in catalog"
        );
        Ok(Self::builtin())
      }
    }
  }

  pub fn builtin() -> Self {
    Self {
      catalog:      Catalog::builtin(),
      loaded_files: vec![]
    }
  }

  #[tracing::instrument]
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
    let catalog =
      Catalog::from_toml_str(&text)
        .with_context(|| {
          format!(
            "failed to load catalog {}",
            path.display()
          )
        })?;

    debug!(
      categories = catalog.categories.len(),
      audiences = catalog.audiences.len(),
      days = catalog.days.len(),
      "loaded catalog file"
    );
    Ok(Self {
      catalog,
      loaded_files: vec![path]
    })
  }
}

/// Picks the catalog file to load. The
/// user config directory only counts when
/// the file exists there.
pub fn resolve_catalog_path(
  override_path: Option<&Path>,
  env_value: Option<String>,
  config_dir: Option<PathBuf>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Some(value) = env_value {
    if value == "/dev/null" {
      return None;
    }
    if !value.trim().is_empty() {
      return Some(PathBuf::from(value));
    }
  }

  let candidate = config_dir?
    .join(CONFIG_SUBDIR)
    .join(CONFIG_FILE);
  if candidate.exists() {
    return Some(candidate);
  }

  None
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
