use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{
  Context,
  anyhow
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::dimension::Dimension;
use crate::weekday::{
  normalize_day,
  scan_weekdays
};

/// Filter attributes of one listed
/// program, parsed once at load time.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct Program {
  pub groups:    BTreeSet<String>,
  pub audiences: BTreeSet<String>,
  pub days:      BTreeSet<String>
}

impl Program {
  pub fn values(
    &self,
    dim: Dimension
  ) -> &BTreeSet<String> {
    match dim {
      | Dimension::Category => {
        &self.groups
      }
      | Dimension::Audience => {
        &self.audiences
      }
      | Dimension::Day => &self.days
    }
  }
}

/// A listing slot. `program` is `None`
/// when the item's filter data could not
/// be parsed; such items never match.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramEntry {
  pub title:   String,
  pub program: Option<Program>
}

impl ProgramEntry {
  pub fn new(
    title: impl Into<String>,
    program: Program
  ) -> Self {
    Self {
      title:   title.into(),
      program: Some(program)
    }
  }

  /// Builds an entry from the raw markup
  /// attributes. A malformed blob is
  /// logged and yields an entry without a
  /// program instead of failing the pass.
  #[tracing::instrument(skip(
    filter_blob,
    days_blob,
    text
  ))]
  pub fn from_markup(
    title: &str,
    filter_blob: &str,
    days_blob: Option<&str>,
    text: &str
  ) -> Self {
    let program = match parse_program(
      filter_blob,
      days_blob,
      text
    ) {
      | Ok(program) => Some(program),
      | Err(error) => {
        warn!(title, error = %format!("{error:#}"), "malformed program filter data; item will stay hidden");
        None
      }
    };

    Self {
      title: title.to_string(),
      program
    }
  }
}

#[derive(Debug, Default, Deserialize)]
struct FilterBlob {
  #[serde(
    default,
    deserialize_with = "one_or_many"
  )]
  program_group:    Vec<String>,
  #[serde(
    default,
    deserialize_with = "one_or_many"
  )]
  program_audience: Vec<String>,
  #[serde(
    default,
    deserialize_with = "maybe_one_or_many"
  )]
  program_days:     Option<Vec<String>>
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
  One(String),
  Many(Vec<String>)
}

impl From<OneOrMany> for Vec<String> {
  fn from(value: OneOrMany) -> Self {
    match value {
      | OneOrMany::One(one) => vec![one],
      | OneOrMany::Many(many) => many
    }
  }
}

fn one_or_many<'de, D>(
  deserializer: D
) -> Result<Vec<String>, D::Error>
where
  D: serde::Deserializer<'de>
{
  OneOrMany::deserialize(deserializer)
    .map(Into::into)
}

fn maybe_one_or_many<'de, D>(
  deserializer: D
) -> Result<Option<Vec<String>>, D::Error>
where
  D: serde::Deserializer<'de>
{
  Option::<OneOrMany>::deserialize(
    deserializer
  )
  .map(|value| value.map(Into::into))
}

/// Markup may quote the blob with single
/// quotes; JSON needs double quotes. The
/// raw text is tried first so apostrophes
/// inside double-quoted values survive.
fn parse_blob<T>(
  raw: &str
) -> serde_json::Result<T>
where
  T: serde::de::DeserializeOwned
{
  let trimmed = raw.trim();
  serde_json::from_str(trimmed).or_else(
    |error| {
      if trimmed.contains('\'') {
        serde_json::from_str(
          &trimmed.replace('\'', "\"")
        )
      } else {
        Err(error)
      }
    }
  )
}

fn clean_ids<I>(values: I) -> BTreeSet<String>
where
  I: IntoIterator<Item = String>
{
  values
    .into_iter()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
    .collect()
}

/// Parses the `data-filter` blob plus the
/// optional `data-filter-days` array.
/// Days come from the blob, then the days
/// array, then a weekday scan of `text`.
pub fn parse_program(
  filter_blob: &str,
  days_blob: Option<&str>,
  text: &str
) -> anyhow::Result<Program> {
  if filter_blob.trim().is_empty() {
    return Err(anyhow!(
      "program filter data is empty"
    ));
  }

  let blob: FilterBlob =
    parse_blob(filter_blob)
      .with_context(|| {
      format!(
        "invalid program filter data: \
         {filter_blob}"
      )
    })?;

  let days = if let Some(days) =
    blob.program_days
  {
    days
  } else if let Some(raw) = days_blob
    && !raw.trim().is_empty()
  {
    parse_days_blob(raw)?
  } else {
    scan_weekdays(text)
      .into_iter()
      .collect()
  };

  let program = Program {
    groups:    clean_ids(
      blob.program_group
    ),
    audiences: clean_ids(
      blob.program_audience
    ),
    days:      clean_ids(
      days
        .iter()
        .map(|day| normalize_day(day))
    )
  };

  debug!(?program, "parsed program filter data");
  Ok(program)
}

fn parse_days_blob(
  raw: &str
) -> anyhow::Result<Vec<String>> {
  let value: OneOrMany =
    parse_blob(raw)
      .with_context(|| {
      format!(
        "invalid program days data: \
         {raw}"
      )
    })?;
  Ok(value.into())
}

/// One record of a listing file.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingRecord {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub filter:      String,
  #[serde(default)]
  pub days:        Option<String>
}

impl ListingRecord {
  pub fn into_entry(
    self
  ) -> ProgramEntry {
    let text = format!(
      "{}\n{}",
      self.title, self.description
    );
    ProgramEntry::from_markup(
      &self.title,
      &self.filter,
      self.days.as_deref(),
      &text
    )
  }
}

pub fn parse_listing(
  text: &str
) -> anyhow::Result<Vec<ProgramEntry>> {
  let records: Vec<ListingRecord> =
    serde_json::from_str(text)
      .context(
        "listing must be a JSON array \
         of program records"
      )?;

  Ok(
    records
      .into_iter()
      .map(ListingRecord::into_entry)
      .collect()
  )
}

#[tracing::instrument]
pub fn load_listing(
  path: &Path
) -> anyhow::Result<Vec<ProgramEntry>> {
  let text = fs::read_to_string(path)
    .with_context(|| {
      format!(
        "failed to read {}",
        path.display()
      )
    })?;
  let entries = parse_listing(&text)
    .with_context(|| {
      format!(
        "failed to parse {}",
        path.display()
      )
    })?;

  let malformed = entries
    .iter()
    .filter(|entry| {
      entry.program.is_none()
    })
    .count();
  info!(
    path = %path.display(),
    programs = entries.len(),
    malformed,
    "loaded program listing"
  );
  Ok(entries)
}
