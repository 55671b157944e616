use std::collections::BTreeSet;
use std::fmt;

use serde::{
  Deserialize,
  Serialize
};

/// Category sentinel meaning "no category
/// constraint".
pub const ALL: &str = "all";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
pub enum Dimension {
  #[serde(rename = "program_group")]
  Category,
  #[serde(rename = "program_audience")]
  Audience,
  #[serde(rename = "program_days")]
  Day
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SelectMode {
  Single,
  Multi
}

impl Dimension {
  pub const ALL_DIMENSIONS: [Dimension;
    3] = [
    Dimension::Category,
    Dimension::Audience,
    Dimension::Day
  ];

  /// Name used by the page markup
  /// (`data-filter-name`, blob keys).
  pub fn attr_name(
    self
  ) -> &'static str {
    match self {
      | Dimension::Category => {
        "program_group"
      }
      | Dimension::Audience => {
        "program_audience"
      }
      | Dimension::Day => "program_days"
    }
  }

  pub fn from_attr_name(
    name: &str
  ) -> Option<Self> {
    match name.trim() {
      | "program_group" => {
        Some(Dimension::Category)
      }
      | "program_audience" => {
        Some(Dimension::Audience)
      }
      | "program_days" => {
        Some(Dimension::Day)
      }
      | _ => None
    }
  }

  pub(crate) fn index(self) -> usize {
    match self {
      | Dimension::Category => 0,
      | Dimension::Audience => 1,
      | Dimension::Day => 2
    }
  }

  pub fn mode(self) -> SelectMode {
    match self {
      | Dimension::Category => {
        SelectMode::Single
      }
      | Dimension::Audience
      | Dimension::Day => {
        SelectMode::Multi
      }
    }
  }

  pub fn is_multi(self) -> bool {
    self.mode() == SelectMode::Multi
  }
}

impl fmt::Display for Dimension {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.attr_name())
  }
}

/// Active values of one dimension.
///
/// `Single` always holds exactly one id;
/// the unconstrained state is the [`ALL`]
/// sentinel. `Multi` is unconstrained when
/// empty.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum Selection {
  Single(String),
  Multi(BTreeSet<String>)
}

impl Selection {
  pub fn unconstrained(
    mode: SelectMode
  ) -> Self {
    match mode {
      | SelectMode::Single => {
        Selection::Single(
          ALL.to_string()
        )
      }
      | SelectMode::Multi => {
        Selection::Multi(
          BTreeSet::new()
        )
      }
    }
  }

  pub fn is_unconstrained(
    &self
  ) -> bool {
    match self {
      | Selection::Single(id) => {
        id == ALL
      }
      | Selection::Multi(ids) => {
        ids.is_empty()
      }
    }
  }

  pub fn contains(
    &self,
    id: &str
  ) -> bool {
    match self {
      | Selection::Single(current) => {
        current == id
      }
      | Selection::Multi(ids) => {
        ids.contains(id)
      }
    }
  }

  /// Single-select matches the one chosen
  /// id; multi-select matches when any
  /// selected id is present.
  pub fn matches(
    &self,
    values: &BTreeSet<String>
  ) -> bool {
    match self {
      | Selection::Single(id) => {
        id == ALL || values.contains(id)
      }
      | Selection::Multi(ids) => {
        ids.is_empty()
          || ids
            .iter()
            .any(|id| values.contains(id))
      }
    }
  }
}
