use std::collections::BTreeSet;

use tracing::debug;

use crate::dimension::{
  ALL,
  Dimension,
  Selection
};

/// Active selections of every dimension
/// for one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  selections: [Selection; 3]
}

impl Default for FilterState {
  fn default() -> Self {
    let selections =
      Dimension::ALL_DIMENSIONS.map(
        |dim| {
          Selection::unconstrained(
            dim.mode()
          )
        }
      );

    Self {
      selections
    }
  }
}

impl FilterState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn selection(
    &self,
    dim: Dimension
  ) -> &Selection {
    &self.selections[dim.index()]
  }

  pub fn selections(
    &self
  ) -> impl Iterator<Item = (Dimension, &Selection)>
  {
    Dimension::ALL_DIMENSIONS
      .into_iter()
      .zip(self.selections.iter())
  }

  fn selection_mut(
    &mut self,
    dim: Dimension
  ) -> &mut Selection {
    &mut self.selections[dim.index()]
  }

  pub fn active_category(
    &self
  ) -> &str {
    match self
      .selection(Dimension::Category)
    {
      | Selection::Single(id) => id,
      | Selection::Multi(_) => ALL
    }
  }

  pub fn active_audiences(
    &self
  ) -> &BTreeSet<String> {
    self.multi(Dimension::Audience)
  }

  pub fn active_days(
    &self
  ) -> &BTreeSet<String> {
    self.multi(Dimension::Day)
  }

  fn multi(
    &self,
    dim: Dimension
  ) -> &BTreeSet<String> {
    match self.selection(dim) {
      | Selection::Multi(ids) => ids,
      | Selection::Single(_) => {
        &EMPTY_SET
      }
    }
  }

  pub fn is_active(
    &self,
    dim: Dimension,
    id: &str
  ) -> bool {
    match self.selection(dim) {
      | Selection::Single(current) => {
        current != ALL && current == id
      }
      | Selection::Multi(ids) => {
        ids.contains(id)
      }
    }
  }

  #[tracing::instrument(skip(self))]
  pub fn set_category(
    &mut self,
    id: &str
  ) {
    debug!(category = %id, "set category");
    *self.selection_mut(
      Dimension::Category
    ) = Selection::Single(id.to_string());
  }

  pub fn toggle_audience(
    &mut self,
    id: &str
  ) {
    self.toggle(Dimension::Audience, id);
  }

  pub fn toggle_day(
    &mut self,
    id: &str
  ) {
    self.toggle(Dimension::Day, id);
  }

  /// Flips membership of `id`. For the
  /// single-select category, selecting the
  /// active id again resets it to `all`.
  #[tracing::instrument(skip(self))]
  pub fn toggle(
    &mut self,
    dim: Dimension,
    id: &str
  ) {
    let checked = !self.is_active(dim, id);
    self.set_checked(dim, id, checked);
  }

  #[tracing::instrument(skip(self))]
  pub fn set_checked(
    &mut self,
    dim: Dimension,
    id: &str,
    checked: bool
  ) {
    match self.selection_mut(dim) {
      | Selection::Single(current) => {
        if checked {
          *current = id.to_string();
        } else if *current == id {
          *current = ALL.to_string();
        }
      }
      | Selection::Multi(ids) => {
        if checked {
          ids.insert(id.to_string());
        } else {
          ids.remove(id);
        }
      }
    }
    debug!(dimension = %dim, id, checked, "filter selection changed");
  }

  /// Drops `id` from the dimension. The
  /// category resets to `all` whatever id
  /// was given.
  #[tracing::instrument(skip(self))]
  pub fn remove_filter(
    &mut self,
    dim: Dimension,
    id: &str
  ) {
    match self.selection_mut(dim) {
      | Selection::Single(current) => {
        *current = ALL.to_string();
      }
      | Selection::Multi(ids) => {
        ids.remove(id);
      }
    }
    debug!(dimension = %dim, id, "filter removed");
  }

  pub fn clear(&mut self) {
    *self = Self::default();
    debug!("filters cleared");
  }

  /// Number of active multi-select values,
  /// i.e. the number of tags shown.
  pub fn active_count(&self) -> usize {
    self
      .selections
      .iter()
      .map(|sel| match sel {
        | Selection::Multi(ids) => {
          ids.len()
        }
        | Selection::Single(_) => 0
      })
      .sum()
  }
}

static EMPTY_SET: BTreeSet<String> =
  BTreeSet::new();
