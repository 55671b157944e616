use tracing::trace;

use crate::dimension::Dimension;
use crate::program::{
  Program,
  ProgramEntry
};
use crate::state::FilterState;

/// Decides whether `program` is shown
/// under `state`: the AND of one
/// predicate per dimension.
pub fn is_visible(
  program: &Program,
  state: &FilterState
) -> bool {
  Dimension::ALL_DIMENSIONS
    .into_iter()
    .all(|dim| {
      let ok = state
        .selection(dim)
        .matches(program.values(dim));
      trace!(dimension = %dim, ok, "filter predicate evaluation");
      ok
    })
}

/// Visibility of a listing slot. Entries
/// whose filter data failed to parse match
/// nothing.
pub fn entry_visible(
  entry: &ProgramEntry,
  state: &FilterState
) -> bool {
  entry
    .program
    .as_ref()
    .map(|program| {
      is_visible(program, state)
    })
    .unwrap_or(false)
}

pub fn visible_indices(
  entries: &[ProgramEntry],
  state: &FilterState
) -> Vec<usize> {
  entries
    .iter()
    .enumerate()
    .filter(|(_, entry)| {
      entry_visible(entry, state)
    })
    .map(|(idx, _)| idx)
    .collect()
}

pub fn count_visible(
  entries: &[ProgramEntry],
  state: &FilterState
) -> usize {
  entries
    .iter()
    .filter(|entry| {
      entry_visible(entry, state)
    })
    .count()
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::{
    count_visible,
    is_visible,
    visible_indices
  };
  use crate::dimension::ALL;
  use crate::program::{
    Program,
    ProgramEntry
  };
  use crate::state::FilterState;

  fn set(
    values: &[&str]
  ) -> BTreeSet<String> {
    values
      .iter()
      .map(|v| v.to_string())
      .collect()
  }

  fn program(
    groups: &[&str],
    audiences: &[&str],
    days: &[&str]
  ) -> Program {
    Program {
      groups:    set(groups),
      audiences: set(audiences),
      days:      set(days)
    }
  }

  fn listing() -> Vec<ProgramEntry> {
    vec![
      ProgramEntry::new(
        "Teen Night",
        program(
          &["fc-teens"],
          &["13-18"],
          &["Thursday"]
        )
      ),
      ProgramEntry::new(
        "Junior Club",
        program(
          &["fc-junior"],
          &["5-12"],
          &["Thursday", "Saturday"]
        )
      ),
      ProgramEntry::new(
        "Family Picnic",
        program(
          &["families", "community"],
          &["3-4", "5-12", "18+"],
          &["Sunday"]
        )
      ),
      ProgramEntry::new(
        "Adult Social",
        program(
          &["fc-adult", "fc-teens"],
          &["18+"],
          &["Friday"]
        )
      ),
      ProgramEntry {
        title:   "Broken".to_string(),
        program: None
      },
    ]
  }

  #[test]
  fn default_state_shows_every_parsed_program()
  {
    let state = FilterState::new();
    assert_eq!(
      visible_indices(&listing(), &state),
      vec![0, 1, 2, 3]
    );
  }

  #[test]
  fn evaluation_is_pure() {
    let item = program(
      &["fc-teens"],
      &["13-18"],
      &["Thursday"]
    );
    let mut state = FilterState::new();
    state.set_category("fc-teens");
    let (item_before, state_before) =
      (item.clone(), state.clone());

    let first = is_visible(&item, &state);
    let second = is_visible(&item, &state);
    assert_eq!(first, second);
    assert_eq!(item, item_before);
    assert_eq!(state, state_before);
  }

  #[test]
  fn category_round_trip_restores_visible_set()
  {
    let entries = listing();
    let mut state = FilterState::new();
    let before =
      visible_indices(&entries, &state);

    state.set_category("fc-teens");
    assert_eq!(
      visible_indices(&entries, &state),
      vec![0, 3]
    );

    state.set_category(ALL);
    assert_eq!(
      visible_indices(&entries, &state),
      before
    );
  }

  #[test]
  fn audiences_combine_with_or() {
    let entries = listing();
    let mut state = FilterState::new();
    state.toggle_audience("13-18");
    let narrow =
      visible_indices(&entries, &state);
    assert_eq!(narrow, vec![0]);

    state.toggle_audience("3-4");
    let wide =
      visible_indices(&entries, &state);
    assert_eq!(wide, vec![0, 2]);
    assert!(
      narrow
        .iter()
        .all(|idx| wide.contains(idx))
    );
  }

  #[test]
  fn days_combine_with_or() {
    let entries = listing();
    let mut state = FilterState::new();
    state.toggle_day("Thursday");
    assert_eq!(
      visible_indices(&entries, &state),
      vec![0, 1]
    );
    state.toggle_day("Friday");
    assert_eq!(
      visible_indices(&entries, &state),
      vec![0, 1, 3]
    );
  }

  #[test]
  fn impossible_combination_hides_teen_program()
  {
    let item = program(
      &["fc-teens"],
      &["13-18"],
      &["Thursday"]
    );
    let mut state = FilterState::new();
    state.set_category("fc-teens");
    assert!(is_visible(&item, &state));

    state.toggle_audience("3-4");
    assert!(!is_visible(&item, &state));
  }

  #[test]
  fn dimensions_are_anded() {
    let entries = listing();
    let mut state = FilterState::new();
    state.set_category("fc-teens");
    state.toggle_audience("18+");
    state.toggle_day("Friday");
    assert_eq!(
      visible_indices(&entries, &state),
      vec![3]
    );

    state.toggle_day("Friday");
    state.toggle_day("Sunday");
    assert_eq!(
      count_visible(&entries, &state),
      0
    );
  }

  #[test]
  fn program_without_days_is_hidden_by_day_filter()
  {
    let item =
      program(&["parents"], &["18+"], &[]);
    let mut state = FilterState::new();
    assert!(is_visible(&item, &state));
    state.toggle_day("Monday");
    assert!(!is_visible(&item, &state));
  }
}
