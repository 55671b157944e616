use tracing::{
  debug,
  info,
  warn
};

use crate::catalog::Catalog;
use crate::dimension::Dimension;
use crate::program::ProgramEntry;
use crate::state::FilterState;
use crate::sync::{
  Frame,
  RenderSurface,
  synchronize
};
use crate::weekday::normalize_day;

/// One filter widget: its state, the
/// parsed listing and the surface it
/// renders to. Every interaction mutates
/// the state and then re-renders in full.
#[derive(Debug)]
pub struct Widget<S> {
  catalog: Catalog,
  entries: Vec<ProgramEntry>,
  state:   FilterState,
  surface: S
}

impl<S> Widget<S>
where
  S: RenderSurface
{
  /// Builds the widget and performs the
  /// initial render.
  #[tracing::instrument(skip_all)]
  pub fn init(
    catalog: Catalog,
    entries: Vec<ProgramEntry>,
    surface: S
  ) -> anyhow::Result<Self> {
    let mut widget = Self {
      catalog,
      entries,
      state: FilterState::new(),
      surface
    };
    let frame = widget.render()?;
    info!(
      programs = widget.entries.len(),
      visible = frame.visible_count,
      "filter widget initialized"
    );
    Ok(widget)
  }

  pub fn state(&self) -> &FilterState {
    &self.state
  }

  pub fn entries(
    &self
  ) -> &[ProgramEntry] {
    &self.entries
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  pub fn surface(&self) -> &S {
    &self.surface
  }

  pub fn surface_mut(
    &mut self
  ) -> &mut S {
    &mut self.surface
  }

  pub fn render(
    &mut self
  ) -> anyhow::Result<Frame> {
    synchronize(
      &self.entries,
      &self.state,
      &self.catalog,
      &mut self.surface
    )
  }

  /// Canonical id for a value read from a
  /// control, or `None` when the catalog
  /// does not list it.
  fn accept(
    &self,
    dim: Dimension,
    raw: &str
  ) -> Option<String> {
    let value = canonical_value(dim, raw);
    if value.is_empty() {
      warn!(dimension = %dim, "ignoring empty filter value");
      return None;
    }
    if !self.catalog.knows(dim, &value) {
      warn!(dimension = %dim, value = %value, "ignoring filter value not listed in catalog");
      return None;
    }
    Some(value)
  }

  #[tracing::instrument(skip(self))]
  pub fn select_category(
    &mut self,
    id: &str
  ) -> anyhow::Result<Frame> {
    if let Some(id) =
      self.accept(Dimension::Category, id)
    {
      self.state.set_category(&id);
    }
    self.render()
  }

  /// Checkbox change: `checked` is the
  /// control's new state.
  #[tracing::instrument(skip(self))]
  pub fn set_checked(
    &mut self,
    dim: Dimension,
    value: &str,
    checked: bool
  ) -> anyhow::Result<Frame> {
    if let Some(value) =
      self.accept(dim, value)
    {
      self
        .state
        .set_checked(dim, &value, checked);
    }
    self.render()
  }

  #[tracing::instrument(skip(self))]
  pub fn toggle(
    &mut self,
    dim: Dimension,
    value: &str
  ) -> anyhow::Result<Frame> {
    if let Some(value) =
      self.accept(dim, value)
    {
      self.state.toggle(dim, &value);
    }
    self.render()
  }

  /// Tag removal (or header reset for the
  /// category).
  #[tracing::instrument(skip(self))]
  pub fn remove_filter(
    &mut self,
    dim: Dimension,
    value: &str
  ) -> anyhow::Result<Frame> {
    let value = canonical_value(dim, value);
    self.state.remove_filter(dim, &value);
    self.render()
  }

  pub fn clear_filters(
    &mut self
  ) -> anyhow::Result<Frame> {
    self.state.clear();
    self.render()
  }

  /// Applies a whole selection at once and
  /// renders a single time.
  #[tracing::instrument(skip_all)]
  pub fn apply_selection<'a, I>(
    &mut self,
    category: Option<&str>,
    values: I
  ) -> anyhow::Result<Frame>
  where
    I: IntoIterator<Item = (Dimension, &'a str)>
  {
    if let Some(id) = category
      && let Some(id) =
        self.accept(Dimension::Category, id)
    {
      self.state.set_category(&id);
    }
    for (dim, raw) in values {
      if let Some(value) =
        self.accept(dim, raw)
      {
        self
          .state
          .set_checked(dim, &value, true);
      }
    }
    debug!(state = ?self.state, "applied selection");
    self.render()
  }
}

fn canonical_value(
  dim: Dimension,
  raw: &str
) -> String {
  match dim {
    | Dimension::Day => normalize_day(raw),
    | Dimension::Category
    | Dimension::Audience => {
      raw.trim().to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::Widget;
  use crate::catalog::{
    Catalog,
    FilterOption
  };
  use crate::dimension::{
    ALL,
    Dimension
  };
  use crate::program::{
    Program,
    ProgramEntry
  };
  use crate::sync::MemorySurface;

  fn set(
    values: &[&str]
  ) -> BTreeSet<String> {
    values
      .iter()
      .map(|v| v.to_string())
      .collect()
  }

  fn widget() -> Widget<MemorySurface> {
    let entries = vec![
      ProgramEntry::new(
        "Teen Night",
        Program {
          groups:    set(&["fc-teens"]),
          audiences: set(&["13-18"]),
          days:      set(&["Thursday"])
        }
      ),
      ProgramEntry::new(
        "Junior Club",
        Program {
          groups:    set(&["fc-junior"]),
          audiences: set(&["5-12"]),
          days:      set(&["Thursday"])
        }
      ),
      ProgramEntry::new(
        "Parents Circle",
        Program {
          groups:    set(&["parents"]),
          audiences: set(&["18+"]),
          days:      set(&["Monday"])
        }
      ),
    ];
    Widget::init(
      Catalog::builtin(),
      entries,
      MemorySurface::new()
    )
    .expect("init widget")
  }

  #[test]
  fn init_renders_everything_visible() {
    let widget = widget();
    let surface = widget.surface();
    assert_eq!(surface.visible_count(), 3);
    assert!(!surface.empty_visible);
    assert!(surface.tags.is_empty());
    assert_eq!(surface.header, "All Programs");
    assert_eq!(surface.summary, "all");
  }

  #[test]
  fn tag_removal_round_trip() {
    let mut widget = widget();
    let before =
      widget.surface().items.clone();

    let frame = widget
      .set_checked(
        Dimension::Audience,
        "5-12",
        true
      )
      .expect("check 5-12");
    assert_eq!(frame.tags.len(), 1);
    assert_eq!(
      frame.tags[0].label,
      "Ages 5-12"
    );
    assert_eq!(frame.visible_indices(), vec![1]);

    let tag = frame.tags[0].clone();
    widget
      .remove_filter(tag.dimension, &tag.value)
      .expect("remove tag");
    let surface = widget.surface();
    assert!(surface.tags.is_empty());
    assert_eq!(surface.items, before);
    assert!(!surface.is_control_active(
      Dimension::Audience,
      "5-12"
    ));
  }

  #[test]
  fn category_header_tracks_selection() {
    let mut widget = widget();
    widget
      .select_category("fc-teens")
      .expect("select teens");
    assert_eq!(
      widget.surface().header,
      "FC Teens"
    );
    assert_eq!(
      widget.surface().visible_count(),
      1
    );

    widget
      .remove_filter(
        Dimension::Category,
        "fc-teens"
      )
      .expect("reset category");
    assert_eq!(
      widget.state().active_category(),
      ALL
    );
    assert_eq!(
      widget.surface().header,
      "All Programs"
    );
  }

  #[test]
  fn injected_values_are_rejected() {
    let mut widget = widget();
    let frame = widget
      .set_checked(
        Dimension::Audience,
        "<script>alert(\"XSS\")</script>",
        true
      )
      .expect("render after rejection");

    assert!(
      widget
        .state()
        .active_audiences()
        .is_empty()
    );
    assert_eq!(frame.visible_count, 3);
    assert!(frame.tags.is_empty());

    widget
      .select_category("no-such-category")
      .expect("render after rejection");
    assert_eq!(
      widget.state().active_category(),
      ALL
    );
  }

  #[test]
  fn day_values_are_normalized() {
    let mut widget = widget();
    let frame = widget
      .set_checked(
        Dimension::Day,
        "thursday",
        true
      )
      .expect("check thursday");
    assert_eq!(frame.visible_indices(), vec![0, 1]);
    assert!(
      widget
        .state()
        .active_days()
        .contains("Thursday")
    );
  }

  #[test]
  fn apply_selection_renders_once() {
    let mut widget = widget();
    let passes = widget.surface().passes;
    let frame = widget
      .apply_selection(
        Some("fc-teens"),
        [
          (Dimension::Audience, "5-12"),
          (Dimension::Day, "Thursday")
        ]
      )
      .expect("apply selection");

    assert_eq!(
      widget.surface().passes,
      passes + 1
    );
    assert_eq!(frame.visible_count, 0);
    assert!(frame.show_empty);

    let frame = widget
      .clear_filters()
      .expect("clear");
    assert_eq!(frame.visible_count, 3);
  }

  #[test]
  fn page_control_ids_drive_the_filter() {
    let mut catalog = Catalog::builtin();
    catalog.adopt_controls(
      Dimension::Category,
      [
        FilterOption::new("all", "All Programs"),
        FilterOption::new("jr", "FC Junior"),
        FilterOption::new("teens", "FC Teens")
      ]
    );
    catalog.adopt_controls(
      Dimension::Audience,
      [FilterOption::new("13-18", "Teenagers")]
    );
    let entries = vec![
      ProgramEntry::new(
        "Teen Night",
        Program {
          groups:    set(&["teens"]),
          audiences: set(&["13-18"]),
          days:      set(&["Thursday"])
        }
      ),
      ProgramEntry::new(
        "Junior Club",
        Program {
          groups:    set(&["jr"]),
          audiences: set(&["5-12"]),
          days:      set(&["Saturday"])
        }
      ),
    ];
    let mut widget = Widget::init(
      catalog,
      entries,
      MemorySurface::new()
    )
    .expect("init widget");

    let frame = widget
      .select_category("teens")
      .expect("select teens");
    assert_eq!(
      widget.state().active_category(),
      "teens"
    );
    assert_eq!(frame.visible_indices(), vec![0]);
    assert_eq!(frame.header, "FC Teens");

    let frame = widget
      .set_checked(
        Dimension::Audience,
        "13-18",
        true
      )
      .expect("check 13-18");
    assert_eq!(frame.tags.len(), 1);
    assert_eq!(frame.tags[0].label, "Teenagers");
  }
}
