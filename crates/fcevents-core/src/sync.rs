use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::Catalog;
use crate::dimension::{
  Dimension,
  Selection
};
use crate::filter::entry_visible;
use crate::program::ProgramEntry;
use crate::state::FilterState;

/// A removable chip for one active
/// multi-select value.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct FilterTag {
  pub dimension: Dimension,
  pub value:     String,
  pub label:     String
}

/// Whether one catalog control (category
/// link or checkbox) should be shown as
/// active/checked.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct ControlState {
  pub dimension: Dimension,
  pub value:     String,
  pub active:    bool
}

/// Everything one render pass writes,
/// computed without touching a surface.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct Frame {
  pub visibility:    Vec<bool>,
  pub visible_count: usize,
  pub show_empty:    bool,
  pub empty_message: String,
  pub tags:          Vec<FilterTag>,
  pub header:        String,
  pub summary:       String,
  pub controls:      Vec<ControlState>
}

impl Frame {
  pub fn visible_indices(
    &self
  ) -> Vec<usize> {
    self
      .visibility
      .iter()
      .enumerate()
      .filter(|(_, visible)| **visible)
      .map(|(idx, _)| idx)
      .collect()
  }
}

/// Presentation side of the widget. Every
/// call replaces what the previous pass
/// wrote.
pub trait RenderSurface {
  fn set_item_visible(
    &mut self,
    index: usize,
    visible: bool
  ) -> anyhow::Result<()>;

  fn set_empty_state_visible(
    &mut self,
    visible: bool,
    message: &str
  ) -> anyhow::Result<()>;

  fn replace_tags(
    &mut self,
    tags: &[FilterTag]
  ) -> anyhow::Result<()>;

  fn set_category_header(
    &mut self,
    label: &str
  ) -> anyhow::Result<()>;

  fn set_filter_summary(
    &mut self,
    summary: &str
  ) -> anyhow::Result<()>;

  fn set_control_active(
    &mut self,
    _control: &ControlState
  ) -> anyhow::Result<()> {
    Ok(())
  }
}

/// Text of the active-filter counter.
pub fn filter_summary(
  count: usize
) -> String {
  match count {
    | 0 => "all".to_string(),
    | 1 => "1 filter".to_string(),
    | n => format!("{n} filters")
  }
}

fn build_tags(
  state: &FilterState,
  catalog: &Catalog
) -> Vec<FilterTag> {
  let mut tags = Vec::new();

  for (dim, selection) in
    state.selections()
  {
    let Selection::Multi(ids) = selection
    else {
      continue;
    };

    let mut ordered = ids
      .iter()
      .map(|id| {
        (
          catalog
            .position(dim, id)
            .unwrap_or(usize::MAX),
          id
        )
      })
      .collect::<Vec<_>>();
    ordered.sort();

    tags.extend(ordered.into_iter().map(
      |(_, id)| FilterTag {
        dimension: dim,
        value:     id.clone(),
        label:     catalog
          .label(dim, id)
          .to_string()
      }
    ));
  }

  tags
}

fn build_controls(
  state: &FilterState,
  catalog: &Catalog
) -> Vec<ControlState> {
  Dimension::ALL_DIMENSIONS
    .into_iter()
    .flat_map(|dim| {
      catalog.options(dim).iter().map(
        move |option| {
          let active = match dim {
            | Dimension::Category => {
              state.active_category()
                == option.id
            }
            | _ => {
              state
                .is_active(dim, &option.id)
            }
          };
          ControlState {
            dimension: dim,
            value: option.id.clone(),
            active
          }
        }
      )
    })
    .collect()
}

/// Computes the full render output for
/// `entries` under `state`.
#[tracing::instrument(skip_all)]
pub fn compute_frame(
  entries: &[ProgramEntry],
  state: &FilterState,
  catalog: &Catalog
) -> Frame {
  let visibility = entries
    .iter()
    .map(|entry| {
      entry_visible(entry, state)
    })
    .collect::<Vec<_>>();
  let visible_count = visibility
    .iter()
    .filter(|visible| **visible)
    .count();

  let frame = Frame {
    visible_count,
    show_empty: visible_count == 0,
    empty_message: catalog
      .empty_message
      .clone(),
    tags: build_tags(state, catalog),
    header: catalog
      .header_label(
        state.active_category()
      )
      .to_string(),
    summary: filter_summary(
      state.active_count()
    ),
    controls: build_controls(
      state, catalog
    ),
    visibility
  };

  debug!(
    items = entries.len(),
    visible = frame.visible_count,
    tags = frame.tags.len(),
    header = %frame.header,
    "computed render frame"
  );
  frame
}

/// Writes `frame` to `surface`.
pub fn apply_frame<S>(
  frame: &Frame,
  surface: &mut S
) -> anyhow::Result<()>
where
  S: RenderSurface + ?Sized
{
  for (idx, visible) in
    frame.visibility.iter().enumerate()
  {
    surface
      .set_item_visible(idx, *visible)?;
  }
  surface.set_empty_state_visible(
    frame.show_empty,
    &frame.empty_message
  )?;
  surface.replace_tags(&frame.tags)?;
  surface
    .set_category_header(&frame.header)?;
  surface
    .set_filter_summary(&frame.summary)?;
  for control in &frame.controls {
    surface.set_control_active(control)?;
  }
  Ok(())
}

/// One full synchronization pass.
pub fn synchronize<S>(
  entries: &[ProgramEntry],
  state: &FilterState,
  catalog: &Catalog,
  surface: &mut S
) -> anyhow::Result<Frame>
where
  S: RenderSurface + ?Sized
{
  let frame =
    compute_frame(entries, state, catalog);
  apply_frame(&frame, surface)?;
  Ok(frame)
}

/// In-memory surface; keeps whatever the
/// last pass wrote. Every pass replaces
/// the tags exactly once, which is what
/// `passes` counts.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
  pub items:         Vec<bool>,
  pub empty_visible: bool,
  pub empty_message: String,
  pub tags:          Vec<FilterTag>,
  pub header:        String,
  pub summary:       String,
  pub controls:
    BTreeMap<(Dimension, String), bool>,
  pub passes:        usize
}

impl MemorySurface {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn visible_count(&self) -> usize {
    self
      .items
      .iter()
      .filter(|visible| **visible)
      .count()
  }

  pub fn is_control_active(
    &self,
    dim: Dimension,
    value: &str
  ) -> bool {
    self
      .controls
      .get(&(dim, value.to_string()))
      .copied()
      .unwrap_or(false)
  }
}

impl RenderSurface for MemorySurface {
  fn set_item_visible(
    &mut self,
    index: usize,
    visible: bool
  ) -> anyhow::Result<()> {
    if self.items.len() <= index {
      self.items.resize(index + 1, false);
    }
    self.items[index] = visible;
    Ok(())
  }

  fn set_empty_state_visible(
    &mut self,
    visible: bool,
    message: &str
  ) -> anyhow::Result<()> {
    self.empty_visible = visible;
    self.empty_message = message.to_string();
    Ok(())
  }

  fn replace_tags(
    &mut self,
    tags: &[FilterTag]
  ) -> anyhow::Result<()> {
    self.passes += 1;
    self.tags = tags.to_vec();
    Ok(())
  }

  fn set_category_header(
    &mut self,
    label: &str
  ) -> anyhow::Result<()> {
    self.header = label.to_string();
    Ok(())
  }

  fn set_filter_summary(
    &mut self,
    summary: &str
  ) -> anyhow::Result<()> {
    self.summary = summary.to_string();
    Ok(())
  }

  fn set_control_active(
    &mut self,
    control: &ControlState
  ) -> anyhow::Result<()> {
    self.controls.insert(
      (
        control.dimension,
        control.value.clone()
      ),
      control.active
    );
    Ok(())
  }
}
