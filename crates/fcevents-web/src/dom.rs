use anyhow::anyhow;
use fcevents_core::catalog::{
  Catalog,
  FilterOption
};
use fcevents_core::dimension::Dimension;
use fcevents_core::program::ProgramEntry;
use fcevents_core::sync::{
  ControlState,
  FilterTag,
  RenderSurface
};
use fcevents_core::weekday::normalize_day;
use tracing::{
  debug,
  warn
};
use wasm_bindgen::{
  JsCast,
  JsValue
};
use web_sys::{
  Document,
  Element,
  HtmlElement,
  HtmlInputElement
};

pub const LIST_SELECTOR: &str =
  ".programs-list, \
   .js-programs-filter-result";
pub const PROGRAM_SELECTOR: &str =
  ".program";
pub const CATEGORY_LINK_SELECTOR: &str =
  ".js-add-filter";
pub const FILTER_GROUP_SELECTOR: &str =
  ".program-filter-group";
pub const CHECKBOX_SELECTOR: &str =
  ".program-filter-group \
   input[type=\"checkbox\"]";
pub const EMPTY_STATE_SELECTOR: &str =
  ".no-program-matches";
pub const TAG_LIST_SELECTOR: &str =
  ".js-active-filters-list";
pub const HEADER_SELECTOR: &str =
  ".program-group-header-text";
pub const SUMMARY_SELECTOR: &str =
  ".active-filters-display";
pub const TAG_REMOVE_CLASS: &str =
  "js-filter-tag-remove";

const TITLE_SELECTOR: &str =
  ".program-title, h2, h3";

pub(crate) fn js_error(
  err: JsValue
) -> anyhow::Error {
  anyhow!("DOM call failed: {err:?}")
}

pub(crate) fn query_all(
  root: &Document,
  selector: &str
) -> anyhow::Result<Vec<Element>> {
  let nodes = root
    .query_selector_all(selector)
    .map_err(js_error)?;
  Ok(
    (0..nodes.length())
      .filter_map(|idx| nodes.get(idx))
      .filter_map(|node| {
        node.dyn_into::<Element>().ok()
      })
      .collect()
  )
}

fn query_within(
  container: &Element,
  selector: &str
) -> anyhow::Result<Vec<Element>> {
  let nodes = container
    .query_selector_all(selector)
    .map_err(js_error)?;
  Ok(
    (0..nodes.length())
      .filter_map(|idx| nodes.get(idx))
      .filter_map(|node| {
        node.dyn_into::<Element>().ok()
      })
      .collect()
  )
}

fn required(
  document: &Document,
  selector: &str
) -> anyhow::Result<Element> {
  document
    .query_selector(selector)
    .map_err(js_error)?
    .ok_or_else(|| {
      anyhow!(
        "missing required element \
         `{selector}`"
      )
    })
}

fn as_html(
  element: Element,
  selector: &str
) -> anyhow::Result<HtmlElement> {
  element
    .dyn_into::<HtmlElement>()
    .map_err(|_| {
      anyhow!(
        "`{selector}` is not an HTML \
         element"
      )
    })
}

pub(crate) fn set_display(
  element: &HtmlElement,
  value: &str
) -> anyhow::Result<()> {
  element
    .style()
    .set_property("display", value)
    .map_err(js_error)
}

/// Dimension of a checkbox: its group's
/// `data-filter-group-name`, else its own
/// `data-filter-name`.
pub(crate) fn checkbox_dimension(
  input: &Element
) -> Option<Dimension> {
  input
    .closest(FILTER_GROUP_SELECTOR)
    .ok()
    .flatten()
    .and_then(|group| {
      group.get_attribute(
        "data-filter-group-name"
      )
    })
    .or_else(|| {
      input.get_attribute("data-filter-name")
    })
    .and_then(|name| {
      Dimension::from_attr_name(&name)
    })
}

fn element_text(
  element: &Element
) -> Option<String> {
  element
    .text_content()
    .map(|text| text.trim().to_string())
    .filter(|text| !text.is_empty())
}

/// Label of a category link: its child
/// `span`, else the link text.
fn link_label(link: &Element) -> String {
  link
    .query_selector("span")
    .ok()
    .flatten()
    .and_then(|span| element_text(&span))
    .or_else(|| element_text(link))
    .unwrap_or_default()
}

/// Label of a checkbox: the element right
/// after it, else an enclosing `label`.
fn checkbox_label(input: &Element) -> String {
  input
    .next_element_sibling()
    .and_then(|next| element_text(&next))
    .or_else(|| {
      input
        .closest("label")
        .ok()
        .flatten()
        .and_then(|label| element_text(&label))
    })
    .unwrap_or_default()
}

fn control_key(
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

struct CategoryLink {
  element: Element,
  value:   String,
  label:   String
}

struct Checkbox {
  input:     HtmlInputElement,
  dimension: Dimension,
  value:     String,
  label:     String
}

/// Render surface over the page markup.
/// Elements are looked up once at bind
/// time.
pub struct DomSurface {
  document:    Document,
  items:       Vec<HtmlElement>,
  empty_state: HtmlElement,
  tag_list:    Element,
  header:      Element,
  summary:     Option<Element>,
  categories:  Vec<CategoryLink>,
  checkboxes:  Vec<Checkbox>
}

impl DomSurface {
  /// Reads the listing out of `document`
  /// and caches the elements the widget
  /// writes to.
  #[tracing::instrument(skip_all)]
  pub fn bind(
    document: &Document
  ) -> anyhow::Result<(Self, Vec<ProgramEntry>)>
  {
    let empty_state = as_html(
      required(
        document,
        EMPTY_STATE_SELECTOR
      )?,
      EMPTY_STATE_SELECTOR
    )?;
    let tag_list =
      required(document, TAG_LIST_SELECTOR)?;
    let header =
      required(document, HEADER_SELECTOR)?;
    let list =
      required(document, LIST_SELECTOR)?;
    let summary = document
      .query_selector(SUMMARY_SELECTOR)
      .map_err(js_error)?;
    if summary.is_none() {
      warn!(selector = SUMMARY_SELECTOR, "filter summary element not found");
    }

    let mut items = Vec::new();
    let mut entries = Vec::new();
    for (idx, element) in
      query_within(&list, PROGRAM_SELECTOR)?
        .into_iter()
        .enumerate()
    {
      entries.push(read_entry(idx, &element)?);
      items.push(as_html(
        element,
        PROGRAM_SELECTOR
      )?);
    }

    let categories = query_all(
      document,
      CATEGORY_LINK_SELECTOR
    )?
    .into_iter()
    .filter_map(|element| {
      let value = element
        .get_attribute("data-filter-value")?
        .trim()
        .to_string();
      let label = link_label(&element);
      Some(CategoryLink {
        element,
        value,
        label
      })
    })
    .collect::<Vec<_>>();

    let checkboxes =
      query_all(document, CHECKBOX_SELECTOR)?
        .into_iter()
        .filter_map(|element| {
          let Some(dimension) =
            checkbox_dimension(&element)
          else {
            warn!("checkbox outside a known filter group");
            return None;
          };
          let label = checkbox_label(&element);
          let input = element
            .dyn_into::<HtmlInputElement>()
            .ok()?;
          let value = control_key(
            dimension,
            &input.value()
          );
          Some(Checkbox {
            input,
            dimension,
            value,
            label
          })
        })
        .collect::<Vec<_>>();

    debug!(
      programs = items.len(),
      categories = categories.len(),
      checkboxes = checkboxes.len(),
      "bound filter widget to page"
    );

    Ok((
      Self {
        document: document.clone(),
        items,
        empty_state,
        tag_list,
        header,
        summary,
        categories,
        checkboxes
      },
      entries
    ))
  }

  /// `base` with its options replaced by
  /// the controls present on the page, so
  /// the ids and labels in the markup are
  /// the ones the widget accepts.
  pub fn page_catalog(
    &self,
    base: Catalog
  ) -> Catalog {
    let mut catalog = base;
    catalog.adopt_controls(
      Dimension::Category,
      self.categories.iter().map(|link| {
        FilterOption::new(
          &link.value,
          &link.label
        )
      })
    );
    for dim in
      [Dimension::Audience, Dimension::Day]
    {
      catalog.adopt_controls(
        dim,
        self
          .checkboxes
          .iter()
          .filter(|checkbox| {
            checkbox.dimension == dim
          })
          .map(|checkbox| {
            FilterOption::new(
              &checkbox.value,
              &checkbox.label
            )
          })
      );
    }
    catalog
  }

  fn tag_element(
    &self,
    tag: &FilterTag
  ) -> anyhow::Result<Element> {
    let document = &self.document;
    let chip = document
      .create_element("span")
      .map_err(js_error)?;
    chip.set_class_name("filter-tag");
    chip
      .append_child(
        &document.create_text_node(
          &format!("{}\u{a0}", tag.label)
        )
      )
      .map_err(js_error)?;

    let remove = document
      .create_element("span")
      .map_err(js_error)?;
    remove.set_class_name(
      "filter-tag-remove \
       js-filter-tag-remove"
    );
    remove
      .set_attribute(
        "data-filter-name",
        tag.dimension.attr_name()
      )
      .map_err(js_error)?;
    remove
      .set_attribute(
        "data-filter-value",
        &tag.value
      )
      .map_err(js_error)?;
    remove.set_text_content(Some("x"));

    chip
      .append_child(&remove)
      .map_err(js_error)?;
    Ok(chip)
  }
}

fn read_entry(
  idx: usize,
  element: &Element
) -> anyhow::Result<ProgramEntry> {
  let title = element
    .query_selector(TITLE_SELECTOR)
    .map_err(js_error)?
    .and_then(|title| title.text_content())
    .map(|title| title.trim().to_string())
    .filter(|title| !title.is_empty())
    .unwrap_or_else(|| {
      format!("program #{}", idx + 1)
    });
  let filter_blob = element
    .get_attribute("data-filter")
    .unwrap_or_default();
  let days_blob =
    element.get_attribute("data-filter-days");
  let text =
    element.text_content().unwrap_or_default();

  Ok(ProgramEntry::from_markup(
    &title,
    &filter_blob,
    days_blob.as_deref(),
    &text
  ))
}

impl RenderSurface for DomSurface {
  fn set_item_visible(
    &mut self,
    index: usize,
    visible: bool
  ) -> anyhow::Result<()> {
    let item =
      self.items.get(index).ok_or_else(
        || anyhow!("no program at {index}")
      )?;
    item
      .class_list()
      .toggle_with_force("active", visible)
      .map_err(js_error)?;
    set_display(
      item,
      if visible { "block" } else { "none" }
    )
  }

  fn set_empty_state_visible(
    &mut self,
    visible: bool,
    message: &str
  ) -> anyhow::Result<()> {
    if visible {
      self
        .empty_state
        .set_text_content(Some(message));
    }
    set_display(
      &self.empty_state,
      if visible { "block" } else { "none" }
    )
  }

  /// Also re-synchronizes every checkbox:
  /// a box is checked exactly when its value
  /// has a tag, so rejected values end up
  /// unchecked.
  fn replace_tags(
    &mut self,
    tags: &[FilterTag]
  ) -> anyhow::Result<()> {
    self.tag_list.set_inner_html("");
    for tag in tags {
      let chip = self.tag_element(tag)?;
      self
        .tag_list
        .append_child(&chip)
        .map_err(js_error)?;
    }

    for checkbox in &self.checkboxes {
      let checked = tags.iter().any(|tag| {
        tag.dimension == checkbox.dimension
          && tag.value == checkbox.value
      });
      checkbox.input.set_checked(checked);
    }
    Ok(())
  }

  fn set_category_header(
    &mut self,
    label: &str
  ) -> anyhow::Result<()> {
    self.header.set_text_content(Some(label));
    Ok(())
  }

  fn set_filter_summary(
    &mut self,
    summary: &str
  ) -> anyhow::Result<()> {
    if let Some(element) = &self.summary {
      element.set_text_content(Some(summary));
    }
    Ok(())
  }

  fn set_control_active(
    &mut self,
    control: &ControlState
  ) -> anyhow::Result<()> {
    if control.dimension != Dimension::Category
    {
      return Ok(());
    }
    for link in self
      .categories
      .iter()
      .filter(|link| link.value == control.value)
    {
      link
        .element
        .class_list()
        .toggle_with_force(
          "active",
          control.active
        )
        .map_err(js_error)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use fcevents_core::dimension::Dimension;

  use super::{
    LIST_SELECTOR,
    control_key
  };

  #[test]
  fn checkbox_values_use_canonical_ids() {
    assert_eq!(
      control_key(Dimension::Day, "thursday"),
      "Thursday"
    );
    assert_eq!(
      control_key(Dimension::Audience, " 5-12 "),
      "5-12"
    );
  }

  #[test]
  fn list_container_matches_both_markups() {
    let selectors = LIST_SELECTOR
      .split(',')
      .map(str::trim)
      .collect::<Vec<_>>();
    assert_eq!(
      selectors,
      vec![
        ".programs-list",
        ".js-programs-filter-result"
      ]
    );
  }
}
