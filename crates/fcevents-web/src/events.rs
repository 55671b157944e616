use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use fcevents_core::dimension::Dimension;
use fcevents_core::sync::Frame;
use fcevents_core::widget::Widget;
use gloo::events::EventListener;
use tracing::{
  debug,
  error,
  warn
};
use wasm_bindgen::JsCast;
use web_sys::{
  Document,
  Element,
  Event,
  HtmlElement,
  HtmlInputElement,
  Node
};

use crate::dom::{
  CATEGORY_LINK_SELECTOR,
  CHECKBOX_SELECTOR,
  DomSurface,
  FILTER_GROUP_SELECTOR,
  PROGRAM_SELECTOR,
  TAG_REMOVE_CLASS,
  checkbox_dimension,
  js_error,
  query_all,
  set_display
};

pub type SharedWidget =
  Rc<RefCell<Widget<DomSurface>>>;

const DETAILS_SELECTOR: &str =
  ".program-more-details";
const DETAILS_OPEN_SELECTOR: &str =
  ".program-more-details-open, \
   .program-more-details-button";
const DROPDOWN_TOGGLE_SELECTOR: &str =
  ".program-filter-group .fd-toggle";
const DROPDOWN_OPTIONS_SELECTOR: &str =
  ".program-filter-options";

fn event_element(
  event: &Event
) -> Option<Element> {
  event
    .target()
    .and_then(|target| {
      target.dyn_into::<Element>().ok()
    })
}

/// Runs one widget interaction. Events
/// arriving while a pass is running are
/// dropped.
fn with_widget<F>(
  widget: &SharedWidget,
  action: &'static str,
  interaction: F
) where
  F: FnOnce(
    &mut Widget<DomSurface>
  ) -> anyhow::Result<Frame>
{
  let Ok(mut widget) =
    widget.try_borrow_mut()
  else {
    warn!(action, "widget busy; ignoring event");
    return;
  };
  match interaction(&mut *widget) {
    | Ok(frame) => {
      debug!(
        action,
        visible = frame.visible_count,
        tags = frame.tags.len(),
        "filter pass complete"
      );
    }
    | Err(err) => {
      error!(action, error = %format!("{err:#}"), "filter pass failed");
    }
  }
}

/// Installs every listener of the widget.
/// The returned listeners detach when
/// dropped.
#[tracing::instrument(skip_all)]
pub fn attach(
  document: &Document,
  widget: &SharedWidget
) -> anyhow::Result<Vec<EventListener>> {
  let mut listeners = Vec::new();

  for link in
    query_all(document, CATEGORY_LINK_SELECTOR)?
  {
    let widget = widget.clone();
    let target = link.clone();
    listeners.push(EventListener::new(
      &link,
      "click",
      move |event| {
        event.prevent_default();
        let value = target
          .get_attribute("data-filter-value")
          .unwrap_or_default();
        with_widget(
          &widget,
          "select_category",
          |widget| {
            widget.select_category(&value)
          }
        );
      }
    ));
  }

  for element in
    query_all(document, CHECKBOX_SELECTOR)?
  {
    let Some(dimension) =
      checkbox_dimension(&element)
    else {
      continue;
    };
    let Ok(input) =
      element.dyn_into::<HtmlInputElement>()
    else {
      continue;
    };
    let widget = widget.clone();
    let target = input.clone();
    listeners.push(EventListener::new(
      &input,
      "change",
      move |_event| {
        let value = target.value();
        let checked = target.checked();
        with_widget(
          &widget,
          "set_checked",
          |widget| {
            widget.set_checked(
              dimension, &value, checked
            )
          }
        );
      }
    ));
  }

  {
    let widget = widget.clone();
    listeners.push(EventListener::new(
      document,
      "click",
      move |event| {
        let Some(target) = event_element(event)
        else {
          return;
        };
        if !target
          .class_list()
          .contains(TAG_REMOVE_CLASS)
        {
          return;
        }
        let Some(dimension) = target
          .get_attribute("data-filter-name")
          .and_then(|name| {
            Dimension::from_attr_name(&name)
          })
        else {
          warn!("tag remove control without a known filter name");
          return;
        };
        let value = target
          .get_attribute("data-filter-value")
          .unwrap_or_default();
        with_widget(
          &widget,
          "remove_filter",
          |widget| {
            widget
              .remove_filter(dimension, &value)
          }
        );
      }
    ));
  }

  listeners.extend(attach_details(document)?);
  listeners.extend(attach_dropdowns(document)?);

  debug!(
    listeners = listeners.len(),
    "filter listeners attached"
  );
  Ok(listeners)
}

/// Opening one program's details collapses
/// every other one.
fn attach_details(
  document: &Document
) -> anyhow::Result<Vec<EventListener>> {
  let mut listeners = Vec::new();
  for link in
    query_all(document, DETAILS_OPEN_SELECTOR)?
  {
    let document = document.clone();
    let target = link.clone();
    listeners.push(EventListener::new(
      &link,
      "click",
      move |event| {
        event.prevent_default();
        if let Err(err) =
          show_details(&document, &target)
        {
          error!(error = %format!("{err:#}"), "failed to toggle program details");
        }
      }
    ));
  }
  Ok(listeners)
}

fn show_details(
  document: &Document,
  link: &Element
) -> anyhow::Result<()> {
  for details in
    query_all(document, DETAILS_SELECTOR)?
  {
    if let Ok(details) =
      details.dyn_into::<HtmlElement>()
    {
      set_display(&details, "none")?;
    }
  }
  for program in
    query_all(document, PROGRAM_SELECTOR)?
  {
    program
      .class_list()
      .remove_1("focus")
      .map_err(js_error)?;
  }

  let program = link
    .closest(PROGRAM_SELECTOR)
    .map_err(js_error)?
    .ok_or_else(|| {
      anyhow!(
        "details link outside a program"
      )
    })?;
  if let Some(details) = program
    .query_selector(DETAILS_SELECTOR)
    .map_err(js_error)?
    .and_then(|details| {
      details.dyn_into::<HtmlElement>().ok()
    })
  {
    set_display(&details, "block")?;
  }
  program
    .class_list()
    .add_1("focus")
    .map_err(js_error)
}

fn dropdown_options(
  group: &Element
) -> Option<HtmlElement> {
  group
    .query_selector(DROPDOWN_OPTIONS_SELECTOR)
    .ok()
    .flatten()
    .and_then(|options| {
      options.dyn_into::<HtmlElement>().ok()
    })
}

/// Filter group dropdowns open on their
/// toggle and close on any click outside
/// the group.
fn attach_dropdowns(
  document: &Document
) -> anyhow::Result<Vec<EventListener>> {
  let mut listeners = Vec::new();

  for toggle in query_all(
    document,
    DROPDOWN_TOGGLE_SELECTOR
  )? {
    let target = toggle.clone();
    listeners.push(EventListener::new(
      &toggle,
      "click",
      move |_event| {
        let Some(options) = target
          .closest(FILTER_GROUP_SELECTOR)
          .ok()
          .flatten()
          .and_then(|group| {
            dropdown_options(&group)
          })
        else {
          return;
        };
        let open = options
          .style()
          .get_property_value("display")
          .map(|display| display == "block")
          .unwrap_or(false);
        if let Err(err) = set_display(
          &options,
          if open { "none" } else { "block" }
        ) {
          error!(error = %format!("{err:#}"), "failed to toggle filter options");
        }
      }
    ));
  }

  let groups =
    query_all(document, FILTER_GROUP_SELECTOR)?;
  listeners.push(EventListener::new(
    document,
    "click",
    move |event| {
      let Some(target) = event_element(event)
      else {
        return;
      };
      let target: &Node = &target;
      for group in &groups {
        if group.contains(Some(target)) {
          continue;
        }
        if let Some(options) =
          dropdown_options(group)
          && let Err(err) =
            set_display(&options, "none")
        {
          error!(error = %format!("{err:#}"), "failed to hide filter options");
        }
      }
    }
  ));

  Ok(listeners)
}
