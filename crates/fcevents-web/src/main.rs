mod dom;
mod events;

use std::cell::RefCell;
use std::rc::Rc;

use fcevents_core::catalog::Catalog;
use fcevents_core::widget::Widget;
use gloo::events::EventListener;
use web_sys::Document;

fn start(
  document: &Document
) -> anyhow::Result<()> {
  let (surface, entries) =
    dom::DomSurface::bind(document)?;
  let catalog =
    surface.page_catalog(Catalog::builtin());
  let widget = Rc::new(RefCell::new(
    Widget::init(
      catalog,
      entries,
      surface
    )?
  ));

  events::attach(document, &widget)?
    .into_iter()
    .for_each(EventListener::forget);
  Ok(())
}

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting fcevents filter widget"
  );

  let document = web_sys::window()
    .and_then(|window| {
      window.document()
    })
    .expect("missing document");

  if let Err(err) = start(&document) {
    panic!(
      "filter widget failed to start: \
       {err:#}"
    );
  }
}
