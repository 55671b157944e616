use anyhow::{
  Context,
  anyhow
};
use serde::{
  Deserialize,
  Serialize
};

use crate::dimension::{
  ALL,
  Dimension
};
use crate::weekday::{
  WEEK_ORDER,
  normalize_day,
  weekday_label
};

const BUILTIN_CATALOG_TOML: &str =
  include_str!("../assets/catalog.toml");

pub const DEFAULT_HEADER: &str =
  "All Programs";
pub const DEFAULT_EMPTY_MESSAGE: &str =
  "Oops, there are no programs that \
   match your selected \
   category/filters.";

/// One selectable value of a dimension:
/// a category link or a checkbox.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct FilterOption {
  #[serde(default)]
  pub id:    String,
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub color: Option<String>
}

impl FilterOption {
  pub fn new(
    id: &str,
    label: &str
  ) -> Self {
    Self {
      id:    id.to_string(),
      label: label.to_string(),
      color: None
    }
  }

  /// `#rrggbb` (or `#rgb`) colour as RGB
  /// components.
  pub fn rgb(&self) -> Option<(u8, u8, u8)> {
    let hex = self
      .color
      .as_deref()?
      .trim()
      .strip_prefix('#')?;
    let channel = |text: &str| {
      u8::from_str_radix(text, 16).ok()
    };
    match hex.len() {
      | 6 => Some((
        channel(hex.get(0..2)?)?,
        channel(hex.get(2..4)?)?,
        channel(hex.get(4..6)?)?
      )),
      | 3 => {
        let short = |idx: usize| {
          channel(hex.get(idx..idx + 1)?)
            .map(|value| value * 17)
        };
        Some((short(0)?, short(1)?, short(2)?))
      }
      | _ => None
    }
  }
}

/// Known categories and filter options
/// plus the user-facing texts.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct Catalog {
  #[serde(default)]
  pub version:        u32,
  #[serde(default = "default_header")]
  pub default_header: String,
  #[serde(
    default = "default_empty_message"
  )]
  pub empty_message:  String,
  #[serde(default)]
  pub categories:     Vec<FilterOption>,
  #[serde(default)]
  pub audiences:      Vec<FilterOption>,
  #[serde(default)]
  pub days:           Vec<FilterOption>
}

fn default_header() -> String {
  DEFAULT_HEADER.to_string()
}

fn default_empty_message() -> String {
  DEFAULT_EMPTY_MESSAGE.to_string()
}

impl Default for Catalog {
  fn default() -> Self {
    Self {
      version:        0,
      default_header: default_header(),
      empty_message:
        default_empty_message(),
      categories:     vec![
        FilterOption::new(
          ALL,
          DEFAULT_HEADER
        ),
      ],
      audiences:      vec![],
      days:           WEEK_ORDER
        .iter()
        .map(|day| {
          let label = weekday_label(*day);
          FilterOption::new(label, label)
        })
        .collect()
    }
  }
}

impl Catalog {
  /// The catalog embedded in the crate.
  /// Falls back to [`Catalog::default`]
  /// when the embedded file is empty or
  /// broken.
  pub fn builtin() -> Self {
    match Self::from_toml_str(
      BUILTIN_CATALOG_TOML
    ) {
      | Ok(catalog)
        if !catalog
          .categories
          .is_empty() =>
      {
        tracing::info!(
          version = catalog.version,
          categories =
            catalog.categories.len(),
          audiences =
            catalog.audiences.len(),
          "loaded built-in catalog"
        );
        catalog
      }
      | Ok(_) => {
        tracing::warn!(
          "built-in catalog was empty; \
           using fallback catalog"
        );
        Self::default()
      }
      | Err(error) => {
        tracing::error!(error = %format!("{error:#}"), "failed to parse built-in catalog; using fallback catalog");
        Self::default()
      }
    }
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut catalog: Catalog =
      toml::from_str(text)
        .context("invalid catalog toml")?;
    catalog.normalize()?;
    Ok(catalog)
  }

  /// Fills missing ids from labels (and
  /// the reverse), canonicalizes day ids
  /// and rejects duplicates.
  fn normalize(
    &mut self
  ) -> anyhow::Result<()> {
    for dim in Dimension::ALL_DIMENSIONS
    {
      let options = self.options_mut(dim);
      for option in options.iter_mut() {
        if option.id.trim().is_empty() {
          option.id = filter_value_slug(
            &option.label
          );
        }
        if dim == Dimension::Day {
          option.id =
            normalize_day(&option.id);
        }
        if option.label.trim().is_empty()
        {
          option.label =
            option.id.clone();
        }
      }

      if let Some(option) =
        options.iter().find(|option| {
          option.id.is_empty()
        })
      {
        return Err(anyhow!(
          "{dim} option has neither id \
           nor label: {option:?}"
        ));
      }

      for (idx, option) in
        options.iter().enumerate()
      {
        if options[..idx]
          .iter()
          .any(|prev| prev.id == option.id)
        {
          return Err(anyhow!(
            "duplicate {dim} option id: \
             {}",
            option.id
          ));
        }
      }
    }
    Ok(())
  }

  pub fn options(
    &self,
    dim: Dimension
  ) -> &[FilterOption] {
    match dim {
      | Dimension::Category => {
        &self.categories
      }
      | Dimension::Audience => {
        &self.audiences
      }
      | Dimension::Day => &self.days
    }
  }

  fn options_mut(
    &mut self,
    dim: Dimension
  ) -> &mut Vec<FilterOption> {
    match dim {
      | Dimension::Category => {
        &mut self.categories
      }
      | Dimension::Audience => {
        &mut self.audiences
      }
      | Dimension::Day => &mut self.days
    }
  }

  pub fn option(
    &self,
    dim: Dimension,
    id: &str
  ) -> Option<&FilterOption> {
    self
      .options(dim)
      .iter()
      .find(|option| option.id == id)
  }

  /// Whether `id` may become an active
  /// filter. A dimension without listed
  /// options accepts any id; the `all`
  /// sentinel is always a valid category.
  pub fn knows(
    &self,
    dim: Dimension,
    id: &str
  ) -> bool {
    if dim == Dimension::Category
      && id == ALL
    {
      return true;
    }
    let options = self.options(dim);
    options.is_empty()
      || options
        .iter()
        .any(|option| option.id == id)
  }

  /// Display text for a tag; the raw id
  /// when the catalog has no label.
  pub fn label<'a>(
    &'a self,
    dim: Dimension,
    id: &'a str
  ) -> &'a str {
    self
      .option(dim, id)
      .map(|option| option.label.as_str())
      .unwrap_or(id)
  }

  /// Category header text. `all` and
  /// unknown categories show the default
  /// header.
  pub fn header_label(
    &self,
    category: &str
  ) -> &str {
    if category == ALL {
      return &self.default_header;
    }
    self
      .option(Dimension::Category, category)
      .map(|option| option.label.as_str())
      .unwrap_or(
        self.default_header.as_str()
      )
  }

  /// Replaces the options of `dim` with
  /// the controls found on a page, in page
  /// order. Blank control labels and
  /// missing colours are filled from the
  /// catalog entry with the same id. An
  /// `all` category control also sets the
  /// default header. Without controls the
  /// catalog options stay as they are.
  #[tracing::instrument(skip(
    self, controls
  ))]
  pub fn adopt_controls<I>(
    &mut self,
    dim: Dimension,
    controls: I
  ) where
    I: IntoIterator<Item = FilterOption>
  {
    let mut adopted: Vec<FilterOption> =
      Vec::new();
    for mut control in controls {
      control.id = match dim {
        | Dimension::Day => {
          normalize_day(&control.id)
        }
        | Dimension::Category
        | Dimension::Audience => {
          control.id.trim().to_string()
        }
      };
      control.label =
        control.label.trim().to_string();
      if control.id.is_empty()
        || adopted
          .iter()
          .any(|prev| prev.id == control.id)
      {
        continue;
      }

      let known = self.option(dim, &control.id);
      if control.label.is_empty() {
        control.label = known
          .map(|option| option.label.clone())
          .unwrap_or_else(|| control.id.clone());
      }
      if control.color.is_none() {
        control.color = known
          .and_then(|option| option.color.clone());
      }
      if dim == Dimension::Category
        && control.id == ALL
      {
        self.default_header =
          control.label.clone();
      }
      adopted.push(control);
    }

    if adopted.is_empty() {
      return;
    }
    tracing::debug!(
      dimension = %dim,
      options = adopted.len(),
      "adopted page controls"
    );
    *self.options_mut(dim) = adopted;
  }

  /// Position of `id` among the options
  /// of `dim`, used to order tags.
  pub fn position(
    &self,
    dim: Dimension,
    id: &str
  ) -> Option<usize> {
    self
      .options(dim)
      .iter()
      .position(|option| option.id == id)
  }
}

/// Filter value for a control label:
/// trimmed, lowercased, whitespace runs
/// joined with `-`.
#[must_use]
pub fn filter_value_slug(
  label: &str
) -> String {
  label
    .split_whitespace()
    .map(str::to_lowercase)
    .collect::<Vec<_>>()
    .join("-")
}

#[cfg(test)]
mod tests {
  use super::{
    Catalog,
    DEFAULT_EMPTY_MESSAGE,
    FilterOption,
    filter_value_slug
  };
  use crate::dimension::Dimension;

  #[test]
  fn slug_matches_control_values() {
    let cases = [
      ("Test Category", "test-category"),
      (
        "Multiple Word Category",
        "multiple-word-category"
      ),
      ("UPPERCASE", "uppercase"),
      ("", ""),
      ("123", "123"),
      ("   Trimmed   ", "trimmed"),
      ("FC  Teens", "fc-teens")
    ];
    for (input, expected) in cases {
      assert_eq!(
        filter_value_slug(input),
        expected,
        "slug of {input:?}"
      );
    }
  }

  #[test]
  fn builtin_catalog_lists_every_category()
  {
    let catalog = Catalog::builtin();
    let labels = catalog
      .categories
      .iter()
      .map(|option| option.label.as_str())
      .collect::<Vec<_>>();
    assert_eq!(
      labels,
      vec![
        "All Programs",
        "FC Junior",
        "FC Teens",
        "FC Adult",
        "Parents",
        "Families",
        "Community",
        "Friendmaker"
      ]
    );

    for option in
      catalog.categories.iter().skip(1)
    {
      assert_eq!(
        option.id,
        filter_value_slug(&option.label)
      );
    }
    assert_eq!(
      catalog.empty_message,
      DEFAULT_EMPTY_MESSAGE
    );
  }

  #[test]
  fn header_falls_back_to_default() {
    let catalog = Catalog::builtin();
    assert_eq!(
      catalog.header_label("fc-teens"),
      "FC Teens"
    );
    assert_eq!(
      catalog.header_label("all"),
      "All Programs"
    );
    assert_eq!(
      catalog.header_label("jr"),
      "All Programs"
    );
  }

  #[test]
  fn knows_rejects_unlisted_values() {
    let catalog = Catalog::builtin();
    assert!(catalog.knows(
      Dimension::Audience,
      "5-12"
    ));
    assert!(!catalog.knows(
      Dimension::Audience,
      "<script>alert(\"XSS\")</script>"
    ));
    assert!(catalog.knows(
      Dimension::Category,
      "all"
    ));
    assert_eq!(
      catalog.label(
        Dimension::Audience,
        "5-12"
      ),
      "Ages 5-12"
    );
    assert_eq!(
      catalog.label(
        Dimension::Audience,
        "99+"
      ),
      "99+"
    );
  }

  #[test]
  fn day_ids_are_canonicalized() {
    let catalog = Catalog::from_toml_str(
      r#"
        [[days]]
        id = "thursday"

        [[days]]
        label = "Fri"
      "#
    )
    .expect("parse catalog");

    let ids = catalog
      .days
      .iter()
      .map(|option| option.id.as_str())
      .collect::<Vec<_>>();
    assert_eq!(ids, vec!["Thursday", "Friday"]);
    assert_eq!(
      catalog.default_header,
      "All Programs"
    );
  }

  #[test]
  fn duplicate_ids_are_rejected() {
    let err = Catalog::from_toml_str(
      r#"
        [[categories]]
        label = "Parents"

        [[categories]]
        id = "parents"
      "#
    )
    .expect_err("duplicate ids");
    assert!(
      format!("{err:#}")
        .contains("duplicate")
    );
  }

  #[test]
  fn page_controls_replace_catalog_options()
  {
    let mut catalog = Catalog::builtin();
    catalog.adopt_controls(
      Dimension::Category,
      [
        FilterOption::new("all", "Everything"),
        FilterOption::new("jr", "FC Junior"),
        FilterOption::new("teens", "FC Teens"),
        FilterOption::new("parents", "")
      ]
    );

    assert!(catalog.knows(
      Dimension::Category,
      "teens"
    ));
    assert!(!catalog.knows(
      Dimension::Category,
      "fc-teens"
    ));
    assert_eq!(
      catalog.header_label("jr"),
      "FC Junior"
    );
    assert_eq!(
      catalog.header_label("all"),
      "Everything"
    );
    let parents = catalog
      .option(Dimension::Category, "parents")
      .expect("parents option");
    assert_eq!(parents.label, "Parents");
    assert_eq!(
      parents.color.as_deref(),
      Some("#669bbc")
    );
  }

  #[test]
  fn page_day_controls_are_canonical() {
    let mut catalog = Catalog::builtin();
    catalog.adopt_controls(
      Dimension::Day,
      [
        FilterOption::new("thursday", ""),
        FilterOption::new("Thursday", "dup"),
        FilterOption::new("  ", "blank")
      ]
    );
    assert_eq!(catalog.days.len(), 1);
    assert_eq!(catalog.days[0].id, "Thursday");
    assert_eq!(catalog.days[0].label, "Thursday");

    let audiences = catalog.audiences.clone();
    catalog.adopt_controls(
      Dimension::Audience,
      Vec::new()
    );
    assert_eq!(catalog.audiences, audiences);
  }

  #[test]
  fn colors_parse_as_rgb() {
    let catalog = Catalog::builtin();
    let teens = catalog
      .option(Dimension::Category, "fc-teens")
      .expect("teens option");
    assert_eq!(
      teens.rgb(),
      Some((0xe4, 0x57, 0x2e))
    );

    let mut short =
      FilterOption::new("x", "X");
    short.color = Some("#fa0".to_string());
    assert_eq!(
      short.rgb(),
      Some((255, 170, 0))
    );
    short.color = Some("teal".to_string());
    assert_eq!(short.rgb(), None);
  }

  #[test]
  fn default_catalog_accepts_any_audience()
  {
    let catalog = Catalog::default();
    assert!(catalog.knows(
      Dimension::Audience,
      "anything"
    ));
    assert_eq!(catalog.days.len(), 7);
  }
}
