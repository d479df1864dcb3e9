use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  warn
};

const DEFAULT_CATALOG_TOML: &str =
  include_str!("../assets/messages.en.toml");

/// Opaque localization key such as
/// `EditListingAvailabilityForm.updateFailed`.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct MessageId(String);

impl MessageId {
  #[must_use]
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for MessageId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A message id together with the
/// values for its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub id:     MessageId,
  pub values: BTreeMap<String, String>
}

impl Message {
  #[must_use]
  pub fn new(id: MessageId) -> Self {
    Self {
      id,
      values: BTreeMap::new()
    }
  }

  #[must_use]
  pub fn with(
    mut self,
    key: &str,
    value: impl Into<String>
  ) -> Self {
    self
      .values
      .insert(key.to_string(), value.into());
    self
  }
}

/// Localization provider supplied by
/// the host.
pub trait Messages {
  fn format(&self, message: &Message) -> String;

  fn text(&self, id: &str) -> String {
    self.format(&Message::new(
      MessageId::new(id)
    ))
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
  entries: BTreeMap<String, String>
}

impl Catalog {
  /// The bundled English catalog.
  #[must_use]
  pub fn english() -> Self {
    match Self::from_toml(
      DEFAULT_CATALOG_TOML
    ) {
      | Ok(catalog) => catalog,
      | Err(err) => {
        tracing::error!(
          error = %err,
          "failed parsing bundled catalog; using empty catalog"
        );
        Self::default()
      }
    }
  }

  pub fn from_toml(
    raw: &str
  ) -> anyhow::Result<Self> {
    let table: toml::Table =
      toml::from_str(raw)
        .context("invalid message catalog")?;

    let mut entries = BTreeMap::new();
    flatten_table("", &table, &mut entries)?;
    debug!(
      messages = entries.len(),
      "loaded message catalog"
    );
    Ok(Self { entries })
  }

  #[tracing::instrument(skip(path))]
  pub fn load(
    path: &Path
  ) -> anyhow::Result<Self> {
    let raw = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    Self::from_toml(&raw).with_context(
      || format!("in {}", path.display())
    )
  }

  /// Entries of `other` win.
  pub fn merge(&mut self, other: Catalog) {
    self.entries.extend(other.entries);
  }

  #[must_use]
  pub fn get(
    &self,
    id: &str
  ) -> Option<&str> {
    self.entries.get(id).map(String::as_str)
  }
}

impl Messages for Catalog {
  fn format(&self, message: &Message) -> String {
    let Some(template) =
      self.get(message.id.as_str())
    else {
      warn!(
        id = %message.id,
        "missing message; rendering id"
      );
      return message.id.to_string();
    };
    interpolate(template, &message.values)
  }
}

fn flatten_table(
  prefix: &str,
  table: &toml::Table,
  out: &mut BTreeMap<String, String>
) -> anyhow::Result<()> {
  for (key, value) in table {
    let id = if prefix.is_empty() {
      key.clone()
    } else {
      format!("{prefix}.{key}")
    };
    match value {
      | toml::Value::String(text) => {
        out.insert(id, text.clone());
      }
      | toml::Value::Table(nested) => {
        flatten_table(&id, nested, out)?;
      }
      | other => {
        return Err(anyhow!(
          "message {id} must be a \
           string, got {}",
          other.type_str()
        ));
      }
    }
  }
  Ok(())
}

fn interpolate(
  template: &str,
  values: &BTreeMap<String, String>
) -> String {
  let mut out =
    String::with_capacity(template.len());
  let mut rest = template;

  while let Some(start) = rest.find('{') {
    out.push_str(&rest[..start]);
    let after = &rest[start + 1..];
    match after.find('}') {
      | Some(end) => {
        let name = after[..end].trim();
        match values.get(name) {
          | Some(value) => {
            out.push_str(value)
          }
          | None => {
            out.push_str(&rest[start..start + end + 2])
          }
        }
        rest = &after[end + 1..];
      }
      | None => {
        out.push_str(&rest[start..]);
        rest = "";
      }
    }
  }

  out.push_str(rest);
  out
}
