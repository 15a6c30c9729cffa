//! Row transforms: the caller-supplied per-record mutation.
//!
//! A [`RowTransform`] is applied once to every record of the input and once
//! more per chunk to a *probe* record whose values are all placeholders. The
//! probe run is how the output schema is discovered, so a transform must be
//! safe to call on placeholder data and should decide which fields exist
//! without looking at the values.
//!
//! Plain closures implement the trait:
//!
//! ```
//! use ironshard::{Record, RowTransform};
//!
//! let upper = |r: &mut Record| -> anyhow::Result<()> {
//!     if let Some(name) = r.get_mut("name") {
//!         *name = name.to_uppercase();
//!     }
//!     Ok(())
//! };
//!
//! let mut r = Record::from_row(["name"], ["ada"]);
//! upper.apply(&mut r).unwrap();
//! assert_eq!(r.get("name"), Some("ADA"));
//! ```

use crate::record::Record;
use anyhow::Result;

/// A pure function of one record that may add, remove, or rewrite fields.
///
/// Implementations must not share mutable state across calls: workers invoke
/// the same transform concurrently on different chunks.
pub trait RowTransform: Send + Sync {
    fn apply(&self, record: &mut Record) -> Result<()>;

    /// Label used in log lines.
    fn name(&self) -> &str {
        "transform"
    }
}

impl<F> RowTransform for F
where
    F: Fn(&mut Record) -> Result<()> + Send + Sync,
{
    fn apply(&self, record: &mut Record) -> Result<()> {
        self(record)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Leaves every record untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl RowTransform for Identity {
    fn apply(&self, _record: &mut Record) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Sets one column to a constant on every record, appending it when new.
#[derive(Clone, Debug)]
pub struct AddColumn {
    pub column: String,
    pub value: String,
}

impl AddColumn {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl Default for AddColumn {
    fn default() -> Self {
        Self::new("new_column", "default_value")
    }
}

impl RowTransform for AddColumn {
    fn apply(&self, record: &mut Record) -> Result<()> {
        record.set(self.column.as_str(), self.value.as_str());
        Ok(())
    }

    fn name(&self) -> &str {
        "add_column"
    }
}
