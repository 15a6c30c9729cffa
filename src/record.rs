//! The unit a row transform mutates.

use indexmap::IndexMap;
use indexmap::map::Iter;

/// One CSV row as an ordered field-name → value mapping.
///
/// Fields start out in header order. Inserting a new field appends it, and
/// removing a field keeps the relative order of the rest, so the order a
/// transform introduces fields in is observable through [`Record::field_names`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair each header name with the value at the same position.
    ///
    /// Missing trailing values become empty strings.
    pub fn from_row<'a, H, V>(header: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        let mut values = values.into_iter();
        let fields = header
            .into_iter()
            .map(|name| (name.to_string(), values.next().unwrap_or_default().to_string()))
            .collect();
        Self { fields }
    }

    /// A record carrying every header field set to `placeholder`.
    pub fn placeholder<'a, H>(header: H, placeholder: &str) -> Self
    where
        H: IntoIterator<Item = &'a str>,
    {
        let fields = header
            .into_iter()
            .map(|name| (name.to_string(), placeholder.to_string()))
            .collect();
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn get_mut(&mut self, field: &str) -> Option<&mut String> {
        self.fields.get_mut(field)
    }

    /// Set `field` to `value`, returning the previous value if the field existed.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove `field`, preserving the order of the remaining fields.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.shift_remove(field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
