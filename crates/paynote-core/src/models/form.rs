use std::collections::BTreeMap;

/// Flattened values of a structured form submission, keyed by input (action) id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredForm {
    values: BTreeMap<String, String>,
}

impl StructuredForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Value for `key`, or the empty string when the input was left blank.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }
}

impl<K, V> FromIterator<(K, V)> for StructuredForm
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = StructuredForm::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}
