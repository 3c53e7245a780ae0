use crate::config::CaseMode;

/// A named group of options, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    options: Vec<(String, String)>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            options: Vec::with_capacity(16),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate over `(option, value)` pairs in the order they were first added.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub(crate) fn get(&self, option: &str, case: CaseMode) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| case.matches(k, option))
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the option was inserted, `false` if an existing value was replaced.
    pub(crate) fn insert(&mut self, option: &str, value: String, case: CaseMode) -> bool {
        let existing = self.options.iter_mut().find(|(k, _)| case.matches(k, option));

        if let Some((_, slot)) = existing {
            *slot = value;
            false
        } else {
            self.options.push((option.to_owned(), value));
            true
        }
    }

    pub(crate) fn remove(&mut self, option: &str, case: CaseMode) -> bool {
        if let Some(i) = self.options.iter().position(|(k, _)| case.matches(k, option)) {
            self.options.remove(i);
            true
        } else {
            false
        }
    }
}
