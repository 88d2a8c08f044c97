//! Path parameters bound by a matched route.

use regex::Captures;

/// Named values captured from the request path, in the order the route declares them.
///
/// For the route `/api/data/:id/:name` and the path `/api/data/42/bob` this
/// holds `id = "42"` and `name = "bob"`. Values are the exact substrings of
/// the path; nothing is decoded or converted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: Vec<(String, String)>,
}

impl PathParams {
    #[inline]
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Gets the value bound to `name`, if the route declares it.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
        let name = name.as_ref();
        self.entries.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Iterates `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// Pairs parameter names with the groups captured at the same position.
///
/// Capture group 0 is the whole match and is skipped. Should the two lists
/// disagree in length, pairing stops at the shorter one.
pub(crate) fn extract(names: &[String], captures: &Captures<'_>) -> PathParams {
    let entries = names
        .iter()
        .zip(captures.iter().skip(1))
        .filter_map(|(name, value)| value.map(|value| (name.clone(), value.as_str().to_owned())))
        .collect();

    PathParams { entries }
}
