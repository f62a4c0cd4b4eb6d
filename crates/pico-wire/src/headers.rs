/// Ordered header multimap with case-insensitive, lower-cased keys.
///
/// Insertion order is preserved and repeated names accumulate as separate
/// entries (multi-value rather than comma-join); single values round-trip
/// exactly through [`encode_header`](crate::encode_header) and
/// [`parse_header`](crate::parse_header).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `name`, keeping any existing entries.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .push((name.trim().to_ascii_lowercase(), value.into()));
    }

    /// Replace every entry for `name` with a single value.
    ///
    /// The replacement lands where the first occurrence was, or at the end
    /// when the name was absent.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter().position(|(k, _)| *k == name) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut i = first + 1;
                while i < self.entries.len() {
                    if self.entries[i].0 == name {
                        self.entries.remove(i);
                    } else {
                        i += 1;
                    }
                }
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Remove every entry for `name`, returning whether any existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != name);
        self.entries.len() != before
    }

    /// First value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        let name = name.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .filter(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Headers {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.append(k, v);
        }
        headers
    }
}
