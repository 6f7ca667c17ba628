//! Owned mirror of the process environment.
//!
//! The engine owns its copy of every `NAME=value` string; the OS
//! environment is a downstream mirror, written through this type and never
//! read back after the startup import.

/// Ordered list of `NAME=value` entries, unique per name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environ {
    entries: Vec<String>,
}

impl Environ {
    pub fn new() -> Environ {
        Environ::default()
    }

    /// Build the mirror from startup `(name, value)` pairs, keeping the
    /// first entry when a name repeats.
    pub fn from_pairs<I, S>(pairs: I) -> Environ
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut env = Environ::new();
        for (name, value) in pairs {
            if env.get(name.as_ref()).is_none() {
                env.put(name.as_ref(), value.as_ref());
            }
        }
        env
    }

    /// Install or replace the entry for `name`. Replacement rewrites the
    /// entry in place, preserving its position.
    pub fn put(&mut self, name: &str, value: &str) {
        let entry = format!("{name}={value}");
        match self.position(name) {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove the entry for `name`. Returns whether one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// The value part of the entry for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|i| split_entry(&self.entries[i]))
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// The raw `NAME=value` strings, in installation order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(split_entry(e), Some((n, _)) if n == name))
    }
}

/// Split one `NAME=value` string at the first `=`. Entries without a `=`
/// are malformed and yield `None`.
pub fn split_entry(entry: &str) -> Option<(&str, &str)> {
    entry.split_once('=')
}

#[cfg(test)]
mod tests;
