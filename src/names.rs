//! Layer id to equipment file name table.

use std::borrow::Cow;
use std::collections::BTreeMap;

use log::warn;

use crate::error::LayercutError;

/// Ordered layer-id to name mapping with an `Equipment_<id>` fallback.
///
/// Keys are unique. Names may repeat: two layers that share a name write
/// the same output file, the later one winning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentNames {
    entries: Vec<(String, String)>,
}

impl Default for EquipmentNames {
    fn default() -> Self {
        let entries = [
            ("Layer_4", "Treadmill"),
            ("Layer_5", "DeclineBenchPress"),
            ("Layer_6", "BenchPress"),
            ("Layer_7", "SmithMachine"),
            ("Layer_8", "LegPress"),
            ("Layer_9", "Elliptical"),
            ("Layer_10", "LegPress"),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl EquipmentNames {
    /// An empty table; every layer falls back to `Equipment_<id>`.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a table from ordered pairs, rejecting repeated layer ids.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, LayercutError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::empty();
        for (layer, name) in pairs {
            let layer = layer.into();
            if table.get(&layer).is_some() {
                return Err(LayercutError::DuplicateLayer(layer));
            }
            table.entries.push((layer, name.into()));
        }
        Ok(table)
    }

    /// Replace the name of `layer`, or append it at the end.
    pub fn insert(&mut self, layer: impl Into<String>, name: impl Into<String>) {
        let layer = layer.into();
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == layer) {
            Some(entry) => entry.1 = name,
            None => self.entries.push((layer, name)),
        }
    }

    pub fn get(&self, layer: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == layer)
            .map(|(_, v)| v.as_str())
    }

    /// Output name for `layer`.
    pub fn resolve<'a>(&'a self, layer: &str) -> Cow<'a, str> {
        match self.get(layer) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("Equipment_{}", layer)),
        }
    }

    /// Mapped entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Names claimed by more than one layer, with those layers in table order.
    pub fn shared_names(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut by_name: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (layer, name) in self.iter() {
            by_name.entry(name).or_default().push(layer);
        }
        by_name.retain(|_, layers| layers.len() > 1);
        by_name
    }

    /// [`shared_names`](Self::shared_names) limited to the layers in `present`.
    pub fn shared_names_among(&self, present: &[&str]) -> BTreeMap<&str, Vec<&str>> {
        let mut shared = self.shared_names();
        for layers in shared.values_mut() {
            layers.retain(|layer| present.iter().any(|p| *p == *layer));
        }
        shared.retain(|_, layers| layers.len() > 1);
        shared
    }

    /// Warn once per output file that more than one of `present` writes to.
    pub fn warn_shared_names(&self, present: &[&str]) {
        for (name, layers) in self.shared_names_among(present) {
            warn!(
                name = name;
                "{} all map to {}.svg, the last one written is kept",
                layers.join(", "),
                name
            );
        }
    }
}

/// Parse a `LAYER=NAME` override as given on the command line.
pub fn parse_mapping(s: &str) -> Result<(String, String), LayercutError> {
    match s.split_once('=') {
        Some((layer, name)) if !layer.trim().is_empty() && !name.trim().is_empty() => {
            Ok((layer.trim().to_string(), name.trim().to_string()))
        }
        _ => Err(LayercutError::InvalidMapping(s.to_string())),
    }
}
