//! What a command callback receives.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Flags that hold a value at dispatch time, in declaration order.
///
/// Defaults count as values, so a flag with a default is always present.
/// Serializes as a map from flag name to value.
///
/// # Examples
///
/// ```
/// use cmdtree_core::FlagValues;
/// use serde_json::json;
///
/// let flags = FlagValues::from_iter([("count".to_string(), json!(5))]);
/// assert!(flags.contains("count"));
/// assert_eq!(flags.get_as::<u32>("count").unwrap(), Some(5));
/// assert_eq!(flags.get_as::<u32>("missing").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagValues {
    entries: Vec<(String, Value)>,
}

impl FlagValues {
    /// Returns the value of the first flag called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(flag, _)| flag == name)
            .map(|(_, value)| value)
    }

    /// Deserializes the value of `name` into `T`.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the stored value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, serde_json::Error> {
        self.get(name)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for FlagValues {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for FlagValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Arguments handed to `pre_run`, `run` and `post_run`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Invocation {
    /// Name of the command being dispatched.
    pub command: String,
    /// Positional arguments left after flags and the subcommand tail were removed.
    pub args: Vec<String>,
    /// Flags holding a value.
    pub flags: FlagValues,
    /// Tokens after the `--` separator, verbatim.
    pub passthrough: Vec<String>,
}
