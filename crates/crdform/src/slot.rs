use serde::de::DeserializeOwned;
use serde_json::Value;

/// Value of an attribute as handed over by the orchestrating framework.
///
/// `Unknown` is a value that will only be known after apply; it behaves like
/// `Unset` wherever a fallback exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot<T> {
    #[default]
    Unset,
    Unknown,
    Set(T),
}

impl<T> Slot<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset | Self::Unknown => None,
        }
    }

    /// The set value, otherwise `fallback`.
    pub fn or(self, fallback: T) -> T {
        self.into_option().unwrap_or(fallback)
    }
}

impl<T: DeserializeOwned> Slot<T> {
    /// Read an attribute from a configuration or state object. Absent and
    /// null values are `Unset`; values of the wrong type are treated as unset
    /// too, validation reports those separately.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Unset,
            Some(value) => serde_json::from_value(value.clone())
                .map(Self::Set)
                .unwrap_or(Self::Unset),
        }
    }
}
