//! Tri-state field update used by the partial-update structs.
//!
//! On the wire an absent key is `Unchanged`, an explicit `null` is `Clear` and any
//! other value is `SetTo`. Fields using it must carry
//! `#[serde(default, skip_serializing_if = "Patch::is_unchanged")]` so that absence
//! survives a round trip through the admin client.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Unchanged,
    SetTo(T),
    Clear,
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    /// Merge onto an optional slot.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Unchanged => {}
            Patch::SetTo(value) => *slot = Some(value),
            Patch::Clear => *slot = None,
        }
    }

    /// Merge onto a slot whose cleared state is `T::default()` (e.g. an empty image list).
    pub fn apply_or_default(self, slot: &mut T)
    where
        T: Default,
    {
        match self {
            Patch::Unchanged => {}
            Patch::SetTo(value) => *slot = value,
            Patch::Clear => *slot = T::default(),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `Some` sets, `None` clears. Use `Patch::Unchanged` explicitly to leave a field alone.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::SetTo(v),
            None => Patch::Clear,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; absence falls back to Default.
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::SetTo(value) => serializer.serialize_some(value),
            Patch::Clear | Patch::Unchanged => serializer.serialize_none(),
        }
    }
}
