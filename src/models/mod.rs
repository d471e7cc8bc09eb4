pub mod patient;
pub mod visit;

pub use patient::*;
pub use visit::*;

use serde::{Deserialize, Deserializer};

/// Reads an explicit JSON `null` as the field's default. Missing keys are
/// covered by the container-level `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
