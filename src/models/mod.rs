//! Data models for portal tenants and gateway connections

mod gateway;
mod tenant;

pub use gateway::*;
pub use tenant::*;

use serde::{Deserialize, Deserializer};

/// Read an explicit `null` as the type's default, like a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
