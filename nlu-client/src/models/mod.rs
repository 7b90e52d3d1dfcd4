pub mod conversation;
pub mod response;

pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    /// The service serializes empty collections as `null`; treat both the
    /// absent and the null forms as the default value.
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}
