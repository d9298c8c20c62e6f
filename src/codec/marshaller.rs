//! Marshaller collaborator
//!
//! Keys, values and custom event payloads cross the codec as opaque byte
//! arrays. A [`Marshaller`] turns them into application objects and back.

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{HotRodError, Result};
use crate::protocol::status::has_compatibility;

/// Type-erased application object produced by a marshaller
#[derive(Clone)]
pub struct Object {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Object {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Rust type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(bytes) = self.downcast_ref::<Vec<u8>>() {
            return write!(f, "Object({bytes:?})");
        }
        if let Some(text) = self.downcast_ref::<String>() {
            return write!(f, "Object({text:?})");
        }
        write!(f, "Object(<{}>)", self.type_name)
    }
}

/// Class names a marshaller may materialise for compatibility-mode responses.
///
/// Entries match exactly, or as a prefix when they end in `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    patterns: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_allowed(&self, class: &str) -> bool {
        self.patterns.iter().any(|pattern| match pattern.strip_suffix('*') {
            Some(prefix) => class.starts_with(prefix),
            None => class == pattern,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Converts between application objects and wire bytes
pub trait Marshaller: Send + Sync {
    fn object_to_bytes(&self, object: &Object) -> Result<Vec<u8>>;

    /// `status` is the status of the response the bytes came from; it tells
    /// whether `allow_list` applies.
    fn bytes_to_object(&self, bytes: &[u8], status: u8, allow_list: &AllowList) -> Result<Object>;
}

/// Passes raw bytes through as `Vec<u8>` objects
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesMarshaller;

impl Marshaller for BytesMarshaller {
    fn object_to_bytes(&self, object: &Object) -> Result<Vec<u8>> {
        object.downcast_ref::<Vec<u8>>().cloned().ok_or_else(|| {
            HotRodError::Marshalling(format!("expected Vec<u8>, got {}", object.type_name()))
        })
    }

    fn bytes_to_object(&self, bytes: &[u8], _status: u8, _allow_list: &AllowList) -> Result<Object> {
        Ok(Object::new(bytes.to_vec()))
    }
}

/// Serde + bincode marshaller for a single application type
pub struct BincodeMarshaller<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeMarshaller<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeMarshaller<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BincodeMarshaller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BincodeMarshaller<{}>", type_name::<T>())
    }
}

impl<T> Marshaller for BincodeMarshaller<T>
where
    T: Serialize + DeserializeOwned + Any + Send + Sync,
{
    fn object_to_bytes(&self, object: &Object) -> Result<Vec<u8>> {
        let value = object.downcast_ref::<T>().ok_or_else(|| {
            HotRodError::Marshalling(format!(
                "expected {}, got {}",
                type_name::<T>(),
                object.type_name()
            ))
        })?;
        bincode::serialize(value).map_err(|e| HotRodError::Marshalling(e.to_string()))
    }

    fn bytes_to_object(&self, bytes: &[u8], status: u8, allow_list: &AllowList) -> Result<Object> {
        let class = type_name::<T>();
        if has_compatibility(status) && !allow_list.is_allowed(class) {
            return Err(HotRodError::ClassNotAllowed {
                class: class.to_string(),
            });
        }
        let value: T =
            bincode::deserialize(bytes).map_err(|e| HotRodError::Marshalling(e.to_string()))?;
        Ok(Object::new(value))
    }
}
