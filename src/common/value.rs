//! Values stored in the DHT and receipts of store operations.

use bytes::Bytes;
use sha1_smol::Sha1;

use super::{Id, ID_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
/// An opaque payload and the [Id] it is stored under.
pub struct Value {
    id: Id,
    data: Bytes,
}

impl Value {
    /// Create a content addressed value, its [Id] is the hash of `data`.
    pub fn immutable(data: impl Into<Bytes>) -> Self {
        let data = data.into();

        Self {
            id: hash_immutable(&data).into(),
            data,
        }
    }

    /// Create a value stored under an explicit [Id].
    pub fn keyed(id: Id, data: impl Into<Bytes>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of a successful store operation.
pub struct Receipt {
    id: Id,
}

impl Receipt {
    pub fn new(id: Id) -> Self {
        Self { id }
    }

    /// The [Id] the value was actually stored under.
    pub fn id(&self) -> &Id {
        &self.id
    }
}

/// Content hash of an immutable value, `sha1("<len>:" || v)`.
pub fn hash_immutable(v: &[u8]) -> [u8; ID_SIZE] {
    let mut encoded = Vec::with_capacity(v.len() + 3);
    encoded.extend(format!("{}:", v.len()).bytes());
    encoded.extend_from_slice(v);

    let mut hasher = Sha1::new();
    hasher.update(&encoded);

    hasher.digest().bytes()
}
