//! Store identifier: the 20 bytes a value is addressed by.
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha1_smol::Sha1;
use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

/// The size of store identifiers in bytes.
pub const ID_SIZE: usize = 20;

#[derive(Clone, Copy, PartialEq, Ord, PartialOrd, Eq, Hash)]
/// Identifier of a value or a node in the DHT.
pub struct Id([u8; ID_SIZE]);

impl Id {
    pub fn random() -> Id {
        let mut rng = rand::thread_rng();
        let random_bytes: [u8; ID_SIZE] = rng.gen();

        Id(random_bytes)
    }

    /// Derive an Id from a namespace and a key inside that namespace.
    ///
    /// The Id is the sha1 digest of `namespace || key`, so it is deterministic
    /// and case sensitive; callers normalize the key first if they need to.
    pub fn derive(namespace: &str, key: &str) -> Id {
        let mut hasher = Sha1::new();
        hasher.update(namespace.as_bytes());
        hasher.update(key.as_bytes());

        Id(hasher.digest().bytes())
    }
}

impl From<[u8; ID_SIZE]> for Id {
    fn from(bytes: [u8; ID_SIZE]) -> Id {
        Id(bytes)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }

        Ok(())
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

impl FromStr for Id {
    type Err = DecodeIdError;

    /// Parse a hex encoded Id.
    fn from_str(s: &str) -> Result<Id, DecodeIdError> {
        if s.len() != ID_SIZE * 2 {
            return Err(DecodeIdError::InvalidIdSize(s.len() / 2));
        }

        let mut digits = s.chars().map(hex_value);
        let mut bytes = [0_u8; ID_SIZE];

        for byte in bytes.iter_mut() {
            // Fewer than 40 chars means a non ascii char, reported before we run out.
            let (Some(high), Some(low)) = (digits.next(), digits.next()) else {
                return Err(DecodeIdError::InvalidIdSize(s.chars().count() / 2));
            };

            *byte = (high? << 4) | low?;
        }

        Ok(Id(bytes))
    }
}

fn hex_value(c: char) -> Result<u8, DecodeIdError> {
    c.to_digit(16)
        .map(|digit| digit as u8)
        .ok_or(DecodeIdError::InvalidHexCharacter(c))
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Id, D::Error> {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(de::Error::custom)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors decoding an [Id] from bytes or text.
pub enum DecodeIdError {
    /// A hex encoded Id is expected to be 40 characters.
    #[error("Invalid Id size, expected 20, got {0}")]
    InvalidIdSize(usize),

    #[error("Invalid hex character in Id: {0:?}")]
    InvalidHexCharacter(char),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_str_display() {
        let hex = "e5f96f6f38320f0f33959cb4d3d656452117aadb";
        let id = Id::from_str(hex).unwrap();

        assert_eq!(id.to_string(), hex);

        let mut bytes = [0x11; ID_SIZE];
        bytes[0] = 0xe5;
        assert_eq!(Id::from(bytes).to_string(), format!("e5{}", "11".repeat(19)));
    }

    #[test]
    fn from_str_uppercase() {
        let lower = Id::from_str("e5f96f6f38320f0f33959cb4d3d656452117aadb").unwrap();
        let upper = Id::from_str("E5F96F6F38320F0F33959CB4D3D656452117AADB").unwrap();

        assert_eq!(lower, upper);
    }

    #[test]
    fn from_str_invalid() {
        assert_eq!(
            Id::from_str("e5f96f"),
            Err(DecodeIdError::InvalidIdSize(3))
        );
        assert_eq!(
            Id::from_str("z5f96f6f38320f0f33959cb4d3d656452117aadb"),
            Err(DecodeIdError::InvalidHexCharacter('z'))
        );
        assert!(Id::from_str("+5f96f6f38320f0f33959cb4d3d656452117aadb").is_err());
    }

    #[test]
    fn from_str_reports_whole_char() {
        // 40 bytes, but not 40 ascii characters.
        assert_eq!(
            Id::from_str("éééééééééééééééééééé"),
            Err(DecodeIdError::InvalidHexCharacter('é'))
        );
        assert_eq!(
            Id::from_str("e5f96f6f38320f0f33959cb4d3d656452117aaé"),
            Err(DecodeIdError::InvalidHexCharacter('é'))
        );
    }

    #[test]
    fn derive_is_deterministic() {
        let a = Id::derive("pc2:username:", "alice");
        let b = Id::derive("pc2:username:", "alice");

        assert_eq!(a, b);
        assert_ne!(a, Id::derive("pc2:username:", "Alice"));
        assert_ne!(a, Id::derive("other:", "alice"));
    }

    #[test]
    fn derive_is_sha1_of_concatenation() {
        // sha1("abc")
        let expected = Id::from_str("a9993e364706816aba3e25717850c26c9cd0d89d").unwrap();

        assert_eq!(Id::derive("a", "bc"), expected);
        assert_eq!(Id::derive("", "abc"), expected);
    }

    #[test]
    fn serde_as_hex() {
        let id = Id::from_str("e5f96f6f38320f0f33959cb4d3d656452117aadb").unwrap();

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"e5f96f6f38320f0f33959cb4d3d656452117aadb\"");

        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
