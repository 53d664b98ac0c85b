//! Typed soft references
//!
//! A `SoftRef<E>` is an identifier of an `E` document held by another
//! document. It says nothing about whether the target exists: resolution is
//! advisory and goes through the store.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::Entity;

/// Identifier of an `E`, serialized as a bare string
pub struct SoftRef<E: Entity> {
    key: String,
    marker: PhantomData<fn() -> E>,
}

impl<E: Entity> SoftRef<E> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            marker: PhantomData,
        }
    }

    /// The referenced key value
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Collection of the referenced entity
    pub fn target_type(&self) -> &'static str {
        E::COLLECTION
    }

    /// Field of the target matched against the key
    pub fn target_field(&self) -> &'static str {
        E::KEY_FIELD
    }
}

impl<E: Entity> Clone for SoftRef<E> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<E: Entity> PartialEq for SoftRef<E> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<E: Entity> Eq for SoftRef<E> {}

impl<E: Entity> Hash for SoftRef<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<E: Entity> fmt::Debug for SoftRef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SoftRef<{}>({})", E::COLLECTION, self.key)
    }
}

impl<E: Entity> fmt::Display for SoftRef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl<E: Entity> From<&str> for SoftRef<E> {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl<E: Entity> Serialize for SoftRef<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key)
    }
}

impl<'de, E: Entity> Deserialize<'de> for SoftRef<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ticket, User};

    #[test]
    fn test_serializes_as_bare_string() {
        let user: SoftRef<User> = SoftRef::new("U1");
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"U1\"");

        let back: SoftRef<User> = serde_json::from_str("\"U1\"").unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_target_metadata() {
        let ticket: SoftRef<Ticket> = "T1".into();
        assert_eq!(ticket.target_type(), "tickets");
        assert_eq!(ticket.target_field(), "ticketId");
        assert_eq!(format!("{:?}", ticket), "SoftRef<tickets>(T1)");
    }
}
