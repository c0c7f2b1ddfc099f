//! Owner capability: anything that can have addresses attached to it.

use serde::{Deserialize, Serialize};

use crate::id::OwnerId;
use crate::value_object::ValueObject;

/// Capability implemented by host entities that own addresses.
///
/// The pair `(owner_type, owner_id)` is the polymorphic key stored on every
/// address row (`addressable_type`, `addressable_id`).
pub trait AddressOwner {
    /// Stable type tag, e.g. `"user"` or `"company"`.
    fn owner_type(&self) -> &str;

    /// Identity of this instance.
    fn owner_id(&self) -> OwnerId;

    /// Polymorphic reference to this instance.
    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::new(self.owner_type(), self.owner_id())
    }
}

impl<T: AddressOwner + ?Sized> AddressOwner for &T {
    fn owner_type(&self) -> &str {
        (**self).owner_type()
    }

    fn owner_id(&self) -> OwnerId {
        (**self).owner_id()
    }
}

/// Owner type + owner id, as persisted on the owned record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub owner_type: String,
    pub owner_id: OwnerId,
}

impl OwnerRef {
    pub fn new(owner_type: impl Into<String>, owner_id: OwnerId) -> Self {
        Self {
            owner_type: owner_type.into(),
            owner_id,
        }
    }
}

impl ValueObject for OwnerRef {}

impl AddressOwner for OwnerRef {
    fn owner_type(&self) -> &str {
        &self.owner_type
    }

    fn owner_id(&self) -> OwnerId {
        self.owner_id
    }
}

impl core::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.owner_type, self.owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User {
        id: OwnerId,
    }

    impl AddressOwner for User {
        fn owner_type(&self) -> &str {
            "user"
        }

        fn owner_id(&self) -> OwnerId {
            self.id
        }
    }

    #[test]
    fn owner_ref_carries_type_and_id() {
        let user = User { id: OwnerId::new() };
        let r = user.owner_ref();
        assert_eq!(r.owner_type, "user");
        assert_eq!(r.owner_id, user.id);
    }

    #[test]
    fn same_id_different_type_is_a_different_owner() {
        let id = OwnerId::new();
        assert_ne!(OwnerRef::new("user", id), OwnerRef::new("company", id));
    }
}
