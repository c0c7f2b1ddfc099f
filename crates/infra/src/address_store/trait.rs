use std::sync::Arc;

use addressable_addresses::{Address, AddressValues};
use addressable_core::{AddressId, OwnerRef};

use crate::error::StoreError;

/// Owner-scoped address store.
///
/// Implementations must:
/// - scope every owner query by both owner type and owner id
/// - return `list` in creation order
/// - order `first_by_flag` by flag descending, then `updated_at` descending,
///   then id descending (see `Address::rank_by_flag`)
pub trait AddressStore: Send + Sync {
    /// All addresses of `owner`, oldest first.
    fn list(&self, owner: &OwnerRef) -> Result<Vec<Address>, StoreError>;

    fn count(&self, owner: &OwnerRef) -> Result<u64, StoreError>;

    fn find(&self, id: AddressId) -> Result<Option<Address>, StoreError>;

    /// Return the owner's address matching `values` on every supplied key,
    /// or create one from `values`.
    fn update_or_create(&self, owner: &OwnerRef, values: AddressValues) -> Result<Address, StoreError>;

    /// Persist the current state of an existing record. `false` if it no longer exists.
    fn save(&self, address: &Address) -> Result<bool, StoreError>;

    /// `true` if a row was removed.
    fn delete(&self, id: AddressId) -> Result<bool, StoreError>;

    /// Remove every address of `owner`; returns the number removed.
    fn delete_all(&self, owner: &OwnerRef) -> Result<u64, StoreError>;

    /// Highest-ranked address of `owner` for `flag` (without `is_` prefix).
    ///
    /// `None` only when the owner has no address at all. Unconfigured flags
    /// rank every row equally.
    fn first_by_flag(&self, owner: &OwnerRef, flag: &str) -> Result<Option<Address>, StoreError>;
}

impl<S> AddressStore for Arc<S>
where
    S: AddressStore + ?Sized,
{
    fn list(&self, owner: &OwnerRef) -> Result<Vec<Address>, StoreError> {
        (**self).list(owner)
    }

    fn count(&self, owner: &OwnerRef) -> Result<u64, StoreError> {
        (**self).count(owner)
    }

    fn find(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        (**self).find(id)
    }

    fn update_or_create(&self, owner: &OwnerRef, values: AddressValues) -> Result<Address, StoreError> {
        (**self).update_or_create(owner, values)
    }

    fn save(&self, address: &Address) -> Result<bool, StoreError> {
        (**self).save(address)
    }

    fn delete(&self, id: AddressId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }

    fn delete_all(&self, owner: &OwnerRef) -> Result<u64, StoreError> {
        (**self).delete_all(owner)
    }

    fn first_by_flag(&self, owner: &OwnerRef, flag: &str) -> Result<Option<Address>, StoreError> {
        (**self).first_by_flag(owner, flag)
    }
}
