//! Identity keys for shared facts.

use crate::handle::Fact;
use std::sync::Arc;

/// The identity of a fact: the address of its shared allocation.
///
/// Two clones of the same [`Fact`] share an identity, two separately allocated values
/// never do while both are alive, regardless of how they compare by value. An identity
/// only stays meaningful while something keeps the allocation alive, which is why the
/// index pins the fact next to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentity(usize);

impl ObjectIdentity {
    #[must_use]
    pub fn of(object: &Fact) -> Self {
        Self(Arc::as_ptr(object).cast::<()>().addr())
    }

    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }
}

/// Folds an [`ObjectIdentity`] into a scalar key of at most `bits` bits.
///
/// Distinct identities may share a derived key. With `bits = 0` every identity maps to
/// the same key, which is handy to exercise collision handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedKey {
    mask: u32,
}

impl DerivedKey {
    pub const MAX_BITS: u8 = 32;

    /// Returns `None` when `bits` exceeds [`DerivedKey::MAX_BITS`].
    #[must_use]
    pub const fn with_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self { mask: 0 }),
            32 => Some(Self { mask: u32::MAX }),
            b if b < Self::MAX_BITS => Some(Self { mask: (1u32 << b) - 1 }),
            _ => None,
        }
    }

    #[must_use]
    pub fn derive(self, identity: ObjectIdentity) -> u32 {
        fxhash::hash32(&identity.0) & self.mask
    }
}
