//! Resource ownership policy
//!
//! Every mutable resource names the user that created it. Destructive or
//! exclusive mutations call [`ensure_owner`] before touching anything.

use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};

/// A resource with a single owning user.
pub trait Owned {
    /// Noun used in the rejection message.
    const KIND: &'static str;

    fn owner_id(&self) -> &str;

    fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id() == user_id
    }
}

/// Fail with [`Error::NotOwner`] unless the caller owns `resource`.
pub fn ensure_owner<R: Owned>(resource: &R, ctx: &Ctx) -> Result<()> {
    if resource.is_owned_by(ctx.user_id()) {
        Ok(())
    } else {
        Err(Error::NotOwner { resource: R::KIND })
    }
}
