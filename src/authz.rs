//! Authorization gates over a resolved request context.
//!
//! The predicates are pure functions of the `ResolvedContext`: resolution
//! already loaded the writer set alongside the publication, so no gate ever
//! queries the store. Gating happens after resolution and before the
//! use-case runs.

use crate::context::ResolvedContext;
use crate::error::Error;

/// The capability an operation demands of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any authenticated user.
    Authenticated,
    /// A writer of the resolved publication. Owners qualify: ownership
    /// subsumes writing rights.
    Writer,
    /// The owner of the resolved publication.
    Owner,
}

pub fn is_authenticated(ctx: &ResolvedContext) -> bool {
    ctx.viewer_opt().is_some()
}

pub fn is_owner(ctx: &ResolvedContext) -> bool {
    match (ctx.viewer_opt(), ctx.publication()) {
        (Some(viewer), Ok(publication)) => publication.owner_id == viewer.id,
        _ => false,
    }
}

pub fn is_writer(ctx: &ResolvedContext) -> bool {
    let Some(viewer) = ctx.viewer_opt() else {
        return false;
    };
    is_owner(ctx) || ctx.writers().iter().any(|w| w.id == viewer.id)
}

pub fn authorize(ctx: &ResolvedContext, capability: Capability) -> bool {
    match capability {
        Capability::Authenticated => is_authenticated(ctx),
        Capability::Writer => is_writer(ctx),
        Capability::Owner => is_owner(ctx),
    }
}

/// Gate form of [`authorize`]: rejection is `NotPermitted`, which the
/// response layer renders as 403 for an identified viewer. Handlers that
/// want anonymous viewers bounced as 401 authenticate before gating.
pub fn require(ctx: &ResolvedContext, capability: Capability) -> Result<(), Error> {
    if authorize(ctx, capability) {
        Ok(())
    } else {
        Err(Error::NotPermitted)
    }
}
