/// Router Module Index
///
/// Organizes the application's routing logic into access-segregated modules,
/// so the authentication boundary is applied explicitly at the module level
/// (via Axum layers) rather than per-handler.
///
/// Reads are public; every mutation sits behind the auth layer.

/// Routes accessible to all viewers, anonymous included. Handlers resolve
/// the viewer optionally and scope viewer-specific facts accordingly.
pub mod public;

/// Account-scoped routes protected by the `AuthUser` extractor middleware.
pub mod authenticated;

/// Publication-scoped mutations (publishing, membership, likes, comments).
/// Also behind the auth layer; finer-grained gates (writer, owner) run
/// inside the use-cases after context resolution.
pub mod publication;
