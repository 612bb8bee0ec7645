#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Shared data model for the portal's permission layer. This crate holds the
//! permission keys, roles, grants and overrides, the in-memory snapshot of a
//! subject's permissions, and the resolution engine that turns a snapshot into
//! an allow / deny decision. Nothing in here performs I/O.

/// The role-based access control model and the resolution engine.
pub mod rbac;
/// Utility types shared by every crate in the workspace.
pub mod utils;

/// A prelude that re-exports commonly used items.
pub mod prelude {
	pub use crate::{
		rbac::{
			Effect,
			Permission,
			PermissionKey,
			PermissionRequest,
			PermissionSnapshot,
			Resolution,
			ResolutionSource,
			SnapshotState,
			SnapshotStatus,
		},
		utils::Uuid,
	};
}
