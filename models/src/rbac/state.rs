use std::sync::Arc;

use super::{PermissionKey, PermissionRequest, PermissionSnapshot, Resolution};
use crate::prelude::*;

/// A snapshot evaluated in place of one that failed to load.
static EMPTY_SNAPSHOT: PermissionSnapshot = PermissionSnapshot::empty();

/// Where a subject's snapshot is in its lifecycle.
///
/// Checks are only meaningful in [`SnapshotStatus::Ready`]. While loading,
/// every check is denied, since a denial that might flip once the data arrives
/// must not be acted on. A load that failed is evaluated as an empty snapshot,
/// so a store outage results in no permissions rather than an error or an
/// unintended allow.
#[derive(Debug, Clone, Default)]
pub enum SnapshotStatus {
	/// The snapshot has not been fetched yet.
	#[default]
	Loading,
	/// The snapshot was fetched. It may still be empty.
	Ready(Arc<PermissionSnapshot>),
	/// Fetching the snapshot failed.
	Failed {
		/// A description of what went wrong.
		error: String,
	},
}

impl SnapshotStatus {
	/// Returns true while the snapshot is being fetched.
	pub fn is_loading(&self) -> bool {
		matches!(self, SnapshotStatus::Loading)
	}

	/// Returns true once a snapshot was fetched successfully.
	pub fn is_ready(&self) -> bool {
		matches!(self, SnapshotStatus::Ready(_))
	}

	/// The error of the last load, if it failed.
	pub fn error(&self) -> Option<&str> {
		match self {
			SnapshotStatus::Failed { error } => Some(error),
			_ => None,
		}
	}

	/// The snapshot checks are evaluated against. [`None`] while loading, and
	/// an empty snapshot if the load failed.
	pub fn snapshot(&self) -> Option<&PermissionSnapshot> {
		match self {
			SnapshotStatus::Loading => None,
			SnapshotStatus::Ready(snapshot) => Some(snapshot),
			SnapshotStatus::Failed { .. } => Some(&EMPTY_SNAPSHOT),
		}
	}

	/// See [`PermissionSnapshot::resolve`]. While loading, the request is
	/// denied with a reason saying so.
	pub fn resolve(&self, resource: &str, action: &str) -> Resolution {
		match self.snapshot() {
			Some(snapshot) => snapshot.resolve(resource, action),
			None => Resolution::loading(&PermissionKey::new(resource, action)),
		}
	}

	/// See [`PermissionSnapshot::check`].
	pub fn check(&self, resource: &str, action: &str) -> bool {
		self.snapshot()
			.is_some_and(|snapshot| snapshot.check(resource, action))
	}

	/// See [`PermissionSnapshot::check_legacy`].
	pub fn check_legacy(&self, permission: &str) -> bool {
		self.snapshot()
			.is_some_and(|snapshot| snapshot.check_legacy(permission))
	}

	/// See [`PermissionSnapshot::check_any`].
	pub fn check_any<'a>(&self, requests: impl IntoIterator<Item = &'a PermissionRequest>) -> bool {
		self.snapshot()
			.is_some_and(|snapshot| snapshot.check_any(requests))
	}

	/// See [`PermissionSnapshot::check_all`]. Denied while loading, even for an
	/// empty list.
	pub fn check_all<'a>(&self, requests: impl IntoIterator<Item = &'a PermissionRequest>) -> bool {
		self.snapshot()
			.is_some_and(|snapshot| snapshot.check_all(requests))
	}

	/// See [`PermissionSnapshot::has_role`].
	pub fn has_role(&self, name: &str) -> bool {
		self.snapshot()
			.is_some_and(|snapshot| snapshot.has_role(name))
	}

	/// See [`PermissionSnapshot::has_any_role`].
	pub fn has_any_role<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
		self.snapshot()
			.is_some_and(|snapshot| snapshot.has_any_role(names))
	}
}

/// The state published for a subject session: who the snapshot belongs to,
/// which load produced it, and the snapshot status itself.
#[derive(Debug, Clone, Default)]
pub struct SnapshotState {
	/// The subject the snapshot is for. [`None`] before the first refresh and
	/// after the session was cleared.
	pub subject: Option<Uuid>,
	/// Incremented every time a load is started. A load may only publish its
	/// result if the generation is still the one it started with.
	pub generation: u64,
	/// The snapshot, or why there isn't one.
	pub status: SnapshotStatus,
}
