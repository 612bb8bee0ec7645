use std::sync::Arc;

use tokio::sync::watch;

use crate::prelude::*;

/// Owns the permission snapshot of the current subject and answers checks
/// against it.
///
/// The snapshot is published through a [`watch`] channel, so every check reads
/// one consistent state and never performs I/O. A snapshot is only replaced by
/// [`PermissionService::refresh`] or [`PermissionService::clear`]. Role and
/// override changes made in the store are not picked up until the next
/// refresh.
#[derive(Debug)]
pub struct PermissionService<S> {
	/// Where snapshots are loaded from.
	source: S,
	/// The published state. Only ever modified under the channel's lock.
	state: watch::Sender<SnapshotState>,
}

impl<S> PermissionService<S>
where
	S: PermissionSource,
{
	/// Creates a new service with no subject. Every check is denied until the
	/// first refresh completes.
	pub fn new(source: S) -> Self {
		let (state, _) = watch::channel(SnapshotState::default());
		Self { source, state }
	}

	/// The source snapshots are loaded from.
	pub fn source(&self) -> &S {
		&self.source
	}

	/// Loads the snapshot of `subject` and publishes it.
	///
	/// The state switches to [`SnapshotStatus::Loading`] for the new subject
	/// straight away. If another refresh (or a [`clear`][Self::clear]) starts
	/// before this one finishes, the result of this one is discarded so that a
	/// slow load can't replace the snapshot of a newer subject. Returns true if
	/// the result was published.
	///
	/// A load that fails is published as [`SnapshotStatus::Failed`], under
	/// which every check is denied.
	#[instrument(skip(self))]
	pub async fn refresh(&self, subject: Uuid) -> bool {
		let mut generation = 0;
		self.state.send_modify(|state| {
			state.generation += 1;
			state.subject = Some(subject);
			state.status = SnapshotStatus::Loading;
			generation = state.generation;
		});
		trace!("Started loading snapshot (generation {})", generation);

		let status = match self.load(&subject).await {
			Ok(snapshot) => {
				debug!(
					"Loaded {} roles, {} overrides and {} granted permissions",
					snapshot.roles().len(),
					snapshot.overrides().len(),
					snapshot.role_grants().len()
				);
				SnapshotStatus::Ready(Arc::new(snapshot))
			}
			Err(err) => {
				error!("Failed to load permissions for `{}`: {}", subject, err);
				SnapshotStatus::Failed {
					error: err.to_string(),
				}
			}
		};

		let published = self.state.send_if_modified(|state| {
			if state.generation != generation {
				return false;
			}
			state.status = status;
			true
		});

		if published {
			info!("Permissions for `{}` are up to date", subject);
		} else {
			debug!(
				"Discarding stale snapshot for `{}` (generation {})",
				subject, generation
			);
		}

		published
	}

	/// Drops the current subject, for example on sign-out. Any refresh still
	/// in flight is discarded when it completes.
	#[instrument(skip(self))]
	pub fn clear(&self) {
		self.state.send_modify(|state| {
			state.generation += 1;
			state.subject = None;
			state.status = SnapshotStatus::Loading;
		});
		debug!("Cleared permission snapshot");
	}

	/// Runs the four snapshot queries concurrently and folds their rows.
	async fn load(&self, subject: &Uuid) -> Result<PermissionSnapshot, SourceError> {
		let (roles, catalog, overrides, grants) = futures::try_join!(
			self.source.list_roles_for_user(subject),
			self.source.list_all_permissions(),
			self.source.list_overrides_for_user(subject),
			self.source.list_role_grants_for_user(subject),
		)?;

		Ok(PermissionSnapshot::from_rows(
			roles, catalog, overrides, grants,
		))
	}

	/// A receiver that is notified every time the state changes.
	pub fn subscribe(&self) -> watch::Receiver<SnapshotState> {
		self.state.subscribe()
	}

	/// A copy of the current state.
	pub fn current(&self) -> SnapshotState {
		self.state.borrow().clone()
	}

	/// The subject the current snapshot is for.
	pub fn subject(&self) -> Option<Uuid> {
		self.state.borrow().subject
	}

	/// The error of the last load, if it failed.
	pub fn last_error(&self) -> Option<String> {
		self.state.borrow().status.error().map(str::to_string)
	}

	/// Waits until the current load has finished, and returns the state it
	/// published. Returns immediately if there is no subject.
	pub async fn wait_until_settled(&self) -> SnapshotState {
		let mut receiver = self.state.subscribe();
		let settled = match receiver
			.wait_for(|state| state.subject.is_none() || !state.status.is_loading())
			.await
		{
			Ok(state) => state.clone(),
			// The sender lives in `self`, so the channel can't be closed here
			Err(_) => self.current(),
		};
		settled
	}

	/// Resolves a permission for the current subject, with the reason for the
	/// decision.
	pub fn resolve(&self, resource: &str, action: &str) -> Resolution {
		self.state.borrow().status.resolve(resource, action)
	}

	/// Returns true if the current subject is granted `action` on `resource`.
	pub fn check(&self, resource: &str, action: &str) -> bool {
		self.state.borrow().status.check(resource, action)
	}

	/// Checks a legacy permission name, such as `approve_hardware_request`.
	pub fn check_legacy(&self, permission: &str) -> bool {
		self.state.borrow().status.check_legacy(permission)
	}

	/// Returns true if any of the requests is granted.
	pub fn check_any<'a>(&self, requests: impl IntoIterator<Item = &'a PermissionRequest>) -> bool {
		self.state.borrow().status.check_any(requests)
	}

	/// Returns true if every one of the requests is granted.
	pub fn check_all<'a>(&self, requests: impl IntoIterator<Item = &'a PermissionRequest>) -> bool {
		self.state.borrow().status.check_all(requests)
	}

	/// Returns true if the current subject holds the role.
	pub fn has_role(&self, name: &str) -> bool {
		self.state.borrow().status.has_role(name)
	}

	/// Returns true if the current subject holds any of the roles.
	pub fn has_any_role<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
		self.state.borrow().status.has_any_role(names)
	}

	/// Resolves every permission of the catalog for the current subject. Empty
	/// while loading.
	pub fn effective_permissions(&self) -> Vec<(Permission, Resolution)> {
		self.state
			.borrow()
			.status
			.snapshot()
			.map(PermissionSnapshot::effective_permissions)
			.unwrap_or_default()
	}
}
