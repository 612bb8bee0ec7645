use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;
use typed_builder::TypedBuilder;

use super::{
	Effect,
	Permission,
	PermissionKey,
	RoleGrant,
	RolePermissionGrant,
	UserPermissionOverride,
	UserRole,
};

/// The in-memory copy of one subject's roles, overrides and role grants, along
/// with the permission catalog that was loaded alongside them.
///
/// A snapshot is built once per load and never mutated afterwards. Reloading a
/// subject produces a brand new snapshot that replaces the old one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct PermissionSnapshot {
	/// The names of every role the subject holds.
	#[builder(default)]
	roles: BTreeSet<String>,
	/// At most one override effect per key.
	#[builder(default)]
	overrides: BTreeMap<PermissionKey, Effect>,
	/// Every role-derived entry for a key, across all of the subject's roles,
	/// in the order they were fetched.
	#[builder(default)]
	role_grants: BTreeMap<PermissionKey, Vec<RoleGrant>>,
	/// The full permission catalog. Not used for resolution.
	#[builder(default)]
	catalog: Vec<Permission>,
}

impl PermissionSnapshot {
	/// A snapshot with no roles, overrides, grants or catalog entries. Every
	/// check against it is denied.
	pub const fn empty() -> Self {
		Self {
			roles: BTreeSet::new(),
			overrides: BTreeMap::new(),
			role_grants: BTreeMap::new(),
			catalog: Vec::new(),
		}
	}

	/// Folds the flat rows returned by the four snapshot queries into a
	/// snapshot.
	///
	/// If more than one override row arrives for the same key, the last one
	/// wins. The store is expected to hold at most one, so this only happens
	/// with inconsistent data and is logged.
	pub fn from_rows(
		roles: Vec<UserRole>,
		catalog: Vec<Permission>,
		overrides: Vec<UserPermissionOverride>,
		grants: Vec<RolePermissionGrant>,
	) -> Self {
		let roles = roles
			.into_iter()
			.map(|UserRole { role_name, .. }| role_name)
			.collect();

		let mut override_map = BTreeMap::new();
		for row in overrides {
			let key = row.key();
			if let Some(previous) = override_map.insert(key.clone(), row.effect) {
				warn!(
					"Duplicate override found for `{}` ({} replaced by {})",
					key, previous, row.effect
				);
			}
		}

		let mut role_grants = BTreeMap::<PermissionKey, Vec<RoleGrant>>::new();
		for row in grants {
			role_grants
				.entry(row.key())
				.or_default()
				.push(RoleGrant::new(row.role_name, row.effect));
		}

		Self {
			roles,
			overrides: override_map,
			role_grants,
			catalog,
		}
	}

	/// The names of every role the subject holds.
	pub fn roles(&self) -> &BTreeSet<String> {
		&self.roles
	}

	/// Every override set on the subject.
	pub fn overrides(&self) -> &BTreeMap<PermissionKey, Effect> {
		&self.overrides
	}

	/// Every role-derived entry, grouped by key.
	pub fn role_grants(&self) -> &BTreeMap<PermissionKey, Vec<RoleGrant>> {
		&self.role_grants
	}

	/// The permission catalog loaded with this snapshot.
	pub fn catalog(&self) -> &[Permission] {
		&self.catalog
	}

	/// The override effect for a key, if the subject has one.
	pub fn override_for(&self, key: &PermissionKey) -> Option<Effect> {
		self.overrides.get(key).copied()
	}

	/// The role-derived entries for a key. Empty if no role mentions it.
	pub fn grants_for(&self, key: &PermissionKey) -> &[RoleGrant] {
		self.role_grants
			.get(key)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	/// Returns true if the snapshot holds no roles, overrides or grants.
	pub fn is_empty(&self) -> bool {
		self.roles.is_empty() && self.overrides.is_empty() && self.role_grants.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::prelude::*;

	fn grant(role: &str, resource: &str, action: &str, effect: Effect) -> RolePermissionGrant {
		RolePermissionGrant {
			role_name: role.to_string(),
			permission_id: Uuid::new_v4(),
			effect,
			resource: resource.to_string(),
			action: action.to_string(),
		}
	}

	fn override_row(resource: &str, action: &str, effect: Effect) -> UserPermissionOverride {
		UserPermissionOverride {
			permission_id: Uuid::new_v4(),
			effect,
			resource: resource.to_string(),
			action: action.to_string(),
		}
	}

	#[test]
	fn rows_are_grouped_by_key() {
		let snapshot = PermissionSnapshot::from_rows(
			vec![
				UserRole {
					role_id: Uuid::new_v4(),
					role_name: "manager".to_string(),
				},
				UserRole {
					role_id: Uuid::new_v4(),
					role_name: "auditor".to_string(),
				},
			],
			vec![],
			vec![override_row("hardware", "create", Effect::Deny)],
			vec![
				grant("auditor", "tickets", "read", Effect::Allow),
				grant("manager", "tickets", "read", Effect::Deny),
				grant("manager", "tickets", "update", Effect::Allow),
			],
		);

		assert_eq!(snapshot.roles().len(), 2);
		assert!(snapshot.roles().contains("manager"));
		assert_eq!(
			snapshot.override_for(&PermissionKey::new("hardware", "create")),
			Some(Effect::Deny)
		);
		assert_eq!(
			snapshot.grants_for(&PermissionKey::new("tickets", "read")),
			&[
				RoleGrant::new("auditor", Effect::Allow),
				RoleGrant::new("manager", Effect::Deny),
			]
		);
		assert!(snapshot
			.grants_for(&PermissionKey::new("tickets", "delete"))
			.is_empty());
	}

	#[test]
	fn last_duplicate_override_wins() {
		let snapshot = PermissionSnapshot::from_rows(
			vec![],
			vec![],
			vec![
				override_row("tickets", "read", Effect::Allow),
				override_row("tickets", "read", Effect::Deny),
			],
			vec![],
		);

		assert_eq!(snapshot.overrides().len(), 1);
		assert_eq!(
			snapshot.override_for(&PermissionKey::new("tickets", "read")),
			Some(Effect::Deny)
		);
	}

	#[test]
	fn empty_snapshot_is_empty() {
		assert!(PermissionSnapshot::empty().is_empty());
		assert_eq!(PermissionSnapshot::empty(), PermissionSnapshot::default());
		assert!(PermissionSnapshot::builder().build().is_empty());
	}
}
