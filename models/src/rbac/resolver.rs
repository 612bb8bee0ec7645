use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{trace, warn};

use super::{
	legacy_permission,
	CatalogEntry,
	Permission,
	PermissionKey,
	PermissionSnapshot,
	SUPER_ADMIN_ROLE,
};

/// Which precedence tier produced a [`Resolution`].
#[derive(
	Eq, Copy, Hash, Debug, Clone, Display, PartialEq, Serialize, EnumString, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
	/// An override set directly on the subject decided.
	UserOverride,
	/// One of the subject's roles decided (including the super admin bypass).
	RolePermission,
	/// Nothing matched, so the request was denied.
	DefaultDeny,
}

/// The outcome of resolving a permission for a subject, along with an
/// explanation that can be shown to an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
	/// Whether the permission is granted.
	pub allowed: bool,
	/// A human readable explanation of the decision.
	pub reason: String,
	/// The tier that produced the decision.
	pub source: ResolutionSource,
}

impl Resolution {
	/// The decision used for any key nothing in the snapshot mentions.
	pub fn default_deny(key: &PermissionKey) -> Self {
		Self {
			allowed: false,
			reason: format!("no matching permission rules for {} - default deny", key),
			source: ResolutionSource::DefaultDeny,
		}
	}

	/// The decision used while a subject's snapshot has not been loaded yet.
	pub fn loading(key: &PermissionKey) -> Self {
		Self {
			allowed: false,
			reason: format!("permissions for {} are still loading - default deny", key),
			source: ResolutionSource::DefaultDeny,
		}
	}
}

/// A single permission to check. This is either a structured
/// `(resource, action)` pair or a historical flat permission name.
///
/// When deserialized, an object with `resource` and `action` fields becomes
/// [`PermissionRequest::Structured`] and a bare string becomes
/// [`PermissionRequest::Legacy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionRequest {
	/// A structured `(resource, action)` pair.
	Structured {
		/// The protected resource.
		resource: String,
		/// The action on the resource.
		action: String,
	},
	/// A historical flat permission name, or a `resource:action` string.
	Legacy(String),
}

impl PermissionRequest {
	/// Creates a structured request.
	pub fn structured(resource: impl Into<String>, action: impl Into<String>) -> Self {
		Self::Structured {
			resource: resource.into(),
			action: action.into(),
		}
	}
}

impl From<&str> for PermissionRequest {
	fn from(value: &str) -> Self {
		Self::Legacy(value.to_string())
	}
}

impl From<String> for PermissionRequest {
	fn from(value: String) -> Self {
		Self::Legacy(value)
	}
}

impl From<(&str, &str)> for PermissionRequest {
	fn from((resource, action): (&str, &str)) -> Self {
		Self::structured(resource, action)
	}
}

impl From<PermissionKey> for PermissionRequest {
	fn from(PermissionKey { resource, action }: PermissionKey) -> Self {
		Self::Structured { resource, action }
	}
}

impl From<CatalogEntry> for PermissionRequest {
	fn from(entry: CatalogEntry) -> Self {
		entry.key().into()
	}
}

impl PermissionSnapshot {
	/// Returns true if the subject holds the super admin role.
	pub fn is_super_admin(&self) -> bool {
		self.roles().contains(SUPER_ADMIN_ROLE)
	}

	/// Decides whether the subject may perform `action` on `resource`.
	///
	/// The tiers are evaluated in a fixed order and the first one that matches
	/// decides:
	/// 1. the super admin role allows everything, without looking at overrides;
	/// 2. an override on the subject for the key;
	/// 3. the subject's role grants for the key, where any deny beats any allow;
	/// 4. otherwise the request is denied.
	///
	/// Unknown `(resource, action)` pairs are not an error, they simply fall
	/// through to the default deny.
	pub fn resolve(&self, resource: &str, action: &str) -> Resolution {
		if self.is_super_admin() {
			return Resolution {
				allowed: true,
				reason: format!("{} has all permissions", SUPER_ADMIN_ROLE),
				source: ResolutionSource::RolePermission,
			};
		}

		let key = PermissionKey::new(resource, action);

		if let Some(effect) = self.override_for(&key) {
			return Resolution {
				allowed: effect.is_allow(),
				reason: format!("user has explicit {} override for {}", effect, key),
				source: ResolutionSource::UserOverride,
			};
		}

		let grants = self.grants_for(&key);
		let decisive = grants
			.iter()
			.find(|grant| grant.effect.is_deny())
			.or_else(|| grants.iter().find(|grant| grant.effect.is_allow()));
		if let Some(grant) = decisive {
			return Resolution {
				allowed: grant.effect.is_allow(),
				reason: format!(
					"role '{}' has {} for {}",
					grant.role_name, grant.effect, key
				),
				source: ResolutionSource::RolePermission,
			};
		}

		Resolution::default_deny(&key)
	}

	/// Returns true if the subject may perform `action` on `resource`.
	pub fn check(&self, resource: &str, action: &str) -> bool {
		self.resolve(resource, action).allowed
	}

	/// Checks a historical flat permission name.
	///
	/// Known names are translated through the legacy table. Anything else that
	/// contains a colon is split once on the first colon into a resource and an
	/// action. Any other string is only granted to the super admin; for everyone
	/// else it is a silent deny, logged as a warning rather than treated as an
	/// error.
	pub fn check_legacy(&self, permission: &str) -> bool {
		if let Some(entry) = legacy_permission(permission) {
			trace!("Legacy permission `{}` maps to `{}`", permission, entry.key());
			return self.check(&entry.resource.to_string(), &entry.action.to_string());
		}

		if let Some((resource, action)) = permission.split_once(':') {
			return self.check(resource, action);
		}

		if self.is_super_admin() {
			return true;
		}

		warn!("Unknown legacy permission `{}` - denying", permission);
		false
	}

	/// Checks a single [`PermissionRequest`], dispatching to [`Self::check`] or
	/// [`Self::check_legacy`].
	pub fn check_request(&self, request: &PermissionRequest) -> bool {
		match request {
			PermissionRequest::Structured { resource, action } => self.check(resource, action),
			PermissionRequest::Legacy(permission) => self.check_legacy(permission),
		}
	}

	/// Returns true if at least one of the requests is granted. Stops at the
	/// first granted request. An empty list grants nothing.
	pub fn check_any<'a>(&self, requests: impl IntoIterator<Item = &'a PermissionRequest>) -> bool {
		requests
			.into_iter()
			.any(|request| self.check_request(request))
	}

	/// Returns true if every request is granted. Stops at the first denied
	/// request. An empty list is trivially granted.
	pub fn check_all<'a>(&self, requests: impl IntoIterator<Item = &'a PermissionRequest>) -> bool {
		requests
			.into_iter()
			.all(|request| self.check_request(request))
	}

	/// Returns true if the subject holds a role with exactly this name.
	pub fn has_role(&self, name: &str) -> bool {
		self.roles().contains(name)
	}

	/// Returns true if the subject holds at least one of the named roles.
	pub fn has_any_role<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
		names.into_iter().any(|name| self.has_role(name))
	}

	/// Resolves every permission in the catalog for this subject. This is what
	/// the permission manager screens display for a user.
	pub fn effective_permissions(&self) -> Vec<(Permission, Resolution)> {
		self.catalog()
			.iter()
			.map(|permission| {
				(
					permission.clone(),
					self.resolve(&permission.resource, &permission.action),
				)
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::{BTreeMap, BTreeSet};

	use serde_test::{assert_de_tokens, Token};

	use super::*;
	use crate::{
		prelude::*,
		rbac::{RoleGrant, LEGACY_PERMISSIONS},
	};

	fn roles(names: &[&str]) -> BTreeSet<String> {
		names.iter().map(|name| name.to_string()).collect()
	}

	fn key(resource: &str, action: &str) -> PermissionKey {
		PermissionKey::new(resource, action)
	}

	/// A non admin subject with a mix of overrides and role grants.
	fn staff_snapshot() -> PermissionSnapshot {
		PermissionSnapshot::builder()
			.roles(roles(&["manager", "auditor"]))
			.overrides(BTreeMap::from([
				(key("hardware", "create"), Effect::Deny),
				(key("reports", "export"), Effect::Allow),
			]))
			.role_grants(BTreeMap::from([
				(
					key("hardware", "create"),
					vec![RoleGrant::new("manager", Effect::Allow)],
				),
				(
					key("tickets", "read"),
					vec![
						RoleGrant::new("auditor", Effect::Allow),
						RoleGrant::new("manager", Effect::Deny),
					],
				),
				(
					key("tickets", "update"),
					vec![
						RoleGrant::new("manager", Effect::Allow),
						RoleGrant::new("auditor", Effect::Allow),
					],
				),
				(
					key("reports", "export"),
					vec![RoleGrant::new("auditor", Effect::Deny)],
				),
			]))
			.build()
	}

	fn super_admin_snapshot() -> PermissionSnapshot {
		PermissionSnapshot::builder()
			.roles(roles(&[SUPER_ADMIN_ROLE]))
			.overrides(BTreeMap::from([(key("hardware", "create"), Effect::Deny)]))
			.build()
	}

	#[test]
	fn super_admin_short_circuits_overrides() {
		let resolution = super_admin_snapshot().resolve("hardware", "create");
		assert_eq!(
			resolution,
			Resolution {
				allowed: true,
				reason: "super_admin has all permissions".to_string(),
				source: ResolutionSource::RolePermission,
			}
		);
	}

	#[test]
	fn super_admin_is_allowed_unknown_pairs() {
		let snapshot = super_admin_snapshot();
		assert!(snapshot.check("anything", "at_all"));
		assert!(snapshot.check("", ""));
	}

	#[test]
	fn super_admin_short_circuits_role_denies() {
		let snapshot = PermissionSnapshot::builder()
			.roles(roles(&[SUPER_ADMIN_ROLE, "contractor"]))
			.role_grants(BTreeMap::from([(
				key("hardware", "delete"),
				vec![RoleGrant::new("contractor", Effect::Deny)],
			)]))
			.build();

		assert_eq!(
			snapshot.resolve("hardware", "delete"),
			Resolution {
				allowed: true,
				reason: "super_admin has all permissions".to_string(),
				source: ResolutionSource::RolePermission,
			}
		);
		assert!(snapshot.check_legacy("hardware:delete"));
	}

	#[test]
	fn override_precedes_role_grants() {
		let resolution = staff_snapshot().resolve("hardware", "create");
		assert!(!resolution.allowed);
		assert_eq!(resolution.source, ResolutionSource::UserOverride);
		assert_eq!(
			resolution.reason,
			"user has explicit deny override for hardware:create"
		);

		let resolution = staff_snapshot().resolve("reports", "export");
		assert!(resolution.allowed);
		assert_eq!(resolution.source, ResolutionSource::UserOverride);
		assert_eq!(
			resolution.reason,
			"user has explicit allow override for reports:export"
		);
	}

	#[test]
	fn deny_wins_within_role_tier() {
		let resolution = staff_snapshot().resolve("tickets", "read");
		assert_eq!(
			resolution,
			Resolution {
				allowed: false,
				reason: "role 'manager' has deny for tickets:read".to_string(),
				source: ResolutionSource::RolePermission,
			}
		);
	}

	#[test]
	fn first_allow_is_reported() {
		let resolution = staff_snapshot().resolve("tickets", "update");
		assert!(resolution.allowed);
		assert_eq!(resolution.source, ResolutionSource::RolePermission);
		assert_eq!(resolution.reason, "role 'manager' has allow for tickets:update");
	}

	#[test]
	fn unmatched_pairs_are_denied_by_default() {
		let resolution = staff_snapshot().resolve("newsletters", "send");
		assert_eq!(
			resolution,
			Resolution {
				allowed: false,
				reason: "no matching permission rules for newsletters:send - default deny"
					.to_string(),
				source: ResolutionSource::DefaultDeny,
			}
		);
		assert!(!PermissionSnapshot::empty().check("tickets", "read"));
	}

	#[test]
	fn keys_are_matched_case_sensitively() {
		assert!(staff_snapshot().check("tickets", "update"));
		assert!(!staff_snapshot().check("Tickets", "update"));
	}

	#[test]
	fn legacy_names_agree_with_structured_checks() {
		for snapshot in [
			staff_snapshot(),
			super_admin_snapshot(),
			PermissionSnapshot::empty(),
			PermissionSnapshot::builder()
				.roles(roles(&["requester"]))
				.role_grants(
					LEGACY_PERMISSIONS
						.iter()
						.step_by(2)
						.map(|&(_, resource, action)| {
							(
								key(&resource.to_string(), &action.to_string()),
								vec![RoleGrant::new("requester", Effect::Allow)],
							)
						})
						.collect(),
				)
				.build(),
		] {
			for &(name, resource, action) in LEGACY_PERMISSIONS {
				assert_eq!(
					snapshot.check_legacy(name),
					snapshot.check(&resource.to_string(), &action.to_string()),
					"`{name}` disagrees with {resource}:{action}"
				);
			}
		}
	}

	#[test]
	fn legacy_strings_with_colons_are_split_once() {
		let snapshot = PermissionSnapshot::builder()
			.role_grants(BTreeMap::from([(
				key("tickets", "read:all"),
				vec![RoleGrant::new("auditor", Effect::Allow)],
			)]))
			.build();
		assert!(snapshot.check_legacy("tickets:read:all"));
		assert!(!snapshot.check_legacy("tickets:read"));
	}

	#[test]
	fn unknown_legacy_string_is_denied_unless_super_admin() {
		assert!(!staff_snapshot().check_legacy("totally_unknown_permission"));
		assert!(super_admin_snapshot().check_legacy("totally_unknown_permission"));
	}

	#[test]
	fn legacy_lookup_is_used_before_colon_split() {
		let snapshot = PermissionSnapshot::builder()
			.role_grants(BTreeMap::from([(
				key("hardware", "approve"),
				vec![RoleGrant::new("approver", Effect::Allow)],
			)]))
			.build();
		assert!(snapshot.check_legacy("approve_hardware_request"));
		assert!(snapshot.check_legacy("hardware:approve"));
		assert!(!snapshot.check_legacy("reject_hardware_request"));
	}

	#[test]
	fn check_any_and_check_all_mix_request_kinds() {
		let snapshot = staff_snapshot();
		let granted = PermissionRequest::structured("tickets", "update");
		let denied_legacy = PermissionRequest::from("create_hardware_request");
		let granted_legacy = PermissionRequest::from("reports:export");

		assert!(snapshot.check_any(&[granted.clone(), denied_legacy.clone()]));
		assert!(!snapshot.check_all(&[granted.clone(), denied_legacy.clone()]));
		assert!(snapshot.check_all(&[granted.clone(), granted_legacy.clone()]));
		assert!(!snapshot.check_any(&[denied_legacy.clone()]));
		assert!(!snapshot.check_any(std::iter::empty()));
		assert!(snapshot.check_all(std::iter::empty()));
	}

	#[test]
	fn role_membership() {
		let snapshot = staff_snapshot();
		assert!(snapshot.has_role("manager"));
		assert!(!snapshot.has_role("Manager"));
		assert!(snapshot.has_any_role(["guest", "auditor"]));
		assert!(!snapshot.has_any_role(["guest"]));
		assert!(!snapshot.has_any_role(std::iter::empty()));
		assert!(!snapshot.is_super_admin());
	}

	#[test]
	fn effective_permissions_resolve_the_catalog() {
		let snapshot = PermissionSnapshot::builder()
			.roles(roles(&["manager"]))
			.role_grants(BTreeMap::from([(
				key("tickets", "read"),
				vec![RoleGrant::new("manager", Effect::Allow)],
			)]))
			.catalog(vec![
				Permission {
					id: Uuid::new_v4(),
					resource: "tickets".to_string(),
					action: "read".to_string(),
					description: None,
				},
				Permission {
					id: Uuid::new_v4(),
					resource: "tickets".to_string(),
					action: "delete".to_string(),
					description: None,
				},
			])
			.build();

		let effective = snapshot.effective_permissions();
		assert_eq!(effective.len(), 2);
		assert!(effective[0].1.allowed);
		assert_eq!(effective[1].1.source, ResolutionSource::DefaultDeny);
	}

	#[test]
	fn requests_deserialize_from_objects_or_strings() {
		assert_de_tokens(
			&PermissionRequest::structured("tickets", "read"),
			&[
				Token::Map { len: Some(2) },
				Token::Str("resource"),
				Token::Str("tickets"),
				Token::Str("action"),
				Token::Str("read"),
				Token::MapEnd,
			],
		);
		assert_de_tokens(
			&PermissionRequest::from("view_tickets"),
			&[Token::Str("view_tickets")],
		);
	}

	#[test]
	fn resolution_serializes_with_snake_case_source() {
		let json = serde_json::to_value(Resolution::default_deny(&key("a", "b"))).unwrap();
		assert_eq!(json["source"], "default_deny");
		assert_eq!(json["allowed"], false);
	}
}
