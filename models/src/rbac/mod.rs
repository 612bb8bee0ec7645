use std::fmt::{Display, Formatter};
#[cfg(feature = "sqlx")]
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString};

use crate::prelude::*;

/// The built-in catalog of resources and the actions each of them supports.
mod catalog;
/// The table that maps historical flat permission names to structured keys.
mod legacy;
/// The resolution engine: overrides, role grants and the default-deny fallback.
mod resolver;
/// The in-memory snapshot of a subject's roles, overrides and role grants.
mod snapshot;
/// The loading / ready / failed state a snapshot goes through.
mod state;

pub use self::{catalog::*, legacy::*, resolver::*, snapshot::*, state::*};

/// The name of the role that is granted every permission unconditionally.
///
/// This is a hard-coded bypass matched by literal string equality against the
/// subject's role names. It is not a permission in the catalog and renaming the
/// role in the store removes the bypass.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// The effect attached to a role grant or a user override.
#[derive(
	Eq,
	Ord,
	Copy,
	Hash,
	Debug,
	Clone,
	EnumIter,
	PartialEq,
	Serialize,
	EnumString,
	PartialOrd,
	Deserialize,
	StrumDisplay,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Effect {
	/// The permission is granted.
	Allow,
	/// The permission is explicitly refused.
	Deny,
}

impl Effect {
	/// Returns true if this effect grants the permission.
	pub fn is_allow(&self) -> bool {
		matches!(self, Effect::Allow)
	}

	/// Returns true if this effect refuses the permission.
	pub fn is_deny(&self) -> bool {
		matches!(self, Effect::Deny)
	}
}

#[cfg(feature = "sqlx")]
impl<DB> sqlx::Type<DB> for Effect
where
	DB: sqlx::Database,
	String: sqlx::Type<DB>,
{
	fn type_info() -> <DB as sqlx::Database>::TypeInfo {
		<String as sqlx::Type<DB>>::type_info()
	}

	fn compatible(ty: &<DB as sqlx::Database>::TypeInfo) -> bool {
		<String as sqlx::Type<DB>>::compatible(ty)
	}
}

#[cfg(feature = "sqlx")]
impl<'q, DB> sqlx::Encode<'q, DB> for Effect
where
	DB: sqlx::Database,
	String: sqlx::Encode<'q, DB>,
{
	fn encode_by_ref(
		&self,
		buf: &mut <DB as sqlx::Database>::ArgumentBuffer<'q>,
	) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
		<String as sqlx::Encode<'q, DB>>::encode(self.to_string(), buf)
	}
}

#[cfg(feature = "sqlx")]
impl<'q, DB> sqlx::Decode<'q, DB> for Effect
where
	DB: sqlx::Database,
	String: sqlx::Decode<'q, DB>,
{
	fn decode(
		value: <DB as sqlx::Database>::ValueRef<'q>,
	) -> Result<Self, sqlx::error::BoxDynError> {
		let effect = <String as sqlx::Decode<'q, DB>>::decode(value)?;
		Ok(FromStr::from_str(&effect)?)
	}
}

/// The identity of a permission: a `(resource, action)` pair.
///
/// Both tokens are matched exactly and case-sensitively. The key is kept as a
/// pair rather than a concatenated `resource:action` string, so a token that
/// itself contains a colon can never collide with a different pair. The
/// [`Display`] implementation still renders the familiar `resource:action`
/// form for logs and explanations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionKey {
	/// The protected object class, such as `hardware` or `tickets`.
	pub resource: String,
	/// The operation on the resource, such as `create` or `approve`.
	pub action: String,
}

impl PermissionKey {
	/// Creates a new key from a resource and an action.
	pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
		Self {
			resource: resource.into(),
			action: action.into(),
		}
	}
}

impl Display for PermissionKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.resource, self.action)
	}
}

/// A row of the permission catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
	/// The ID of the permission in the store.
	pub id: Uuid,
	/// The resource the permission protects.
	pub resource: String,
	/// The action the permission allows on the resource.
	pub action: String,
	/// A human readable description, shown in the admin screens.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

impl Permission {
	/// The key this permission is identified by.
	pub fn key(&self) -> PermissionKey {
		PermissionKey::new(&self.resource, &self.action)
	}
}

/// A named grouping of permission grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
	/// The ID of the role.
	pub id: Uuid,
	/// The unique name of the role.
	pub name: String,
	/// A human readable description of what the role is for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// A role held by a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
	/// The ID of the role.
	pub role_id: Uuid,
	/// The name of the role, such as `super_admin` or `manager`.
	pub role_name: String,
}

/// An override set directly on a subject for one permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissionOverride {
	/// The ID of the permission being overridden.
	pub permission_id: Uuid,
	/// Whether the override allows or denies the permission.
	pub effect: Effect,
	/// The resource of the overridden permission.
	pub resource: String,
	/// The action of the overridden permission.
	pub action: String,
}

impl UserPermissionOverride {
	/// The key this override applies to.
	pub fn key(&self) -> PermissionKey {
		PermissionKey::new(&self.resource, &self.action)
	}
}

/// A permission granted (or denied) to one of the subject's roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionGrant {
	/// The name of the role that carries the grant.
	pub role_name: String,
	/// The ID of the granted permission.
	pub permission_id: Uuid,
	/// Whether the role allows or denies the permission.
	pub effect: Effect,
	/// The resource of the granted permission.
	pub resource: String,
	/// The action of the granted permission.
	pub action: String,
}

impl RolePermissionGrant {
	/// The key this grant applies to.
	pub fn key(&self) -> PermissionKey {
		PermissionKey::new(&self.resource, &self.action)
	}
}

/// A single role-derived entry for a permission key, as held in a
/// [`PermissionSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrant {
	/// The name of the granting role.
	pub role_name: String,
	/// The effect the role attaches to the key.
	pub effect: Effect,
}

impl RoleGrant {
	/// Creates a new role grant entry.
	pub fn new(role_name: impl Into<String>, effect: Effect) -> Self {
		Self {
			role_name: role_name.into(),
			effect,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_test::{assert_tokens, Token};

	use super::*;

	#[test]
	fn effect_tokens_are_lowercase() {
		assert_eq!(Effect::Allow.to_string(), "allow");
		assert_eq!(Effect::Deny.to_string(), "deny");
		assert_eq!("deny".parse::<Effect>().unwrap(), Effect::Deny);
		assert!("Deny".parse::<Effect>().is_err());
		assert_tokens(
			&Effect::Allow,
			&[Token::UnitVariant {
				name: "Effect",
				variant: "allow",
			}],
		);
	}

	#[test]
	fn key_displays_as_resource_colon_action() {
		assert_eq!(
			PermissionKey::new("hardware", "create").to_string(),
			"hardware:create"
		);
	}

	#[test]
	fn keys_with_colons_do_not_collide() {
		let left = PermissionKey::new("a:b", "c");
		let right = PermissionKey::new("a", "b:c");
		assert_eq!(left.to_string(), right.to_string());
		assert_ne!(left, right);
	}

	#[test]
	fn keys_are_case_sensitive() {
		assert_ne!(
			PermissionKey::new("Tickets", "read"),
			PermissionKey::new("tickets", "read")
		);
	}
}
