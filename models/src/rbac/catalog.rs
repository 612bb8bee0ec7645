use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumMessage, EnumString, IntoEnumIterator};

use super::PermissionKey;

/// A list of all resource types the portal protects.
#[derive(
	Eq,
	Ord,
	Copy,
	Hash,
	Debug,
	Clone,
	Display,
	EnumIter,
	PartialEq,
	Serialize,
	EnumString,
	PartialOrd,
	EnumMessage,
	Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Resource {
	/// Hardware requests raised by staff, such as laptops or phones.
	#[strum(message = "hardware requests")]
	Hardware,
	/// Software and licence requests.
	#[strum(message = "software requests")]
	Software,
	/// Marketing material requests.
	#[strum(message = "marketing requests")]
	Marketing,
	/// Support tickets.
	#[strum(message = "tickets")]
	Tickets,
	/// The generic request inbox that aggregates every request type.
	#[strum(message = "requests")]
	Requests,
	/// User accounts of the portal.
	#[strum(message = "users")]
	Users,
	/// Roles and their permission grants.
	#[strum(message = "roles")]
	Roles,
	/// Per-user permission overrides.
	#[strum(message = "permissions")]
	Permissions,
	/// Companies (tenants) registered in the portal.
	#[strum(message = "companies")]
	Companies,
	/// Brands belonging to a company.
	#[strum(message = "brands")]
	Brands,
	/// Physical locations of a company.
	#[strum(message = "locations")]
	Locations,
	/// Newsletter campaigns.
	#[strum(message = "newsletters")]
	Newsletters,
	/// Marketing fax campaigns.
	#[strum(message = "fax campaigns")]
	FaxCampaigns,
	/// Reminders scheduled for users.
	#[strum(message = "reminders")]
	Reminders,
	/// Company wide settings, such as the colour scheme.
	#[strum(message = "settings")]
	Settings,
	/// Reports and dashboards.
	#[strum(message = "reports")]
	Reports,
	/// Shared documents.
	#[strum(message = "documents")]
	Documents,
}

/// A list of all actions that can be performed on a [`Resource`].
#[derive(
	Eq,
	Ord,
	Copy,
	Hash,
	Debug,
	Clone,
	Display,
	EnumIter,
	PartialEq,
	Serialize,
	EnumString,
	PartialOrd,
	EnumMessage,
	Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Action {
	/// Create a new item.
	#[strum(message = "Create")]
	Create,
	/// View items and their details.
	#[strum(message = "View")]
	Read,
	/// Edit an existing item.
	#[strum(message = "Edit")]
	Update,
	/// Delete an item.
	#[strum(message = "Delete")]
	Delete,
	/// Approve a pending item.
	#[strum(message = "Approve")]
	Approve,
	/// Reject a pending item.
	#[strum(message = "Reject")]
	Reject,
	/// Assign an item to a user.
	#[strum(message = "Assign")]
	Assign,
	/// Full administrative control over the resource.
	#[strum(message = "Manage")]
	Manage,
	/// Send an item to its recipients.
	#[strum(message = "Send")]
	Send,
	/// Export items to a file.
	#[strum(message = "Export")]
	Export,
	/// Import items from a file.
	#[strum(message = "Import")]
	Import,
	/// Comment on an item.
	#[strum(message = "Comment on")]
	Comment,
	/// Close an item.
	#[strum(message = "Close")]
	Close,
}

impl Resource {
	/// The actions that can be granted on this resource.
	pub fn actions(&self) -> &'static [Action] {
		use Action::*;

		match self {
			Resource::Hardware | Resource::Software | Resource::Marketing => {
				&[Create, Read, Update, Delete, Approve, Reject, Comment]
			}
			Resource::Tickets => &[
				Create, Read, Update, Delete, Assign, Comment, Close, Export,
			],
			Resource::Requests => &[Read, Approve, Reject, Assign, Export],
			Resource::Users => &[Create, Read, Update, Delete, Import, Export],
			Resource::Roles => &[Create, Read, Update, Delete, Assign],
			Resource::Permissions => &[Read, Manage],
			Resource::Companies | Resource::Brands | Resource::Locations => {
				&[Create, Read, Update, Delete]
			}
			Resource::Newsletters | Resource::FaxCampaigns => {
				&[Create, Read, Update, Delete, Send, Export]
			}
			Resource::Reminders => &[Create, Read, Update, Delete],
			Resource::Settings => &[Read, Update, Manage],
			Resource::Reports => &[Read, Export],
			Resource::Documents => &[Create, Read, Update, Delete, Import, Export],
		}
	}

	/// Returns true if `action` can be granted on this resource.
	pub fn supports(&self, action: Action) -> bool {
		self.actions().contains(&action)
	}
}

/// An entry of the built-in permission catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogEntry {
	/// The protected resource.
	pub resource: Resource,
	/// The action on the resource.
	pub action: Action,
}

impl CatalogEntry {
	/// The key this entry is identified by in a snapshot.
	pub fn key(&self) -> PermissionKey {
		PermissionKey::new(self.resource.to_string(), self.action.to_string())
	}

	/// A human readable description, such as `Approve hardware requests`.
	pub fn description(&self) -> String {
		format!(
			"{} {}",
			self.action.get_message().unwrap_or_default(),
			self.resource.get_message().unwrap_or_default()
		)
	}
}

/// Returns every `(resource, action)` pair the portal knows about. The store
/// initializer seeds the permission table from this list.
pub fn list_all_permissions() -> Vec<CatalogEntry> {
	Resource::iter()
		.flat_map(|resource| {
			resource
				.actions()
				.iter()
				.map(move |&action| CatalogEntry { resource, action })
		})
		.collect()
}
