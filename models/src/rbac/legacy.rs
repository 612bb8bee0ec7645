use super::{Action, CatalogEntry, Resource};

/// Historical flat permission names and the structured permission each one
/// now maps to. Older screens and stored preferences still refer to these
/// names, so they are translated before being checked.
///
/// This table is maintained by hand. An entry that is missing here makes
/// [`PermissionSnapshot::check_legacy`][1] fall back to the super admin only
/// path for that name, which silently narrows access for everyone else.
///
/// [1]: super::PermissionSnapshot::check_legacy
#[rustfmt::skip]
pub const LEGACY_PERMISSIONS: &[(&str, Resource, Action)] = &[
	// Hardware requests
	("create_hardware_request", Resource::Hardware, Action::Create),
	("view_hardware_requests", Resource::Hardware, Action::Read),
	("edit_hardware_request", Resource::Hardware, Action::Update),
	("delete_hardware_request", Resource::Hardware, Action::Delete),
	("approve_hardware_request", Resource::Hardware, Action::Approve),
	("reject_hardware_request", Resource::Hardware, Action::Reject),
	("comment_hardware_request", Resource::Hardware, Action::Comment),
	// Software requests
	("create_software_request", Resource::Software, Action::Create),
	("view_software_requests", Resource::Software, Action::Read),
	("delete_software_request", Resource::Software, Action::Delete),
	("approve_software_request", Resource::Software, Action::Approve),
	("reject_software_request", Resource::Software, Action::Reject),
	// Marketing requests
	("create_marketing_request", Resource::Marketing, Action::Create),
	("view_marketing_requests", Resource::Marketing, Action::Read),
	("approve_marketing_request", Resource::Marketing, Action::Approve),
	("reject_marketing_request", Resource::Marketing, Action::Reject),
	// Tickets
	("create_ticket", Resource::Tickets, Action::Create),
	("view_tickets", Resource::Tickets, Action::Read),
	("edit_ticket", Resource::Tickets, Action::Update),
	("delete_ticket", Resource::Tickets, Action::Delete),
	("assign_ticket", Resource::Tickets, Action::Assign),
	("comment_ticket", Resource::Tickets, Action::Comment),
	("close_ticket", Resource::Tickets, Action::Close),
	("export_tickets", Resource::Tickets, Action::Export),
	// Request inbox
	("view_all_requests", Resource::Requests, Action::Read),
	("approve_requests", Resource::Requests, Action::Approve),
	("reject_requests", Resource::Requests, Action::Reject),
	("assign_requests", Resource::Requests, Action::Assign),
	("export_requests", Resource::Requests, Action::Export),
	// Users
	("create_user", Resource::Users, Action::Create),
	("view_users", Resource::Users, Action::Read),
	("edit_user", Resource::Users, Action::Update),
	("delete_user", Resource::Users, Action::Delete),
	("import_users", Resource::Users, Action::Import),
	("export_users", Resource::Users, Action::Export),
	// Roles
	("view_roles", Resource::Roles, Action::Read),
	("create_role", Resource::Roles, Action::Create),
	("edit_role", Resource::Roles, Action::Update),
	("delete_role", Resource::Roles, Action::Delete),
	("assign_roles", Resource::Roles, Action::Assign),
	// Permissions
	("view_permissions", Resource::Permissions, Action::Read),
	("manage_permissions", Resource::Permissions, Action::Manage),
	("manage_user_permissions", Resource::Permissions, Action::Manage),
	// Companies, brands and locations
	("view_companies", Resource::Companies, Action::Read),
	("create_company", Resource::Companies, Action::Create),
	("edit_company", Resource::Companies, Action::Update),
	("delete_company", Resource::Companies, Action::Delete),
	("view_brands", Resource::Brands, Action::Read),
	("create_brand", Resource::Brands, Action::Create),
	("edit_brand", Resource::Brands, Action::Update),
	("view_locations", Resource::Locations, Action::Read),
	("create_location", Resource::Locations, Action::Create),
	("edit_location", Resource::Locations, Action::Update),
	// Newsletters and fax campaigns
	("view_newsletters", Resource::Newsletters, Action::Read),
	("create_newsletter", Resource::Newsletters, Action::Create),
	("send_newsletter", Resource::Newsletters, Action::Send),
	("export_newsletter_stats", Resource::Newsletters, Action::Export),
	("view_fax_campaigns", Resource::FaxCampaigns, Action::Read),
	("create_fax_campaign", Resource::FaxCampaigns, Action::Create),
	("send_fax_campaign", Resource::FaxCampaigns, Action::Send),
	// Reminders
	("view_reminders", Resource::Reminders, Action::Read),
	("create_reminder", Resource::Reminders, Action::Create),
	("edit_reminder", Resource::Reminders, Action::Update),
	("delete_reminder", Resource::Reminders, Action::Delete),
	// Settings
	("view_settings", Resource::Settings, Action::Read),
	("edit_settings", Resource::Settings, Action::Update),
	("manage_color_scheme", Resource::Settings, Action::Manage),
	// Reports
	("view_reports", Resource::Reports, Action::Read),
	("view_dashboard", Resource::Reports, Action::Read),
	("export_reports", Resource::Reports, Action::Export),
	// Documents
	("view_documents", Resource::Documents, Action::Read),
	("upload_documents", Resource::Documents, Action::Create),
];

/// Translates a historical flat permission name into the structured
/// permission it now stands for. Returns [`None`] for names that are not in
/// [`LEGACY_PERMISSIONS`].
pub fn legacy_permission(name: &str) -> Option<CatalogEntry> {
	LEGACY_PERMISSIONS
		.iter()
		.find(|(legacy_name, _, _)| *legacy_name == name)
		.map(|&(_, resource, action)| CatalogEntry { resource, action })
}
