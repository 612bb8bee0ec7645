use permissions::{db, prelude::*};
use sqlx::Pool;

async fn setup() -> Pool<DatabaseType> {
	let pool = db::connect(&DatabaseConfig::in_memory()).await.unwrap();
	db::initialize(&pool).await.unwrap();
	pool
}

async fn permission_id(connection: &mut DatabaseConnection, resource: &str, action: &str) -> Uuid {
	db::get_permission_by_key(connection, &PermissionKey::new(resource, action))
		.await
		.unwrap()
		.unwrap_or_else(|| panic!("{resource}:{action} is not in the catalog"))
		.id
}

#[tokio::test]
async fn initializer_seeds_the_catalog() {
	let pool = setup().await;
	let mut connection = pool.acquire().await.unwrap();

	let stored = db::get_all_permissions(&mut connection).await.unwrap();
	assert_eq!(stored.len(), list_all_permissions().len());

	let approve = db::get_permission_by_key(
		&mut connection,
		&PermissionKey::new("hardware", "approve"),
	)
	.await
	.unwrap()
	.unwrap();
	assert_eq!(
		approve.description.as_deref(),
		Some("Approve hardware requests")
	);

	assert!(db::get_permission_by_key(&mut connection, &PermissionKey::new("hardware", "fly"))
		.await
		.unwrap()
		.is_none());
}

#[tokio::test]
async fn initializing_twice_keeps_the_data() {
	let pool = setup().await;
	{
		let mut connection = pool.acquire().await.unwrap();
		db::create_role(&mut connection, "manager", None).await.unwrap();
	}

	db::initialize(&pool).await.unwrap();

	let mut connection = pool.acquire().await.unwrap();
	assert!(db::get_role_by_name(&mut connection, "manager")
		.await
		.unwrap()
		.is_some());
	assert_eq!(
		db::get_all_permissions(&mut connection).await.unwrap().len(),
		list_all_permissions().len()
	);
}

#[tokio::test]
async fn role_names_are_unique() {
	let pool = setup().await;
	let mut connection = pool.acquire().await.unwrap();

	db::create_role(&mut connection, "manager", Some("Branch managers"))
		.await
		.unwrap();
	assert!(db::create_role(&mut connection, "manager", None).await.is_err());

	let roles = db::get_all_roles(&mut connection).await.unwrap();
	assert_eq!(roles.len(), 1);
	assert_eq!(roles[0].description.as_deref(), Some("Branch managers"));
}

#[tokio::test]
async fn role_grants_are_seen_after_refresh() {
	let pool = setup().await;
	let user = Uuid::new_v4();
	{
		let mut connection = pool.acquire().await.unwrap();
		let role = db::create_role(&mut connection, "manager", None).await.unwrap();
		let approve = permission_id(&mut connection, "hardware", "approve").await;
		db::set_role_permission(&mut connection, &role.id, &approve, Effect::Allow)
			.await
			.unwrap();
		db::assign_role_to_user(&mut connection, &user, &role.id)
			.await
			.unwrap();
		// Assigning twice is a no-op
		db::assign_role_to_user(&mut connection, &user, &role.id)
			.await
			.unwrap();
	}

	let service = PermissionService::new(SqlPermissionSource::new(pool.clone()));
	assert!(service.refresh(user).await);

	assert!(service.has_role("manager"));
	assert!(service.check("hardware", "approve"));
	assert!(service.check_legacy("approve_hardware_request"));
	assert!(!service.check("hardware", "delete"));
	assert_eq!(
		service.resolve("hardware", "approve").reason,
		"role 'manager' has allow for hardware:approve"
	);
}

#[tokio::test]
async fn deny_grant_wins_over_allow_from_another_role() {
	let pool = setup().await;
	let user = Uuid::new_v4();
	{
		let mut connection = pool.acquire().await.unwrap();
		let export = permission_id(&mut connection, "reports", "export").await;
		let analyst = db::create_role(&mut connection, "analyst", None).await.unwrap();
		let contractor = db::create_role(&mut connection, "contractor", None)
			.await
			.unwrap();
		db::set_role_permission(&mut connection, &analyst.id, &export, Effect::Allow)
			.await
			.unwrap();
		db::set_role_permission(&mut connection, &contractor.id, &export, Effect::Deny)
			.await
			.unwrap();
		db::assign_role_to_user(&mut connection, &user, &analyst.id)
			.await
			.unwrap();
		db::assign_role_to_user(&mut connection, &user, &contractor.id)
			.await
			.unwrap();
	}

	let service = PermissionService::new(SqlPermissionSource::new(pool));
	service.refresh(user).await;

	let resolution = service.resolve("reports", "export");
	assert!(!resolution.allowed);
	assert_eq!(resolution.source, ResolutionSource::RolePermission);
	assert_eq!(resolution.reason, "role 'contractor' has deny for reports:export");
}

#[tokio::test]
async fn overrides_beat_role_grants_and_can_be_removed() {
	let pool = setup().await;
	let user = Uuid::new_v4();
	let service = PermissionService::new(SqlPermissionSource::new(pool.clone()));

	let create = {
		let mut connection = pool.acquire().await.unwrap();
		let role = db::create_role(&mut connection, "staff", None).await.unwrap();
		let create = permission_id(&mut connection, "hardware", "create").await;
		db::set_role_permission(&mut connection, &role.id, &create, Effect::Allow)
			.await
			.unwrap();
		db::assign_role_to_user(&mut connection, &user, &role.id)
			.await
			.unwrap();
		db::set_user_override(&mut connection, &user, &create, Effect::Allow)
			.await
			.unwrap();
		// Replaces the allow above, there is only ever one override per key
		db::set_user_override(&mut connection, &user, &create, Effect::Deny)
			.await
			.unwrap();
		create
	};

	service.refresh(user).await;
	let resolution = service.resolve("hardware", "create");
	assert!(!resolution.allowed);
	assert_eq!(resolution.source, ResolutionSource::UserOverride);
	assert_eq!(resolution.reason, "user has explicit deny override for hardware:create");
	assert!(!service.check_legacy("create_hardware_request"));

	{
		let mut connection = pool.acquire().await.unwrap();
		assert!(db::remove_user_override(&mut connection, &user, &create)
			.await
			.unwrap());
		assert!(!db::remove_user_override(&mut connection, &user, &create)
			.await
			.unwrap());
	}

	// The snapshot only changes on refresh
	assert!(!service.check("hardware", "create"));
	service.refresh(user).await;
	assert!(service.check("hardware", "create"));
}

#[tokio::test]
async fn removing_a_role_revokes_its_grants() {
	let pool = setup().await;
	let user = Uuid::new_v4();
	let service = PermissionService::new(SqlPermissionSource::new(pool.clone()));

	let role = {
		let mut connection = pool.acquire().await.unwrap();
		let role = db::create_role(&mut connection, "support", None).await.unwrap();
		let close = permission_id(&mut connection, "tickets", "close").await;
		db::set_role_permission(&mut connection, &role.id, &close, Effect::Allow)
			.await
			.unwrap();
		db::assign_role_to_user(&mut connection, &user, &role.id)
			.await
			.unwrap();
		role
	};

	service.refresh(user).await;
	assert!(service.check("tickets", "close"));

	{
		let mut connection = pool.acquire().await.unwrap();
		assert!(db::remove_role_from_user(&mut connection, &user, &role.id)
			.await
			.unwrap());
	}

	service.refresh(user).await;
	assert!(!service.has_role("support"));
	assert!(!service.check("tickets", "close"));
	assert_eq!(
		service.resolve("tickets", "close").reason,
		"no matching permission rules for tickets:close - default deny"
	);
}

#[tokio::test]
async fn revoking_a_grant_falls_back_to_default_deny() {
	let pool = setup().await;
	let user = Uuid::new_v4();
	{
		let mut connection = pool.acquire().await.unwrap();
		let role = db::create_role(&mut connection, "editor", None).await.unwrap();
		let send = permission_id(&mut connection, "newsletters", "send").await;
		db::set_role_permission(&mut connection, &role.id, &send, Effect::Allow)
			.await
			.unwrap();
		// Upserting flips the effect in place
		db::set_role_permission(&mut connection, &role.id, &send, Effect::Deny)
			.await
			.unwrap();
		db::assign_role_to_user(&mut connection, &user, &role.id)
			.await
			.unwrap();

		let grants = db::get_role_grants_for_user(&mut connection, &user)
			.await
			.unwrap();
		assert_eq!(grants.len(), 1);
		assert_eq!(grants[0].effect, Effect::Deny);

		assert!(db::remove_role_permission(&mut connection, &role.id, &send)
			.await
			.unwrap());
	}

	let service = PermissionService::new(SqlPermissionSource::new(pool));
	service.refresh(user).await;
	assert!(service.has_role("editor"));
	assert_eq!(
		service.resolve("newsletters", "send").source,
		ResolutionSource::DefaultDeny
	);
}

#[tokio::test]
async fn super_admin_role_allows_everything() {
	let pool = setup().await;
	let user = Uuid::new_v4();
	{
		let mut connection = pool.acquire().await.unwrap();
		let role = db::create_role(&mut connection, SUPER_ADMIN_ROLE, None)
			.await
			.unwrap();
		db::assign_role_to_user(&mut connection, &user, &role.id)
			.await
			.unwrap();

		let contractor = db::create_role(&mut connection, "contractor", None)
			.await
			.unwrap();
		let delete = permission_id(&mut connection, "hardware", "delete").await;
		db::set_role_permission(&mut connection, &contractor.id, &delete, Effect::Deny)
			.await
			.unwrap();
		db::assign_role_to_user(&mut connection, &user, &contractor.id)
			.await
			.unwrap();
	}

	let service = PermissionService::new(SqlPermissionSource::new(pool));
	service.refresh(user).await;

	let resolution = service.resolve("hardware", "delete");
	assert!(resolution.allowed);
	assert_eq!(resolution.source, ResolutionSource::RolePermission);
	assert_eq!(resolution.reason, "super_admin has all permissions");
	assert!(service.has_role("contractor"));
	assert!(service.check("hardware", "delete"));
	assert!(service.check("anything", "at_all"));
	assert!(service.check_legacy("totally_unknown_permission"));
	assert!(service
		.effective_permissions()
		.iter()
		.all(|(_, resolution)| resolution.allowed));
}

#[tokio::test]
async fn unknown_user_gets_an_empty_ready_snapshot() {
	let pool = setup().await;
	let service = PermissionService::new(SqlPermissionSource::new(pool));

	assert!(service.refresh(Uuid::new_v4()).await);
	assert!(service.current().status.is_ready());
	assert!(!service.check("tickets", "read"));
	assert!(!service.has_any_role(["reader", SUPER_ADMIN_ROLE]));
	assert_eq!(
		service.effective_permissions().len(),
		list_all_permissions().len()
	);
}

#[tokio::test]
async fn closed_pool_fails_the_load() {
	let pool = setup().await;
	let user = Uuid::new_v4();
	let service = PermissionService::new(SqlPermissionSource::new(pool.clone()));
	pool.close().await;

	assert!(service.refresh(user).await);
	assert!(service.last_error().is_some());
	assert!(!service.check("tickets", "read"));
}
