use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, CompleteProfile, CreateUserFromAuth};

/// Find a user by their identity-provider ID, creating them from token
/// claims on first sight (called by the auth extractor).
pub async fn find_or_create_from_auth<C: ConnectionTrait>(
    conn: &C,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = users::Entity::find_by_id(input.id).one(conn).await? {
        return Ok(existing);
    }

    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        display_name: Set(input.display_name),
        role: Set(input.role),
        level: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    tracing::info!(user_id = %input.id, role = ?input.role, "creating user from token claims");
    new_user.insert(conn).await
}

/// Fetch a single user by ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Complete a user's profile (role, display name, level) after first login.
pub async fn complete_profile(
    db: &DatabaseConnection,
    id: Uuid,
    input: CompleteProfile,
) -> Result<users::Model, DbErr> {
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

    let mut active: users::ActiveModel = user.into();

    if let Some(role) = input.role {
        active.role = Set(role);
    }
    if let Some(display_name) = input.display_name {
        active.display_name = Set(Some(display_name));
    }
    if let Some(level) = input.level {
        active.level = Set(Some(level));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
