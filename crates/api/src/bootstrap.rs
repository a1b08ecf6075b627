//! First-run admin account.
//!
//! Admins cannot self-register, so the first one is created at startup
//! from `ADMIN_EMAIL` / `ADMIN_PASSWORD` when no account with that email
//! exists yet.

use queuedesk_core::roles::ROLE_ADMIN;
use queuedesk_db::repositories::UserRepo;
use queuedesk_db::DbPool;

use crate::config::AdminBootstrap;
use crate::error::AppResult;
use crate::handlers::auth::NewAccountRequest;

/// Create the configured admin unless the email is already taken.
///
/// Returns `true` when an account was created. An existing account is left
/// untouched, whatever its role.
pub async fn ensure_admin(pool: &DbPool, admin: &AdminBootstrap) -> AppResult<bool> {
    if UserRepo::find_by_email(pool, &admin.email).await?.is_some() {
        tracing::debug!(email = %admin.email, "Bootstrap admin already exists");
        return Ok(false);
    }

    let input = NewAccountRequest {
        email: admin.email.clone(),
        password: admin.password.clone(),
        full_name: admin.full_name.clone(),
        phone_number: admin.phone_number.clone(),
    }
    .into_create_user()?;

    let user = UserRepo::create_with_role(pool, &input, ROLE_ADMIN).await?;
    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
    Ok(true)
}
