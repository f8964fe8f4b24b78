use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::auth::error::{is_unique_violation, AuthError};
use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::repo_types::{Role, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registers a user: field checks, password policy on the plaintext, then
/// hash and insert. A uniqueness race is settled by the store constraint.
pub async fn register_user(
    db: &PgPool,
    full_name: &str,
    password: &str,
    phone: &str,
    email: &str,
    user_role: &str,
) -> Result<(), AuthError> {
    if full_name.is_empty() {
        return Err(AuthError::EmptyName);
    }
    if phone.is_empty() {
        return Err(AuthError::EmptyPhone);
    }
    if email.is_empty() {
        return Err(AuthError::EmptyEmail);
    }
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    if !validate_password(password) {
        return Err(AuthError::BadPassword);
    }

    let passhash = hash_password(password).map_err(|_| AuthError::Hash)?;

    User::insert(db, full_name, &passhash, phone, email, user_role)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UserExists
            } else {
                AuthError::Store(e)
            }
        })?;

    debug!(email = %email, "user registered");
    Ok(())
}

/// Resolves a user by phone first, then by email. A store failure on the
/// phone path propagates immediately; only a clean miss falls through.
pub async fn user_by_contact_info(db: &PgPool, contact_info: &str) -> Result<User, AuthError> {
    if contact_info.is_empty() {
        return Err(AuthError::EmptyContact);
    }

    if let Some(user) = User::by_phone(db, contact_info).await? {
        return Ok(user);
    }

    match User::by_email(db, contact_info).await? {
        Some(user) => Ok(user),
        None => Err(AuthError::UserNotFound),
    }
}

/// Password check against the stored hash. Any failure, including a hash
/// that will not parse, reads as invalid credentials.
pub fn authenticate(user: &User, password: &str) -> Result<(), AuthError> {
    match verify_password(password, &user.passhash) {
        Ok(true) => Ok(()),
        _ => Err(AuthError::InvalidCredentials),
    }
}

/// Lookup by id with the role string mapped to the enum. An unmapped role
/// is its own error, never silently downgraded to not-found.
pub async fn user_by_user_id(db: &PgPool, user_id: i64) -> Result<User, AuthError> {
    if user_id == 0 {
        return Err(AuthError::EmptyUserId);
    }

    let user = User::by_id(db, user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if user.role() == Role::Unknown {
        warn!(user_id, user_role = %user.user_role, "unmapped role in store");
        return Err(AuthError::WrongUserRole);
    }

    Ok(user)
}

pub async fn update_password(
    db: &PgPool,
    user_id: i64,
    new_password: &str,
) -> Result<(), AuthError> {
    if user_id == 0 {
        return Err(AuthError::EmptyUserId);
    }
    if !validate_password(new_password) {
        return Err(AuthError::BadPassword);
    }

    let passhash = hash_password(new_password).map_err(|_| AuthError::Hash)?;
    User::update_password(db, user_id, &passhash).await?;
    debug!(user_id, "password updated");
    Ok(())
}

pub async fn update_user(
    db: &PgPool,
    new_full_name: &str,
    new_phone: &str,
    new_email: &str,
    user_id: i64,
) -> Result<(), AuthError> {
    if new_full_name.is_empty() {
        return Err(AuthError::EmptyName);
    }
    if new_phone.is_empty() {
        return Err(AuthError::EmptyPhone);
    }
    if new_email.is_empty() {
        return Err(AuthError::EmptyEmail);
    }
    if user_id == 0 {
        return Err(AuthError::EmptyUserId);
    }

    User::update_profile(db, new_full_name, new_phone, new_email, user_id).await?;
    debug!(user_id, "profile updated");
    Ok(())
}

pub async fn delete_user(db: &PgPool, user_id: i64) -> Result<(), AuthError> {
    if user_id == 0 {
        return Err(AuthError::EmptyUserId);
    }
    User::set_deleted(db, user_id, true).await?;
    debug!(user_id, "user soft-deleted");
    Ok(())
}

pub async fn restore_user(db: &PgPool, user_id: i64) -> Result<(), AuthError> {
    if user_id == 0 {
        return Err(AuthError::EmptyUserId);
    }
    User::set_deleted(db, user_id, false).await?;
    debug!(user_id, "user restored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn make_user(passhash: &str) -> User {
        User {
            id: 3,
            full_name: "Jane Doe".into(),
            passhash: passhash.into(),
            phone: "+1555".into(),
            email: "jane@x.com".into(),
            user_role: "jobseeker".into(),
            deleted: false,
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("jane@x.com"));
        assert!(!is_valid_email("jane@x"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[test]
    fn authenticate_accepts_correct_password() {
        let hash = hash_password("S7!long-pass").unwrap();
        let user = make_user(&hash);
        assert!(authenticate(&user, "S7!long-pass").is_ok());
    }

    #[test]
    fn authenticate_rejects_wrong_password() {
        let hash = hash_password("S7!long-pass").unwrap();
        let user = make_user(&hash);
        assert!(matches!(
            authenticate(&user, "other-pass"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn authenticate_hides_malformed_hash() {
        let user = make_user("not-a-hash");
        assert!(matches!(
            authenticate(&user, "whatever"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    // Field validation fires before any store access, so the fake state's
    // lazily connecting pool is never touched.

    #[tokio::test]
    async fn register_rejects_weak_password_before_store() {
        let state = AppState::fake();
        let err = register_user(&state.db, "Jane", "weak", "+1555", "jane@x.com", "jobseeker")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BadPassword));
    }

    #[tokio::test]
    async fn register_rejects_empty_fields() {
        let state = AppState::fake();
        assert!(matches!(
            register_user(&state.db, "", "S7!long-pass", "+1555", "jane@x.com", "jobseeker")
                .await
                .unwrap_err(),
            AuthError::EmptyName
        ));
        assert!(matches!(
            register_user(&state.db, "Jane", "S7!long-pass", "", "jane@x.com", "jobseeker")
                .await
                .unwrap_err(),
            AuthError::EmptyPhone
        ));
        assert!(matches!(
            register_user(&state.db, "Jane", "S7!long-pass", "+1555", "", "jobseeker")
                .await
                .unwrap_err(),
            AuthError::EmptyEmail
        ));
        assert!(matches!(
            register_user(&state.db, "Jane", "S7!long-pass", "+1555", "bad-email", "jobseeker")
                .await
                .unwrap_err(),
            AuthError::InvalidEmail
        ));
    }

    #[tokio::test]
    async fn zero_user_id_is_rejected_everywhere() {
        let state = AppState::fake();
        assert!(matches!(
            user_by_user_id(&state.db, 0).await.unwrap_err(),
            AuthError::EmptyUserId
        ));
        assert!(matches!(
            update_password(&state.db, 0, "S7!long-pass").await.unwrap_err(),
            AuthError::EmptyUserId
        ));
        assert!(matches!(
            update_user(&state.db, "Jane", "+1555", "jane@x.com", 0)
                .await
                .unwrap_err(),
            AuthError::EmptyUserId
        ));
        assert!(matches!(
            delete_user(&state.db, 0).await.unwrap_err(),
            AuthError::EmptyUserId
        ));
        assert!(matches!(
            restore_user(&state.db, 0).await.unwrap_err(),
            AuthError::EmptyUserId
        ));
    }

    #[tokio::test]
    async fn empty_contact_info_is_rejected() {
        let state = AppState::fake();
        assert!(matches!(
            user_by_contact_info(&state.db, "").await.unwrap_err(),
            AuthError::EmptyContact
        ));
    }

    #[tokio::test]
    async fn update_password_validates_before_store() {
        let state = AppState::fake();
        assert!(matches!(
            update_password(&state.db, 3, "weak").await.unwrap_err(),
            AuthError::BadPassword
        ));
    }

    #[tokio::test]
    async fn update_user_rejects_empty_fields() {
        let state = AppState::fake();
        assert!(matches!(
            update_user(&state.db, "", "+1555", "jane@x.com", 3)
                .await
                .unwrap_err(),
            AuthError::EmptyName
        ));
        assert!(matches!(
            update_user(&state.db, "Jane", "", "jane@x.com", 3)
                .await
                .unwrap_err(),
            AuthError::EmptyPhone
        ));
        assert!(matches!(
            update_user(&state.db, "Jane", "+1555", "", 3).await.unwrap_err(),
            AuthError::EmptyEmail
        ));
    }
}
