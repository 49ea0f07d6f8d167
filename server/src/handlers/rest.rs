/// REST API handlers for HTTP endpoints.
/// Handles registration, login, statistics storage and the liveness/health checks.

use super::error::ApiError;
use crate::db::models::*;
use crate::state::{AppState, StoreHealth};
use actix_web::{web, HttpResponse};

const MISSING_CREDENTIALS: &str = "Missing username or password";
const MISSING_STATISTICS: &str = "Missing userName, goodAnswers or wrongAnswers";
const MISSING_USER_PARAM: &str = "Missing userName parameter";

/// A present, non-blank string field
fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::Validation(message.to_string())),
    }
}

fn credentials(req: CredentialsRequest) -> Result<(String, String), ApiError> {
    let username = required(req.username, MISSING_CREDENTIALS)?;
    // Passwords are not trimmed; only absence or "" counts as missing
    match req.password {
        Some(password) if !password.is_empty() => Ok((username, password)),
        _ => Err(ApiError::Validation(MISSING_CREDENTIALS.to_string())),
    }
}

/// Register a new user
/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, ApiError> {
    let (username, password) = credentials(req.into_inner())?;
    let store = state.store()?;

    store.create(&username, &password).await.map_err(|e| {
        log::info!("Registration of {} rejected: {}", username, e);
        e
    })?;

    log::info!("Registered user {}", username);
    Ok(HttpResponse::Created().json(MessageResponse::new("User registered successfully")))
}

/// Check a username/password pair
/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, ApiError> {
    let (username, password) = credentials(req.into_inner())?;
    let store = state.store()?;

    store.verify(&username, &password).await.map_err(|e| {
        log::info!("Login for {} failed: {}", username, e);
        e
    })?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Login successful")))
}

/// Append one quiz result to a user's statistics
/// POST /save-statistics
pub async fn save_statistics(
    state: web::Data<AppState>,
    req: web::Json<SaveStatisticsRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let username = required(req.user_name, MISSING_STATISTICS)?;
    let (Some(good_answers), Some(wrong_answers)) = (req.good_answers, req.wrong_answers) else {
        return Err(ApiError::Validation(MISSING_STATISTICS.to_string()));
    };

    let store = state.store()?;
    let entry = StatEntry::new(good_answers, wrong_answers, req.time_stamp);
    store.append_statistic(&username, entry).await?;

    Ok(HttpResponse::Created().json(MessageResponse::new("Statistics saved")))
}

/// All statistics of a user, oldest first
/// GET /get-statistics?userName=
pub async fn get_statistics(
    state: web::Data<AppState>,
    query: web::Query<StatisticsQuery>,
) -> Result<HttpResponse, ApiError> {
    let username = required(query.into_inner().user_name, MISSING_USER_PARAM)?;
    let store = state.store()?;

    let statistics = store.get_statistics(&username).await?;
    Ok(HttpResponse::Ok().json(StatisticsResponse { statistics }))
}

/// GET /users
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users = state.store()?.list_usernames().await?;
    Ok(HttpResponse::Ok().json(UsersResponse { users }))
}

/// Health check endpoint
/// GET /health
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.health().await {
        StoreHealth::Connected => HttpResponse::Ok().json(HealthResponse {
            status: "healthy".to_string(),
            database: "connected".to_string(),
        }),
        StoreHealth::Disconnected => HttpResponse::ServiceUnavailable().json(HealthResponse {
            status: "unhealthy".to_string(),
            database: "disconnected".to_string(),
        }),
    }
}

/// Liveness check, independent of the store
/// GET /
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Backend is running")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(None, "missing").is_err());
        assert!(required(Some(String::new()), "missing").is_err());
        assert!(required(Some("  ".to_string()), "missing").is_err());
        assert_eq!(required(Some("alice".into()), "missing").unwrap(), "alice");
    }

    #[test]
    fn test_credentials_requires_both_fields() {
        let only_user = CredentialsRequest {
            username: Some("alice".into()),
            password: None,
        };
        match credentials(only_user) {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, MISSING_CREDENTIALS),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
