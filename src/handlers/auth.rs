use actix_web::{web, HttpResponse};

use crate::database::models::{CreateUserInput, LoginInput, UserInfo};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::AppState;

pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .register(request.into_inner())
        .await
        .map_err(|e| {
            log::warn!("Registration failed: {}", e);
            AppError::BadRequest(e.to_string())
        })?;

    Ok(HttpResponse::Created().json(ApiResponse::success(response)))
}

pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .login(request.into_inner())
        .await
        .map_err(|e| {
            log::warn!("Login failed: {}", e);
            AppError::Unauthorized
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

pub async fn me(claims: Claims, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user = state
        .auth_service
        .find_user(claims.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}
