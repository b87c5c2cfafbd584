//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use shared::ErrorCode;

/// 无需登录即可访问的路由
///
/// - 非 `/api/` 路径 (`/health`、404)
/// - 商品目录只读接口: `GET /api/categories*`、`GET /api/products*`
pub fn is_public_route(method: &Method, path: &str) -> bool {
    if !path.starts_with("/api/") {
        return true;
    }
    method == Method::GET
        && (path == "/api/categories"
            || path.starts_with("/api/categories/")
            || path == "/api/products"
            || path.starts_with("/api/products/"))
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 再从数据库加载用户 (账号必须存在且启用)。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 错误处理
///
/// | 错误 | 错误码 |
/// |------|------------|
/// | 无 Authorization 头 | NotAuthenticated |
/// | 令牌过期 | TokenExpired |
/// | 无效令牌 / 用户不存在 | TokenInvalid |
/// | 账号已停用 | AccountDisabled |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检的 OPTIONS 请求
    if req.method() == Method::OPTIONS || is_public_route(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            return Err(match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            });
        }
    };

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed JWT subject"))?;

    let account = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| {
            security_log!("WARN", "auth_unknown_user", user_id = user_id);
            AppError::invalid_token("Unknown user")
        })?;

    if !account.is_active {
        security_log!("WARN", "account_disabled", user_id = user_id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    req.extensions_mut().insert(CurrentUser {
        id: account.id,
        name: account.name,
        role: account.role,
    });
    Ok(next.run(req).await)
}

/// 管理员中间件 - 要求管理员角色
///
/// 必须位于 [`require_auth`] 之后
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            uri = format!("{:?}", req.uri())
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}
