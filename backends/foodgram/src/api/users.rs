use crate::error::AppResult;
use crate::models::user::{User, UserId};
use crate::pagination::{PageParams, Paginated};
use crate::utils::auth::{authenticate, Auth};
use crate::AppState;
use actix::Message;
use actix_web::web::{self, Query};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use futures::{FutureExt, TryFutureExt};
use serde::{Deserialize, Serialize};

use super::recipes::ShortRecipeResponse;

// ================================== Extractors ================================== //

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Truncates the embedded recipe list of every author
    pub recipes_limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscribeParams {
    pub recipes_limit: Option<i64>,
}

// ================================== Client Messages ================================== //

#[derive(Debug, Message)]
#[rtype(result = "AppResult<UserResponse>")]
pub struct GetUser {
    // auth is option in case authentication fails or isn't present
    pub auth: Option<Auth>,
    pub user_id: UserId,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<SubscriptionResponse>")]
pub struct FollowAuthor {
    pub auth: Auth,
    pub author_id: UserId,
    pub recipes_limit: Option<i64>,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<()>")]
pub struct UnfollowAuthor {
    pub auth: Auth,
    pub author_id: UserId,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<SubscriptionListResponse>")]
pub struct GetSubscriptions {
    pub auth: Auth,
    pub page: PageParams,
    pub recipes_limit: Option<i64>,
}

// ================================== JSON response objects ================================== //

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            is_subscribed,
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// A followed author together with their recipes.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub author: UserResponse,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: i64,
}

pub type SubscriptionListResponse = Paginated<SubscriptionResponse>;

// ================================== Handlers ================================== //

pub async fn get_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    user_id: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    let db = &state.db;

    Ok(authenticate(&state, &req)
        .then(|auth| async move {
            db.send(GetUser {
                auth: auth.ok(),
                user_id: user_id.into_inner(),
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(res) => HttpResponse::Ok().json(res),
        })
        .await)
}

pub async fn get_current_user(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let auth = authenticate(&state, &req).await?;

    Ok(HttpResponse::Ok().json(UserResponse::new(auth.user, false)))
}

pub async fn get_subscriptions(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: Query<SubscriptionParams>,
) -> AppResult<HttpResponse> {
    let db = &state.db;
    let params = params.into_inner();

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move {
            db.send(GetSubscriptions {
                auth,
                page: PageParams {
                    page: params.page,
                    limit: params.limit,
                },
                recipes_limit: params.recipes_limit,
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(res) => HttpResponse::Ok().json(res),
        })
        .await)
}

pub async fn subscribe(
    req: HttpRequest,
    state: web::Data<AppState>,
    author_id: web::Path<UserId>,
    params: Query<SubscribeParams>,
) -> AppResult<HttpResponse> {
    let db = &state.db;

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move {
            db.send(FollowAuthor {
                auth,
                author_id: author_id.into_inner(),
                recipes_limit: params.recipes_limit,
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(res) => HttpResponse::Created().json(res),
        })
        .await)
}

pub async fn unsubscribe(
    req: HttpRequest,
    state: web::Data<AppState>,
    author_id: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    let db = &state.db;

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move {
            db.send(UnfollowAuthor {
                auth,
                author_id: author_id.into_inner(),
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(()) => HttpResponse::NoContent().finish(),
        })
        .await)
}
