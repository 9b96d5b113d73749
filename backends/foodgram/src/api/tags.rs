use crate::error::AppResult;
use crate::models::tag::Tag;
use crate::AppState;
use actix::Message;
use actix_web::web::{self};
use actix_web::{HttpResponse, ResponseError};

// ================================== Client Messages ================================== //
#[derive(Debug, Message)]
#[rtype(result = "AppResult<Vec<Tag>>")]
pub struct GetTags;

#[derive(Debug, Message)]
#[rtype(result = "AppResult<Tag>")]
pub struct GetTag {
    pub tag_id: i32,
}

// ================================== Handlers ================================== //

pub async fn get_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(state.db.send(GetTags).await.map(|res| match res {
        Err(e) => e.error_response(),
        Ok(res) => HttpResponse::Ok().json(res),
    })?)
}

pub async fn get_tag(
    state: web::Data<AppState>,
    tag_id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let msg = GetTag {
        tag_id: tag_id.into_inner(),
    };

    Ok(state.db.send(msg).await.map(|res| match res {
        Err(e) => e.error_response(),
        Ok(res) => HttpResponse::Ok().json(res),
    })?)
}
