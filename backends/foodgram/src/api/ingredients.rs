use crate::error::AppResult;
use crate::models::ingredient::Ingredient;
use crate::AppState;
use actix::Message;
use actix_web::web::{self, Query};
use actix_web::{HttpResponse, ResponseError};
use serde::Deserialize;

// ================================== Extractors ================================== //

#[derive(Debug, Default, Deserialize)]
pub struct IngredientParams {
    pub name: Option<String>,
    pub search: Option<String>,
}

impl IngredientParams {
    /// The name prefix to search for; `name` wins over `search`.
    pub fn prefix(self) -> Option<String> {
        self.name
            .or(self.search)
            .map(|prefix| prefix.trim().to_owned())
            .filter(|prefix| !prefix.is_empty())
    }
}

// ================================== Client Messages ================================== //

#[derive(Debug, Message)]
#[rtype(result = "AppResult<Vec<Ingredient>>")]
pub struct SearchIngredients {
    pub prefix: Option<String>,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<Ingredient>")]
pub struct GetIngredient {
    pub ingredient_id: i32,
}

// ================================== Handlers ================================== //

pub async fn get_ingredients(
    state: web::Data<AppState>,
    params: Query<IngredientParams>,
) -> AppResult<HttpResponse> {
    let msg = SearchIngredients {
        prefix: params.into_inner().prefix(),
    };

    Ok(state.db.send(msg).await.map(|res| match res {
        Err(e) => e.error_response(),
        Ok(res) => HttpResponse::Ok().json(res),
    })?)
}

pub async fn get_ingredient(
    state: web::Data<AppState>,
    ingredient_id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let msg = GetIngredient {
        ingredient_id: ingredient_id.into_inner(),
    };

    Ok(state.db.send(msg).await.map(|res| match res {
        Err(e) => e.error_response(),
        Ok(res) => HttpResponse::Ok().json(res),
    })?)
}
