use std::str::FromStr;

use crate::db::RecipeRelation;
use crate::error::{AppError, AppResult};
use crate::models::ingredient::Ingredient;
use crate::models::recipe::Recipe;
use crate::models::tag::Tag;
use crate::models::user::UserId;
use crate::pagination::{PageParams, Paginated};
use crate::shopping_list::{self, ShoppingList};
use crate::utils::{authenticate, Auth, ImageField};
use crate::AppState;
use actix::Message;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{self, Json, Query};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use futures::{FutureExt, TryFutureExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::users::UserResponse;

// ================================== Extractors ================================== //

/// Listing filters. Repeated `tags` values match recipes carrying any of them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeFilter {
    pub fn from_query(pairs: Vec<(String, String)>) -> AppResult<(Self, PageParams)> {
        let mut filter = Self::default();
        let mut page = PageParams::default();

        for (key, value) in pairs {
            match key.as_str() {
                "author" => filter.author = Some(parse_number("author", &value)?),
                "tags" if !value.is_empty() && !filter.tags.contains(&value) => {
                    filter.tags.push(value)
                }
                "is_favorited" => filter.is_favorited = parse_flag("is_favorited", &value)?,
                "is_in_shopping_cart" => {
                    filter.is_in_shopping_cart = parse_flag("is_in_shopping_cart", &value)?
                }
                "page" => page.page = Some(parse_number("page", &value)?),
                "limit" => page.limit = Some(parse_number("limit", &value)?),
                _ => {}
            }
        }

        Ok((filter, page))
    }
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> AppResult<T> {
    value
        .parse()
        .map_err(|_| AppError::validation(field, "must be a whole number"))
}

fn parse_flag(field: &str, value: &str) -> AppResult<bool> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(AppError::validation(field, "must be 0 or 1")),
    }
}

// ================================== Client Messages ================================== //

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeData {
    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters long"))]
    pub name: String,
    #[validate(length(min = 1, message = "text can't be blank"))]
    pub text: String,
    pub image: String,
    #[validate(range(min = 1, max = 32000, message = "cooking time must be between 1 and 32000"))]
    pub cooking_time: i32,
    #[validate(length(min = 1, message = "at least one tag is required"))]
    pub tags: Vec<i32>,
    #[validate(length(min = 1, message = "at least one ingredient is required"))]
    pub ingredients: Vec<IngredientAmount>,
}

/// Scalar fields are optional; `tags` and `ingredients` always replace the
/// current sets in full.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipeData {
    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters long"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "text can't be blank"))]
    pub text: Option<String>,
    pub image: Option<String>,
    #[validate(range(min = 1, max = 32000, message = "cooking time must be between 1 and 32000"))]
    pub cooking_time: Option<i32>,
    #[validate(length(min = 1, message = "at least one tag is required"))]
    pub tags: Vec<i32>,
    #[validate(length(min = 1, message = "at least one ingredient is required"))]
    pub ingredients: Vec<IngredientAmount>,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<RecipeResponse>")]
pub struct CreateRecipe {
    pub auth: Auth,
    pub recipe: CreateRecipeData,
    pub image: ImageField,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<RecipeResponse>")]
pub struct UpdateRecipe {
    pub auth: Auth,
    pub recipe_id: i32,
    pub recipe: UpdateRecipeData,
    pub image: Option<ImageField>,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<()>")]
pub struct DeleteRecipe {
    pub auth: Auth,
    pub recipe_id: i32,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<RecipeResponse>")]
pub struct GetRecipe {
    // auth is option in case authentication fails or isn't present
    pub auth: Option<Auth>,
    pub recipe_id: i32,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<RecipeListResponse>")]
pub struct GetRecipes {
    pub auth: Option<Auth>,
    pub filter: RecipeFilter,
    pub page: PageParams,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<ShortRecipeResponse>")]
pub struct AddToRelation {
    pub auth: Auth,
    pub relation: RecipeRelation,
    pub recipe_id: i32,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<()>")]
pub struct RemoveFromRelation {
    pub auth: Auth,
    pub relation: RecipeRelation,
    pub recipe_id: i32,
}

#[derive(Debug, Message)]
#[rtype(result = "AppResult<ShoppingList>")]
pub struct DownloadShoppingList {
    pub auth: Auth,
}

// ================================== JSON response objects ================================== //

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl RecipeIngredientResponse {
    pub fn new(ingredient: Ingredient, amount: i32) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
            amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<Tag>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

pub type RecipeListResponse = Paginated<RecipeResponse>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortRecipeResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<Recipe> for ShortRecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

// ================================== Handlers ================================== //

pub async fn get_recipes(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: Query<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let db = &state.db;
    let (filter, page) = RecipeFilter::from_query(query.into_inner())?;

    Ok(authenticate(&state, &req)
        .then(|auth| async move {
            db.send(GetRecipes {
                auth: auth.ok(),
                filter,
                page,
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(res) => HttpResponse::Ok().json(res),
        })
        .await)
}

pub async fn create_recipe(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Json<CreateRecipeData>,
) -> AppResult<HttpResponse> {
    let db = &state.db;
    let recipe = form.into_inner();

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move {
            recipe.validate()?;
            let image = ImageField::parse(&recipe.image)?;

            db.send(CreateRecipe {
                auth,
                recipe,
                image,
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(res) => HttpResponse::Created().json(res),
        })
        .await)
}

pub async fn get_recipe(
    req: HttpRequest,
    recipe_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let db = &state.db;

    Ok(authenticate(&state, &req)
        .then(|auth| async move {
            db.send(GetRecipe {
                auth: auth.ok(),
                recipe_id: recipe_id.into_inner(),
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(res) => HttpResponse::Ok().json(res),
        })
        .await)
}

pub async fn update_recipe(
    req: HttpRequest,
    recipe_id: web::Path<i32>,
    state: web::Data<AppState>,
    form: Json<UpdateRecipeData>,
) -> AppResult<HttpResponse> {
    let db = &state.db;
    let recipe = form.into_inner();

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move {
            recipe.validate()?;
            let image = recipe.image.as_deref().map(ImageField::parse).transpose()?;

            db.send(UpdateRecipe {
                auth,
                recipe,
                image,
                recipe_id: recipe_id.into_inner(),
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(res) => HttpResponse::Ok().json(res),
        })
        .await)
}

pub async fn delete_recipe(
    req: HttpRequest,
    recipe_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let db = &state.db;

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move {
            db.send(DeleteRecipe {
                auth,
                recipe_id: recipe_id.into_inner(),
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(()) => HttpResponse::NoContent().finish(),
        })
        .await)
}

async fn add_to_relation(
    req: HttpRequest,
    recipe_id: i32,
    state: web::Data<AppState>,
    relation: RecipeRelation,
) -> AppResult<HttpResponse> {
    let db = &state.db;

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move {
            db.send(AddToRelation {
                auth,
                relation,
                recipe_id,
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(res) => HttpResponse::Created().json(res),
        })
        .await)
}

async fn remove_from_relation(
    req: HttpRequest,
    recipe_id: i32,
    state: web::Data<AppState>,
    relation: RecipeRelation,
) -> AppResult<HttpResponse> {
    let db = &state.db;

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move {
            db.send(RemoveFromRelation {
                auth,
                relation,
                recipe_id,
            })
            .await?
        })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(()) => HttpResponse::NoContent().finish(),
        })
        .await)
}

pub async fn favorite_recipe(
    req: HttpRequest,
    recipe_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    add_to_relation(req, recipe_id.into_inner(), state, RecipeRelation::Favorite).await
}

pub async fn unfavorite_recipe(
    req: HttpRequest,
    recipe_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    remove_from_relation(req, recipe_id.into_inner(), state, RecipeRelation::Favorite).await
}

pub async fn add_to_shopping_cart(
    req: HttpRequest,
    recipe_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    add_to_relation(req, recipe_id.into_inner(), state, RecipeRelation::ShoppingCart).await
}

pub async fn remove_from_shopping_cart(
    req: HttpRequest,
    recipe_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    remove_from_relation(req, recipe_id.into_inner(), state, RecipeRelation::ShoppingCart).await
}

pub async fn download_shopping_cart(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let db = &state.db;

    Ok(authenticate(&state, &req)
        .and_then(|auth| async move { db.send(DownloadShoppingList { auth }).await? })
        .map(|res| match res {
            Err(e) => e.error_response(),
            Ok(list) => HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(
                        shopping_list::FILENAME.to_owned(),
                    )],
                })
                .body(list.render()),
        })
        .await)
}
