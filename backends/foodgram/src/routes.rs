use crate::api::{ingredients, recipes, tags, users};
use crate::error::AppError;
use actix_web::{web, HttpResponse, ResponseError};

pub fn routes() -> impl actix_web::dev::HttpServiceFactory {
    web::scope("/api")
        // User routes ↓
        .service(web::resource("users/me").route(web::get().to(users::get_current_user)))
        .service(
            web::resource("users/subscriptions").route(web::get().to(users::get_subscriptions)),
        )
        .service(web::resource("users/{id}").route(web::get().to(users::get_user)))
        .service(
            web::resource("users/{id}/subscribe")
                .route(web::post().to(users::subscribe))
                .route(web::delete().to(users::unsubscribe)),
        )
        // Recipe routes ↓
        .service(
            web::resource("recipes")
                .route(web::get().to(recipes::get_recipes))
                .route(web::post().to(recipes::create_recipe)),
        )
        .service(
            web::resource("recipes/download_shopping_cart")
                .route(web::get().to(recipes::download_shopping_cart)),
        )
        .service(
            web::resource("recipes/{id}")
                .route(web::get().to(recipes::get_recipe))
                .route(web::put().to(recipes::update_recipe))
                .route(web::patch().to(recipes::update_recipe))
                .route(web::delete().to(recipes::delete_recipe)),
        )
        .service(
            web::resource("recipes/{id}/favorite")
                .route(web::post().to(recipes::favorite_recipe))
                .route(web::delete().to(recipes::unfavorite_recipe)),
        )
        .service(
            web::resource("recipes/{id}/shopping_cart")
                .route(web::post().to(recipes::add_to_shopping_cart))
                .route(web::delete().to(recipes::remove_from_shopping_cart)),
        )
        // Catalog routes ↓
        .service(web::resource("tags").route(web::get().to(tags::get_tags)))
        .service(web::resource("tags/{id}").route(web::get().to(tags::get_tag)))
        .service(web::resource("ingredients").route(web::get().to(ingredients::get_ingredients)))
        .service(
            web::resource("ingredients/{id}").route(web::get().to(ingredients::get_ingredient)),
        )
        .default_service(web::to(not_found))
}

pub async fn not_found() -> HttpResponse {
    AppError::not_found("Resource not found").error_response()
}
