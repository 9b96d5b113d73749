use actix::SyncArbiter;
use actix_web::http::{header, StatusCode};
use actix_web::{middleware, test, web, App};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use serde_json::json;

use foodgram::db::DbExecutor;
use foodgram::routes::{not_found, routes};
use foodgram::utils::MediaStore;
use foodgram::AppState;

/// State whose pool never connects; only requests that fail before reaching
/// storage can be exercised with it.
fn offline_state() -> AppState {
    let manager = ConnectionManager::<PgConnection>::new("postgres://offline.invalid/foodgram");
    let pool = Pool::builder().build_unchecked(manager);
    let media = MediaStore::new(std::env::temp_dir().join("foodgram-api-tests"));

    let addr = SyncArbiter::start(1, move || DbExecutor::new(pool.clone(), media.clone(), 6));
    AppState::new(addr, "test-secret")
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(offline_state()))
                .wrap(middleware::NormalizePath::trim())
                .service(routes())
                .default_service(web::to(not_found)),
        )
        .await
    };
}

fn recipe_body() -> serde_json::Value {
    json!({
        "name": "Pancakes",
        "text": "Mix and fry",
        "image": "data:image/png;base64,aGVsbG8=",
        "cooking_time": 15,
        "tags": [1],
        "ingredients": [{ "id": 1, "amount": 200 }],
    })
}

#[actix_web::test]
async fn unknown_routes_are_json_404() {
    let app = app!();

    for uri in ["/api/nowhere", "/elsewhere"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body.get("errors").is_some());
    }
}

#[actix_web::test]
async fn mutations_require_a_token() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/recipes/")
        .set_json(recipe_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/api/users/me/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post().uri("/api/recipes/1/favorite/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn tokens_with_a_foreign_signature_are_rejected() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart/")
        .insert_header((header::AUTHORIZATION, "Token not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/users/subscriptions/")
        .insert_header((header::AUTHORIZATION, "Bearer whatever"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn recipe_updates_accept_put_and_patch() {
    let app = app!();

    for req in [
        test::TestRequest::put(),
        test::TestRequest::patch(),
    ] {
        let req = req.uri("/api/recipes/1/").set_json(recipe_body()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn anonymous_clients_are_rejected_before_the_body_is_checked() {
    let app = app!();

    let mut body = recipe_body();
    body["cooking_time"] = json!(0);
    body["image"] = json!("data:image/png;base64,***");

    let req = test::TestRequest::post()
        .uri("/api/recipes/")
        .set_json(body.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri("/api/recipes/1/")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn malformed_filters_are_a_bad_request() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri("/api/recipes/?is_favorited=maybe")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
