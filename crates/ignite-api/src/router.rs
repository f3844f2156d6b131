use axum::{
    Router,
    routing::{MethodRouter, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{admin, auth, categories, comments, ideas, votes};

/// Full HTTP surface under `/api`, with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me));

    let idea_routes = Router::new()
        .route("/api/ideas/{id}", get(ideas::get_idea).delete(ideas::delete_idea))
        .route(
            "/api/ideas/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/api/ideas/{id}/vote", post(votes::cast_vote))
        .route("/api/ideas/{id}/status", post(ideas::set_status));

    let admin_routes = Router::new()
        .route(
            "/api/admin/categories/{id}",
            get(categories::get_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/api/admin/users/{id}",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::delete_user),
        );

    let collections = [
        ("/api/categories", get(categories::public_categories)),
        ("/api/ideas/categories", get(categories::public_categories)),
        ("/api/ideas", get(ideas::list_ideas).post(ideas::create_idea)),
        (
            "/api/admin/categories",
            get(categories::list_categories).post(categories::create_category),
        ),
        ("/api/admin/users", get(admin::list_users)),
    ];

    collections
        .into_iter()
        .fold(Router::new(), with_trailing_slash)
        .merge(auth_routes)
        .merge(idea_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Collection routes answer both `/path` and `/path/`.
fn with_trailing_slash(
    router: Router<AppState>,
    (path, handler): (&str, MethodRouter<AppState>),
) -> Router<AppState> {
    router
        .route(path, handler.clone())
        .route(&format!("{path}/"), handler)
}
