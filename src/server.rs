//! HTTP routes.

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::sync::Arc;
use winboxget_cache::error::ErrorKind as CacheErrorKind;
use winboxget_cache::Resolver;
use winboxget_counter::VisitCounter;
use winboxget_extract::models::ResourceKey;
use winboxget_render::IndexPage;

pub struct AppState {
    pub resolver: Resolver,
    pub counter: VisitCounter,
    pub index: IndexPage,
}

/// One redirect route per [`ResourceKey`], plus the index page and the visit
/// counter.
pub fn router(state: Arc<AppState>) -> Router {
    ResourceKey::ALL
        .into_iter()
        .fold(Router::<Arc<AppState>>::new(), |router, key| {
            router.route(
                key.route(),
                get(move |State(state): State<Arc<AppState>>| async move { redirect(&state, key).await }),
            )
        })
        .route("/", get(index))
        .route("/counter", get(counter))
        .with_state(state)
}

async fn redirect(state: &AppState, key: ResourceKey) -> Response {
    match state.resolver.resolve(key).await {
        Ok(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
        Err(err) => match &*err {
            CacheErrorKind::KeyNotAvailable(_) => {
                tracing::info!(%key, "download not listed upstream");
                (StatusCode::NOT_FOUND, format!("{} is not currently available", key.label())).into_response()
            },
            kind => {
                tracing::error!(%key, error = ?err, "could not resolve download link");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to fetch Winbox: {kind}")).into_response()
            },
        },
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Response {
    // Versions are read from the cache; make sure it has something in it.
    state.resolver.prime().await;
    let resources = state.resolver.cache().snapshot().await;
    match state.index.render(&resources) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(error = ?err, "could not render index page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        },
    }
}

async fn counter(State(state): State<Arc<AppState>>) -> String {
    state.counter.increment().await.to_string()
}
