
use crate::{app_builder, config::Config, AppState, EntryStore};
use axum::{body::Body, http::Response, Router};

pub const KEY: &str = "s3cr3t";

pub fn test_app(store: impl EntryStore + 'static) -> Router {
    let cfg = Config {
        api_key: String::from(KEY),
        ..Config::default()
    };
    app_builder(AppState::new(store, cfg).unwrap())
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
