mod records;
mod summary;
mod uploads;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/records", records::router())
        .nest("/summary", summary::router())
        .nest("/uploads", uploads::router())
}
