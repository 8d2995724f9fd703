use axum::{Router, routing::get};

use crate::db::DirectoryStorage;
use crate::handlers::directory::{add_entry, add_page, search_entries, search_page};
use crate::service::DirectoryService;

#[derive(Clone)]
pub struct DirectoryState {
    pub directory: DirectoryService,
}

impl DirectoryState {
    pub fn new(storage: DirectoryStorage) -> Self {
        Self {
            directory: DirectoryService::new(storage),
        }
    }
}

pub fn directory_router(state: DirectoryState) -> Router {
    Router::new()
        .route("/", get(search_page).post(search_entries))
        .route("/add", get(add_page).post(add_entry))
        .with_state(state)
}
