use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    error::{store_error, ApiError},
    state::AppState,
    tree::repo::{self, TreeNode},
};

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub success: bool,
    pub count: usize,
    pub tree: Vec<TreeNode>,
}

pub fn tree_routes() -> Router<AppState> {
    Router::new().route("/tree", get(get_tree))
}

#[instrument(skip(state))]
pub async fn get_tree(
    State(state): State<AppState>,
) -> Result<Json<TreeResponse>, ApiError> {
    let tree = repo::build_tree(&state.db).await.map_err(store_error)?;
    Ok(Json(TreeResponse {
        success: true,
        count: tree.len(),
        tree,
    }))
}
