use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::engine::{Engine, PresentationState, SearchOutcome};
use crate::entities::Restaurant;
use crate::error::{unexpected_error, Error};

#[derive(Serialize, Deserialize)]
pub struct SearchParams {
    keyword: Option<String>,
}

pub async fn state(Extension(engine): Extension<Engine>) -> Json<PresentationState> {
    engine.presentation().snapshot().into()
}

pub async fn list(Extension(engine): Extension<Engine>) -> Json<Vec<Restaurant>> {
    engine.presentation().snapshot().restaurants.into()
}

/// Runs a keyword search and answers with the list on display afterwards.
pub async fn search(
    Extension(engine): Extension<Engine>,
    Json(params): Json<SearchParams>,
) -> Result<Json<Vec<Restaurant>>, Error> {
    let outcome = engine
        .search_keyword(params.keyword)
        .await
        .map_err(|_| unexpected_error())??;

    if let SearchOutcome::Failed { error, .. } = outcome {
        return Err(error.into());
    }

    Ok(engine.presentation().snapshot().restaurants.into())
}
