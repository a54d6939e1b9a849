//! Dataset HTTP Routes
//!
//! `GET /economic` and `GET /electricity`: compile the filters, query the
//! dataset's collection and reshape each document into a [`StatRecord`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::observability::Event;
use crate::query::Dataset;
use crate::records::{sanitize_floats, StatRecord};

use super::errors::{ApiError, ApiResult};
use super::params::DataQuery;
use super::server::AppState;

/// Create dataset routes
pub fn data_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/economic", get(economic_handler))
        .route("/electricity", get(electricity_handler))
}

async fn economic_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<StatRecord>>> {
    query_dataset(&state, Dataset::Economic, &params).await.map(Json)
}

async fn electricity_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<StatRecord>>> {
    query_dataset(&state, Dataset::Electricity, &params).await.map(Json)
}

/// Run one dataset query end to end
pub async fn query_dataset(
    state: &AppState,
    dataset: Dataset,
    params: &HashMap<String, String>,
) -> ApiResult<Vec<StatRecord>> {
    let query = DataQuery::parse(params)?;
    let plan = dataset.compiler().compile(&query.criteria);

    tracing::debug!(
        event = %Event::QueryCompiled,
        dataset = %dataset,
        clauses = plan.predicate().clauses().len(),
        year_fields = plan.projection().year_fields().len(),
        "Query compiled"
    );

    let documents = match state
        .database
        .find(dataset.collection(), &plan, &query.options)
        .await
    {
        Ok(documents) => documents,
        Err(e) => {
            tracing::error!(event = %Event::QueryFailed, dataset = %dataset, error = %e, "Query failed");
            state.metrics.increment_queries_failed();
            return Err(e.into());
        }
    };

    if documents.is_empty() {
        tracing::info!(event = %Event::QueryEmpty, dataset = %dataset, "No records found");
        state.metrics.increment_queries_empty();
        return Err(ApiError::NotFound);
    }

    let records = documents
        .into_iter()
        .map(|mut doc| {
            sanitize_floats(&mut doc);
            StatRecord::from_document(doc)
        })
        .collect::<Result<Vec<_>, _>>();

    let records = match records {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(event = %Event::QueryFailed, dataset = %dataset, error = %e, "Malformed record");
            state.metrics.increment_queries_failed();
            return Err(e.into());
        }
    };

    tracing::info!(
        event = %Event::QueryExecuted,
        dataset = %dataset,
        returned = records.len(),
        skip = query.options.skip,
        limit = query.options.limit,
        "Query complete"
    );
    state.metrics.increment_queries_executed();

    Ok(records)
}
