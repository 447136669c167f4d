//! Notify Route
//!
//! Boundary to the upstream notification mechanism: accepts a batch of
//! mutation records and runs the recorder once per record, independently
//! and in delivery order. Duplicate or re-delivered records are harmless;
//! the recorder recomputes the full aggregate either way.
//!
//! - POST /api/v1/notify

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{NotifyError, NotifyRecord, NotifyRequest, NotifyResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::recorder::MutationNotice;

/// POST /api/v1/notify
///
/// Record one sample per delivered mutation record.
pub async fn notify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NotifyRequest>,
) -> ApiResult<(StatusCode, Json<NotifyResponse>)> {
    if req.records.is_empty() {
        return Err(ApiError::Validation("Empty notification batch".to_string()));
    }

    if req.records.len() > state.config.max_notify_batch {
        return Err(ApiError::Validation(format!(
            "Batch size exceeds maximum of {} records",
            state.config.max_notify_batch
        )));
    }

    let mut recorded = 0;
    let mut errors = Vec::new();

    for (index, record) in req.records.iter().enumerate() {
        match process_record(&state, record).await {
            Ok(()) => recorded += 1,
            Err(e) => errors.push(NotifyError {
                index,
                error: e.to_string(),
            }),
        }
    }

    let status = if errors.is_empty() {
        StatusCode::CREATED
    } else if recorded > 0 {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let status_str = if errors.is_empty() { "ok" } else { "partial" };

    Ok((
        status,
        Json(NotifyResponse {
            status: status_str.to_string(),
            recorded,
            rejected: errors.len(),
            errors,
        }),
    ))
}

/// Validate and record a single notification
async fn process_record(state: &AppState, record: &NotifyRecord) -> ApiResult<()> {
    if record.bucket.is_empty() {
        return Err(ApiError::Validation("Bucket cannot be empty".to_string()));
    }

    let notice = MutationNotice::new(&record.bucket, &record.event);
    state.recorder.record_notice(&notice).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::ApiConfig;
    use crate::objects::MemoryObjectStore;
    use crate::storage::MemorySampleStore;

    fn test_state() -> (AppState, Arc<MemoryObjectStore>) {
        let objects = Arc::new(MemoryObjectStore::new());
        let samples = Arc::new(MemorySampleStore::new());
        let state = AppState::new(samples, Arc::clone(&objects) as _, ApiConfig::default());
        (state, objects)
    }

    #[tokio::test]
    async fn test_process_record_rejects_empty_bucket() {
        let (state, _) = test_state();
        let record = NotifyRecord {
            bucket: String::new(),
            event: "ObjectCreated:Put".to_string(),
        };

        let err = process_record(&state, &record).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_process_record_records_sample() {
        let (state, objects) = test_state();
        objects.put("b", "a.txt", vec![0u8; 18]);

        let record = NotifyRecord {
            bucket: "b".to_string(),
            event: "ObjectCreated:Put".to_string(),
        };
        process_record(&state, &record).await.unwrap();

        let page = state.samples.scan_page("b", 0, None).await.unwrap();
        assert_eq!(page.samples.len(), 1);
        assert_eq!(page.samples[0].total_size, 18);
    }
}
