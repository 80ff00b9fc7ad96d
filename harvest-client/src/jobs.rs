//! Job-related API endpoints

use crate::HarvestClient;
use crate::error::{ClientError, Result};
use harvest_core::domain::job::JobRecord;
use harvest_core::domain::request::JobRequest;
use harvest_core::dto::job::{JobList, SubmitJobResponse};
use std::time::Duration;

impl HarvestClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a collection job
    ///
    /// # Returns
    /// The pending job as admitted by the orchestrator
    ///
    /// # Example
    /// ```no_run
    /// # use harvest_client::HarvestClient;
    /// # use harvest_core::domain::request::{Backend, CollectionMode, JobRequest};
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = HarvestClient::new("http://localhost:8080");
    /// let mut request = JobRequest::new(Backend::Douyin, CollectionMode::Detail);
    /// request.note_ids = Some(vec!["7312345678901234567".to_string()]);
    /// let submitted = client.submit_job(&request).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_job(&self, request: &JobRequest) -> Result<SubmitJobResponse> {
        let mut body = serde_json::to_value(request)
            .map_err(|e| ClientError::ParseError(format!("Failed to encode request: {}", e)))?;
        // JobRequest never serializes its credentials, so they are attached here.
        if let Some(cookies) = &request.cookies {
            body["cookies"] = serde_json::Value::String(cookies.clone());
        }

        let response = self.client.post(self.url("/jobs")).json(&body).send().await?;

        self.handle_response(response).await
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: &str) -> Result<JobRecord> {
        let url = self.url(&format!("/jobs/{}", job_id));
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List all jobs the orchestrator still retains
    pub async fn list_jobs(&self) -> Result<JobList> {
        let response = self.client.get(self.url("/jobs")).send().await?;

        self.handle_response(response).await
    }

    /// Request cancellation of a pending or running job
    ///
    /// # Returns
    /// The job as it was when cancellation was requested
    pub async fn cancel_job(&self, job_id: &str) -> Result<JobRecord> {
        let url = self.url(&format!("/jobs/{}/cancel", job_id));
        let response = self.client.post(&url).send().await?;

        self.handle_response(response).await
    }

    /// Poll a job until it completes or fails
    ///
    /// # Arguments
    /// * `job_id` - The job to watch
    /// * `poll_interval` - Delay between status requests
    /// * `timeout` - Give up after this long with [`ClientError::Timeout`]
    pub async fn wait_for_job(
        &self,
        job_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<JobRecord> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let job = self.get_job(job_id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }

            if tokio::time::Instant::now() + poll_interval > deadline {
                return Err(ClientError::Timeout {
                    id: job.id,
                    status: job.status.to_string(),
                    waited: timeout,
                });
            }

            tracing::debug!("Job {} is {}, polling again", job_id, job.status);
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
    };
    use harvest_core::domain::job::JobStatus;
    use harvest_core::domain::request::{Backend, CollectionMode, LoginType};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Stub {
        polls: Arc<AtomicUsize>,
        last_body: Arc<Mutex<Option<Value>>>,
    }

    fn record(id: &str, status: JobStatus) -> JobRecord {
        let mut request = JobRequest::new(Backend::Xiaohongshu, CollectionMode::Search);
        request.keywords = Some("coffee".to_string());
        let mut record = JobRecord::pending(id.to_string(), request, chrono::Utc::now());
        record.status = status;
        record
    }

    async fn submit(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
        *stub.last_body.lock().unwrap() = Some(body);
        let pending = record("job_1", JobStatus::Pending);
        Json(json!({
            "id": pending.id,
            "status": pending.status,
            "message": pending.message,
            "created_at": pending.created_at,
        }))
    }

    async fn get_job(
        State(stub): State<Stub>,
        Path(id): Path<String>,
    ) -> std::result::Result<Json<JobRecord>, (StatusCode, Json<Value>)> {
        match id.as_str() {
            "job_1" => {
                let polls = stub.polls.fetch_add(1, Ordering::SeqCst);
                let status = if polls < 2 {
                    JobStatus::Running
                } else {
                    JobStatus::Completed
                };
                Ok(Json(record(&id, status)))
            }
            "job_stuck" => Ok(Json(record(&id, JobStatus::Running))),
            _ => Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("Job {} not found", id) })),
            )),
        }
    }

    async fn spawn_stub() -> (HarvestClient, Stub) {
        let stub = Stub::default();
        let app = Router::new()
            .route("/jobs", post(submit))
            .route("/jobs/{id}", get(get_job))
            .with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (HarvestClient::new(format!("http://{}", addr)), stub)
    }

    #[tokio::test]
    async fn test_submit_sends_credentials() {
        let (client, stub) = spawn_stub().await;

        let mut request = JobRequest::new(Backend::Xiaohongshu, CollectionMode::Search);
        request.keywords = Some("coffee".to_string());
        request.login_type = LoginType::Cookie;
        request.cookies = Some("a1=secret".to_string());

        let submitted = client.submit_job(&request).await.unwrap();
        assert_eq!(submitted.id, "job_1");
        assert_eq!(submitted.status, JobStatus::Pending);

        let body = stub.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["cookies"], "a1=secret");
        assert_eq!(body["backend"], "xhs");
    }

    #[tokio::test]
    async fn test_wait_for_job_polls_until_terminal() {
        let (client, stub) = spawn_stub().await;

        let job = client
            .wait_for_job("job_1", Duration::from_millis(5), Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(stub.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_for_job_times_out() {
        let (client, _) = spawn_stub().await;

        let err = client
            .wait_for_job("job_stuck", Duration::from_millis(10), Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let (client, _) = spawn_stub().await;

        let err = client.get_job("job_missing").await.unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("job_missing"));
    }
}
