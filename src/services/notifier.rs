use governor::{
    clock::DefaultClock, state::direct::NotKeyed, state::InMemoryState, Quota, RateLimiter,
};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::entities::print_job::JobStatus;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Event published to the notification bus after a committed transition.
/// Customer fan-out (email/SMS) is owned by whatever sits behind the webhook.
#[derive(Debug, Serialize)]
struct StatusChangedEvent<'a> {
    job_id: Uuid,
    status: &'a str,
    customer_email: &'a str,
}

#[derive(Clone)]
pub struct Notifier {
    client: Client,
    webhook_url: Option<String>,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(nonzero!(5u32))));

        Self {
            client,
            webhook_url,
            rate_limiter,
        }
    }

    /// Post-commit, best-effort. Failures are logged and dropped; the job
    /// endpoints never surface them.
    pub async fn publish_status_changed(
        &self,
        job_id: Uuid,
        status: JobStatus,
        customer_email: &str,
    ) {
        let url = match &self.webhook_url {
            Some(url) => url,
            None => {
                tracing::debug!(
                    "notification webhook not configured, dropping event for job {}",
                    job_id
                );
                return;
            }
        };

        self.rate_limiter.until_ready().await;

        let event = StatusChangedEvent {
            job_id,
            status: status.as_str(),
            customer_email,
        };

        match self.client.post(url).json(&event).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(
                    "published status change for job {} ({})",
                    job_id,
                    status.as_str()
                );
            }
            Ok(response) => {
                tracing::warn!(
                    "notification webhook returned {} for job {}",
                    response.status(),
                    job_id
                );
            }
            Err(err) => {
                tracing::warn!("failed to publish status change for job {}: {}", job_id, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_status_changed_event_to_webhook() {
        let server = MockServer::start().await;
        let job_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/notify"))
            .and(body_json(json!({
                "job_id": job_id,
                "status": "completed",
                "customer_email": "a@b.com",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Notifier::new(Some(format!("{}/notify", server.uri())));
        notifier
            .publish_status_changed(job_id, JobStatus::Completed, "a@b.com")
            .await;
    }

    #[tokio::test]
    async fn unconfigured_webhook_drops_event() {
        let notifier = Notifier::new(None);
        notifier
            .publish_status_changed(Uuid::new_v4(), JobStatus::Printing, "a@b.com")
            .await;
    }

    #[tokio::test]
    async fn webhook_failure_is_swallowed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = Notifier::new(Some(server.uri()));
        notifier
            .publish_status_changed(Uuid::new_v4(), JobStatus::Failed, "a@b.com")
            .await;
    }
}
