//! Upload form submission

use reqwest::Url;
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use tripod_core::domain::job::JobId;
use tripod_core::domain::submission::{InputData, Submission};
use tripod_core::dto::job::JobTicket;

use crate::TripodClient;
use crate::error::{ClientError, Result};
use crate::error_message;

impl TripodClient {
    /// Submit the upload form and start a job
    ///
    /// The submission is validated locally first. The server answers with a
    /// redirect to `/progress/{id}?name={file}`; a JSON `JobTicket` body is
    /// accepted as well.
    ///
    /// # Arguments
    /// * `submission` - The form to submit
    ///
    /// # Returns
    /// A ticket carrying the job id to poll
    pub async fn submit(&self, submission: &Submission) -> Result<JobTicket> {
        submission
            .validate()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let form = build_form(submission).await?;

        let url = format!("{}/upload", self.base_url);
        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| {
                    ClientError::ParseError("Upload redirect carried no Location".to_string())
                })?;

            let (id, name) = progress_ticket(&self.base_url, location).ok_or_else(|| {
                ClientError::InvalidRequest(format!(
                    "Server rejected the submission (redirected to {})",
                    location
                ))
            })?;

            tracing::info!("Submitted job {}", id);
            return Ok(JobTicket::new(id, name.or_else(|| submission.file_name())));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(
                status.as_u16(),
                error_message(&error_text),
            ));
        }

        let ticket: JobTicket = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse job ticket: {}", e)))?;

        tracing::info!("Submitted job {}", ticket.id);
        Ok(ticket)
    }
}

async fn build_form(submission: &Submission) -> Result<Form> {
    let mut form = Form::new();

    if let InputData::Upload(path) = &submission.input {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClientError::InvalidRequest(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file_name = submission.file_name().unwrap_or_default();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/plain")?;
        form = form.part("file", part);
    }

    for (name, value) in submission.form_fields() {
        form = form.text(name, value);
    }

    Ok(form)
}

/// Extract the job id and file name from a `/progress/{id}?name=...` location
fn progress_ticket(base_url: &str, location: &str) -> Option<(JobId, Option<String>)> {
    let url = Url::parse(base_url).ok()?.join(location).ok()?;

    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == "progress")?;
    let id = JobId::new(segments.next()?).ok()?;

    let name = url
        .query_pairs()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    Some((id, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        extract::{Multipart, State},
        response::Redirect,
        routing::post,
    };
    use std::sync::{Arc, Mutex};
    use tripod_core::domain::submission::GenomeBuild;

    type Fields = Arc<Mutex<Vec<(String, String)>>>;

    async fn record_upload(State(fields): State<Fields>, mut multipart: Multipart) -> Redirect {
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let value = match field.file_name().map(str::to_string) {
                Some(file_name) => file_name,
                None => field.text().await.unwrap(),
            };
            fields.lock().unwrap().push((name, value));
        }

        Redirect::to("/progress/c0ffee?name=trio.txt")
    }

    async fn spawn_upload_server(fields: Fields) -> String {
        let app = Router::new()
            .route("/upload", post(record_upload))
            .with_state(fields);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_progress_ticket_relative() {
        let (id, name) =
            progress_ticket("http://localhost:5000", "/progress/abc123?name=trio.txt").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(name.as_deref(), Some("trio.txt"));
    }

    #[test]
    fn test_progress_ticket_absolute_and_encoded_name() {
        let (id, name) = progress_ticket(
            "http://localhost:5000",
            "https://tripod.example.org/progress/9f2c?name=my%20trio.txt",
        )
        .unwrap();
        assert_eq!(id.as_str(), "9f2c");
        assert_eq!(name.as_deref(), Some("my trio.txt"));
    }

    #[test]
    fn test_progress_ticket_rejects_upload_bounce() {
        assert!(progress_ticket("http://localhost:5000", "/upload").is_none());
        assert!(progress_ticket("http://localhost:5000", "/progress/").is_none());
    }

    #[tokio::test]
    async fn test_submit_sample_data() {
        let fields = Fields::default();
        let client = TripodClient::new(spawn_upload_server(Arc::clone(&fields)).await).unwrap();

        let mut submission = Submission::sample_data();
        submission.build = GenomeBuild::Hg19;
        submission.methods.podmi1 = true;

        let ticket = client.submit(&submission).await.unwrap();
        assert_eq!(ticket.id.as_str(), "c0ffee");
        assert_eq!(ticket.name.as_deref(), Some("trio.txt"));

        let fields = fields.lock().unwrap();
        assert_eq!(field(&fields, "sampledata"), Some("sampledata.txt"));
        assert_eq!(field(&fields, "build"), Some("hg19_centromeres.txt"));
        assert_eq!(field(&fields, "podmi1"), Some("mi1"));
        assert_eq!(field(&fields, "podhd"), Some("nohd"));
        assert_eq!(field(&fields, "file"), None);
    }

    #[tokio::test]
    async fn test_submit_uploads_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("trio.txt");
        std::fs::write(&path, "Name\tChr\tPosition\n")?;

        let fields = Fields::default();
        let client = TripodClient::new(spawn_upload_server(Arc::clone(&fields)).await).unwrap();

        let ticket = client.submit(&Submission::upload(&path)).await?;
        assert_eq!(ticket.id.as_str(), "c0ffee");

        let fields = fields.lock().unwrap();
        assert_eq!(field(&fields, "file"), Some("trio.txt"));
        assert_eq!(field(&fields, "gender"), Some("NA"));
        assert_eq!(field(&fields, "sampledata"), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_form_without_network() {
        let client = TripodClient::new("http://127.0.0.1:9").unwrap();
        let mut submission = Submission::sample_data();
        submission.methods.pod = false;

        let err = client.submit(&submission).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
