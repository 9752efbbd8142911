//! Job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobId;

/// Receipt for an accepted submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTicket {
    pub id: JobId,
    /// Name of the uploaded file, as echoed by the server
    pub name: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl JobTicket {
    pub fn new(id: JobId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            submitted_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_deserializes_server_json() {
        let json = r#"{"id":"9f2c","name":"trio.txt","submitted_at":"2024-03-01T12:00:00Z"}"#;
        let ticket: JobTicket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id.as_str(), "9f2c");
        assert_eq!(ticket.name.as_deref(), Some("trio.txt"));
    }

    #[test]
    fn test_ticket_rejects_empty_id() {
        let json = r#"{"id":"","name":null,"submitted_at":"2024-03-01T12:00:00Z"}"#;
        assert!(serde_json::from_str::<JobTicket>(json).is_err());
    }
}
