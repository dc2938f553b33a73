use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::domain::PersonnelRecord;
use super::repository::{Attachment, OutboundMessage, Recipient};
use crate::config::NotificationConfig;

pub const DOCUMENT_REQUEST_SUBJECT: &str = "Führungszeugnis übermitteln";
pub const DOCUMENT_REQUEST_ATTACHMENT_NAME: &str =
    "Aufforderung Polizeiliches Führungszeugnis 2023.pdf";

/// Payload of the "request Führungszeugnis" action on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "vorname", default)]
    pub first_name: String,
}

impl DocumentRequest {
    pub fn for_record(record: &PersonnelRecord) -> Self {
        Self {
            email: record.email.clone(),
            name: record.name.clone(),
            first_name: record.first_name.clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.email, &self.name, &self.first_name]
            .iter()
            .all(|value| !value.trim().is_empty())
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.name.trim())
            .trim()
            .to_string()
    }
}

/// Renders the fixed document request mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequestTemplate {
    contact_address: String,
    attachment_path: PathBuf,
}

impl DocumentRequestTemplate {
    pub fn new(contact_address: impl Into<String>, attachment_path: impl Into<PathBuf>) -> Self {
        Self {
            contact_address: contact_address.into(),
            attachment_path: attachment_path.into(),
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(
            config.contact_address.clone(),
            config.attachment_path.clone(),
        )
    }

    pub fn contact_address(&self) -> &str {
        &self.contact_address
    }

    pub fn render(&self, request: &DocumentRequest) -> OutboundMessage {
        let display_name = request.display_name();
        let greeting = format!("Hallo {display_name},");
        let instruction = format!(
            "Schicken Sie ihr Führungszeugnis bitte an diese E-Mail-Adresse: {}",
            self.contact_address
        );

        let html_body = format!(
            "<h1>{subject}</h1>\n<p>{greeting}</p>\n<div>{instruction}</div>\n\
             <div>Im Anhang finden Sie die PDF.</div>\n<div>Herzliche Grüße</div>\n\
             <div>Dein Team vom ECSA</div>\n",
            subject = DOCUMENT_REQUEST_SUBJECT,
            greeting = escape_html(&greeting),
            instruction = escape_html(&instruction),
        );
        let text_body = format!("{greeting}\n\n{instruction}");

        OutboundMessage {
            to: Recipient {
                address: request.email.trim().to_string(),
                display_name,
            },
            subject: DOCUMENT_REQUEST_SUBJECT.to_string(),
            html_body,
            text_body,
            attachments: vec![Attachment {
                file_name: DOCUMENT_REQUEST_ATTACHMENT_NAME.to_string(),
                path: self.attachment_path.clone(),
            }],
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
