//! Uploads a finished QR image into a new document, centred on the page.
//!
//! This sits outside the QR pipeline: it only consumes the PNG bytes
//! produced by [`crate::compose`]. Authentication is limited to an
//! externally supplied OAuth bearer token.

use log::{debug, info, warn};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DOCS_URL: &str = "https://docs.googleapis.com/v1/documents";

pub const DEFAULT_IMAGE_SIZE_PT: f64 = 300.0;

const UPLOAD_BOUNDARY: &str = "logo_qr_upload_7f3c9a1e5b2d4806";

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("No access token configured")]
    MissingToken,

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response body")]
    Decode(#[from] serde_json::Error),

    #[error("{operation} failed with status {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },
}

#[derive(Clone, Debug)]
pub struct DocsConfig {
    pub access_token: String,
    /// Address granted writer access on the new document.
    pub share_with: Option<String>,
    pub image_size_pt: f64,
}

impl DocsConfig {
    pub fn validate(&self) -> Result<(), DocsError> {
        if self.access_token.trim().is_empty() {
            return Err(DocsError::MissingToken);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedDocument {
    pub document_id: String,
    pub image_id: String,
    pub edit_url: String,
}

/// Anything that can turn PNG bytes into a document holding them.
pub trait DocumentEmbedder {
    fn embed(&self, png: &[u8], title: &str) -> Result<EmbeddedDocument, DocsError>;
}

pub fn default_title(payload: &str) -> String {
    format!("QR code for {payload}")
}

pub fn image_file_name(title: &str) -> String {
    format!("qrcode_{}.png", title.replace(' ', "_"))
}

pub fn image_uri(image_id: &str) -> String {
    format!("https://drive.google.com/uc?id={image_id}")
}

pub fn edit_url(document_id: &str) -> String {
    format!("https://docs.google.com/document/d/{document_id}/edit")
}

pub fn public_read_permission() -> Value {
    json!({ "type": "anyone", "role": "reader" })
}

pub fn writer_permission(email: &str) -> Value {
    json!({ "type": "user", "role": "writer", "emailAddress": email })
}

/// Insert the image at the start of the body and centre its paragraph.
pub fn insert_centered_image_requests(image_id: &str, size_pt: f64) -> Value {
    let dimension = json!({ "magnitude": size_pt, "unit": "PT" });
    json!({
        "requests": [
            {
                "insertInlineImage": {
                    "uri": image_uri(image_id),
                    "location": { "segmentId": "", "index": 1 },
                    "objectSize": { "width": dimension, "height": dimension }
                }
            },
            {
                "updateParagraphStyle": {
                    "range": { "segmentId": "", "startIndex": 1, "endIndex": 2 },
                    "paragraphStyle": { "alignment": "CENTER" },
                    "fields": "alignment"
                }
            }
        ]
    })
}

/// `multipart/related` body carrying the file metadata and the PNG in one
/// request, so the file is created with its name.
pub fn multipart_upload_body(name: &str, png: &[u8]) -> Vec<u8> {
    let metadata = json!({ "name": name, "mimeType": "image/png" });
    let mut body = Vec::with_capacity(png.len() + 256);
    body.extend_from_slice(
        format!(
            "--{UPLOAD_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n\
             --{UPLOAD_BOUNDARY}\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(png);
    body.extend_from_slice(format!("\r\n--{UPLOAD_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/related; boundary={UPLOAD_BOUNDARY}")
}

fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, DocsError> {
    Ok(serde_json::from_str(body)?)
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    document_id: String,
}

pub struct DocsClient {
    http: Client,
    config: DocsConfig,
}

impl DocsClient {
    pub fn new(config: DocsConfig) -> Result<Self, DocsError> {
        config.validate()?;
        Ok(Self {
            http: Client::new(),
            config,
        })
    }

    fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<String, DocsError> {
        let response = request.bearer_auth(&self.config.access_token).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(DocsError::Api {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        debug!("{operation} succeeded");
        Ok(body)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, DocsError> {
        let body = self.send(operation, request)?;
        parse_response(&body)
    }

    pub fn upload_image(&self, png: &[u8], name: &str) -> Result<String, DocsError> {
        let upload = self
            .http
            .post(DRIVE_UPLOAD_URL)
            .query(&[("uploadType", "multipart")])
            .header(reqwest::header::CONTENT_TYPE, multipart_content_type())
            .body(multipart_upload_body(name, png));
        let file: DriveFile = self.send_json("image upload", upload)?;

        info!("Uploaded {name} (id {})", file.id);
        Ok(file.id)
    }

    pub fn grant(&self, file_id: &str, permission: &Value, notify: bool) -> Result<(), DocsError> {
        let request = self
            .http
            .post(format!("{DRIVE_FILES_URL}/{file_id}/permissions"))
            .query(&[("sendNotificationEmail", notify.to_string())])
            .json(permission);
        self.send("permission grant", request)?;
        Ok(())
    }

    pub fn create_document(&self, title: &str) -> Result<String, DocsError> {
        let request = self.http.post(DOCS_URL).json(&json!({ "title": title }));
        let doc: Document = self.send_json("document creation", request)?;
        info!("Created document {title:?} (id {})", doc.document_id);
        Ok(doc.document_id)
    }

    pub fn insert_centered_image(&self, document_id: &str, image_id: &str) -> Result<(), DocsError> {
        let body = insert_centered_image_requests(image_id, self.config.image_size_pt);
        let request = self
            .http
            .post(format!("{DOCS_URL}/{document_id}:batchUpdate"))
            .json(&body);
        self.send("image insertion", request)?;
        Ok(())
    }
}

impl DocumentEmbedder for DocsClient {
    fn embed(&self, png: &[u8], title: &str) -> Result<EmbeddedDocument, DocsError> {
        let image_id = self.upload_image(png, &image_file_name(title))?;
        // The documents API fetches the image through a public link.
        self.grant(&image_id, &public_read_permission(), false)?;

        let document_id = self.create_document(title)?;

        if let Some(email) = &self.config.share_with {
            match self.grant(&document_id, &writer_permission(email), false) {
                Ok(()) => info!("Shared document with {email}"),
                Err(e) => warn!("Could not share document with {email}: {e}"),
            }
        }

        self.insert_centered_image(&document_id, &image_id)?;

        Ok(EmbeddedDocument {
            edit_url: edit_url(&document_id),
            document_id,
            image_id,
        })
    }
}
