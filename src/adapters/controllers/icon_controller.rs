use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::{
    adapters::dto::icon_dto::{ListIconsQuery, ListIconsResponse, UploadIconsResponse},
    application::{
        error::ApplicationError,
        services::{archive, IconService},
    },
};

pub const ARCHIVE_FIELD: &str = "iconZip";
pub const PROVIDER_FIELD: &str = "provider";

pub struct IconController;

impl IconController {
    /// Stores every SVG of an uploaded ZIP under the given provider.
    /// POST /api/upload/icons
    /// Multipart: `iconZip` (file), `provider` (text)
    pub async fn upload_icons(
        State(icon_service): State<Arc<IconService>>,
        mut multipart: Multipart,
    ) -> Result<Json<UploadIconsResponse>, ApplicationError> {
        info!("New icon upload request");

        let mut archive_bytes: Option<Vec<u8>> = None;
        let mut archive_name: Option<String> = None;
        let mut provider: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, "Invalid request format"))?
        {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                ARCHIVE_FIELD => {
                    archive_name = field.file_name().map(|s| s.to_string());
                    archive_bytes = Some(
                        field
                            .bytes()
                            .await
                            .map_err(|e| multipart_error(e, "Invalid file data"))?
                            .to_vec(),
                    );
                }
                PROVIDER_FIELD => {
                    provider = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| multipart_error(e, "Invalid request data"))?,
                    );
                }
                _ => {}
            }
        }

        let archive_bytes = archive_bytes.ok_or_else(|| {
            ApplicationError::MissingField(format!(
                "No file uploaded. Please make sure you are using the correct field name ({}).",
                ARCHIVE_FIELD
            ))
        })?;

        let provider = provider
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApplicationError::MissingField("Provider is required".to_string()))?;

        info!(
            "Received archive {:?} ({} bytes) for provider '{}'",
            archive_name,
            archive_bytes.len(),
            provider
        );

        let files = tokio::task::spawn_blocking(move || archive::extract_svg_files(&archive_bytes))
            .await
            .map_err(|e| ApplicationError::InternalError(format!("Archive task failed: {}", e)))??;

        let summary = icon_service.upload_icons(&provider, files).await;

        Ok(Json(UploadIconsResponse::from(summary)))
    }

    /// Lists stored icons from both backends, cloud entries first.
    /// GET /api/icons?provider=<optional>
    pub async fn list_icons(
        State(icon_service): State<Arc<IconService>>,
        Query(query): Query<ListIconsQuery>,
    ) -> Json<ListIconsResponse> {
        info!("Listing icons for provider {:?}", query.provider());

        let listing = icon_service.list_icons(query.provider()).await;
        Json(ListIconsResponse::from(listing))
    }
}

fn multipart_error(error: MultipartError, message: &str) -> ApplicationError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApplicationError::PayloadTooLarge;
    }
    warn!("Invalid multipart data: {}", error);
    ApplicationError::BadRequest(message.to_string())
}
