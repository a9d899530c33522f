//! Post submissions arriving either url-encoded or as multipart with an image.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{Either, web};
use mime::Mime;

use scribe_core::domain::ImageKind;
use scribe_shared::forms::PostForm;

use crate::middleware::error::{AppError, AppResult};

pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Largest accepted request body for post and comment forms.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(MultipartForm)]
pub struct PostUpload {
    pub text: Option<Text<String>>,
    pub group: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,
}

pub type PostPayload = Either<web::Form<PostForm>, MultipartForm<PostUpload>>;

/// A file part as the browser sent it.
#[derive(Debug)]
pub struct UploadedFile {
    pub content_type: Option<Mime>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// The file's format, if it both claims and proves to be an image.
    pub fn image_kind(&self) -> Option<ImageKind> {
        let declared = self
            .content_type
            .as_ref()
            .is_some_and(|ct| ct.type_() == mime::IMAGE);
        if declared {
            ImageKind::sniff(&self.bytes)
        } else {
            None
        }
    }
}

/// Post form fields plus the optional image file.
#[derive(Debug, Default)]
pub struct PostSubmission {
    pub form: PostForm,
    pub image: Option<UploadedFile>,
}

impl PostSubmission {
    pub async fn from_payload(payload: PostPayload) -> AppResult<Self> {
        match payload {
            Either::Left(form) => Ok(Self {
                form: form.into_inner(),
                image: None,
            }),
            Either::Right(MultipartForm(upload)) => {
                let form = PostForm {
                    text: upload.text.map(Text::into_inner).unwrap_or_default(),
                    group: upload.group.map(Text::into_inner).unwrap_or_default(),
                };
                let image = match upload.image {
                    // An empty file input still submits a zero-length part.
                    Some(file) if file.size > 0 => Some(read_temp_file(file).await?),
                    _ => None,
                };
                Ok(Self { form, image })
            }
        }
    }
}

async fn read_temp_file(file: TempFile) -> AppResult<UploadedFile> {
    let bytes = tokio::fs::read(file.file.path())
        .await
        .map_err(|e| AppError::Internal(format!("Cannot read upload: {e}")))?;
    tracing::debug!(
        name = file.file_name.as_deref().unwrap_or(""),
        size = bytes.len(),
        "Received upload"
    );
    Ok(UploadedFile {
        content_type: file.content_type,
        bytes,
    })
}
