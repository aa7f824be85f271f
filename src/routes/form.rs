use std::collections::HashMap;

use axum::extract::Multipart;

use crate::errors::AppError;
use crate::models::UploadedFile;

/// Decoded `multipart/form-data` body. Text fields are kept by name; the
/// first part that carries a file name is kept as the upload.
#[derive(Debug, Default)]
pub struct FormFields {
    texts: HashMap<String, String>,
    file: Option<(String, UploadedFile)>,
}

impl FormFields {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut fields = FormFields::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) if fields.file.is_none() => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?.to_vec();
                    fields.file = Some((
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        },
                    ));
                }
                Some(_) => {}
                None => {
                    let value = field.text().await?;
                    fields.texts.insert(name, value);
                }
            }
        }
        Ok(fields)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    /// Text field with surrounding whitespace removed; blank counts as missing.
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.text(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        match self.file.take() {
            Some((field, file)) if field == name => Some(file),
            other => {
                self.file = other;
                None
            }
        }
    }
}
