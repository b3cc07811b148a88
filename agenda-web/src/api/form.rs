//! Multipart contact form decoding

use agenda_common::validation::ContactFields;
use axum::extract::Multipart;
use tracing::debug;

use crate::error::WebResult;

/// Contact form as submitted, before validation
#[derive(Debug, Default)]
pub struct ContactSubmission {
    pub fields: ContactFields,
    /// Plain password; empty when the field was left blank
    pub password: String,
    /// Uploaded photo bytes, `None` when no file was chosen
    pub photo: Option<Vec<u8>>,
}

impl ContactSubmission {
    /// Read every field of the multipart body
    ///
    /// A file field with no file name or no content counts as no upload.
    pub async fn from_multipart(mut multipart: Multipart) -> WebResult<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "nome" => submission.fields.name = field.text().await?,
                "email" => submission.fields.email = field.text().await?,
                "senha" => submission.password = field.text().await?,
                "telefone" => submission.fields.phone = field.text().await?,
                "data" => submission.fields.birth_date = field.text().await?,
                "cpf" => submission.fields.cpf = field.text().await?,
                "foto" => {
                    let has_file_name = field.file_name().is_some_and(|n| !n.is_empty());
                    let bytes = field.bytes().await?;
                    if has_file_name && !bytes.is_empty() {
                        submission.photo = Some(bytes.to_vec());
                    }
                }
                other => debug!("Ignoring form field {}", other),
            }
        }

        Ok(submission)
    }
}
