use crate::api::errors::ApiError;
use std::path::Path;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.len() >= 3
        && email.matches('@').count() == 1
        && !email.starts_with('@')
        && !email.ends_with('@')
        && !email.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid email address".to_string()))
    }
}

pub(crate) fn validate_file_upload(
    filename: &str,
    content_type: &str,
    allowed_extensions: &[String],
) -> Result<(), ApiError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ApiError::BadRequest("File must have an extension".to_string()))?;

    if !allowed_extensions.iter().any(|allowed| allowed == &extension) {
        return Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")));
    }

    let mime = content_type.trim().to_ascii_lowercase();
    if mime_allowed_for_extension(&mime, &extension) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "MIME type '{mime}' does not match extension '.{extension}'"
        )))
    }
}

fn mime_allowed_for_extension(mime: &str, extension: &str) -> bool {
    match extension {
        "jpg" | "jpeg" => matches!(mime, "image/jpeg" | "image/jpg"),
        "png" => mime == "image/png",
        "webp" => mime == "image/webp",
        "pdf" => mime == "application/pdf",
        _ => false,
    }
}

pub(crate) fn content_type_for_extension(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["jpg".into(), "jpeg".into(), "png".into(), "pdf".into()]
    }

    #[test]
    fn accepts_pdf_and_images() {
        assert!(validate_file_upload("sheet.pdf", "application/pdf", &allowed()).is_ok());
        assert!(validate_file_upload("page1.JPG", "image/jpeg", &allowed()).is_ok());
        assert!(validate_file_upload("page2.png", "image/png", &allowed()).is_ok());
    }

    #[test]
    fn rejects_disallowed_extension_and_mismatched_mime() {
        assert!(validate_file_upload("notes.txt", "text/plain", &allowed()).is_err());
        assert!(validate_file_upload("sheet.pdf", "image/png", &allowed()).is_err());
        assert!(validate_file_upload("no-extension", "image/png", &allowed()).is_err());
    }

    #[test]
    fn email_validation_basics() {
        assert!(validate_email("student@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("two@@ats.com").is_err());
        assert!(validate_email("spaced @example.com").is_err());
    }
}
