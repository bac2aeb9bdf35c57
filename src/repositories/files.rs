use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::SubmissionFile;

const COLUMNS: &str = "\
    id, submission_id, filename, file_path, file_url, file_size, mime_type, \
    order_index, uploaded_at";

#[allow(clippy::too_many_arguments)]
pub(crate) async fn insert(
    pool: &PgPool,
    id: &str,
    submission_id: &str,
    filename: &str,
    file_path: &str,
    file_url: &str,
    file_size: i64,
    mime_type: &str,
    order_index: i32,
    uploaded_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO submission_files (
            id, submission_id, filename, file_path, file_url, file_size,
            mime_type, order_index, uploaded_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)",
    )
    .bind(id)
    .bind(submission_id)
    .bind(filename)
    .bind(file_path)
    .bind(file_url)
    .bind(file_size)
    .bind(mime_type)
    .bind(order_index)
    .bind(uploaded_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn list_by_submission(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Vec<SubmissionFile>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionFile>(&format!(
        "SELECT {COLUMNS}
         FROM submission_files
         WHERE submission_id = $1
         ORDER BY order_index"
    ))
    .bind(submission_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_submissions(
    pool: &PgPool,
    submission_ids: &[String],
) -> Result<Vec<SubmissionFile>, sqlx::Error> {
    if submission_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, SubmissionFile>(&format!(
        "SELECT {COLUMNS}
         FROM submission_files
         WHERE submission_id = ANY($1)
         ORDER BY submission_id, order_index"
    ))
    .bind(submission_ids)
    .fetch_all(pool)
    .await
}
