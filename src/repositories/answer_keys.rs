use sqlx::PgPool;

use crate::db::models::AnswerKey;
use crate::db::types::KeyType;

const COLUMNS: &str = "\
    id, exam_name, subject, total_marks, key_type, filename, file_path, \
    file_url, teacher_email, created_at";

pub(crate) struct CreateAnswerKey<'a> {
    pub id: &'a str,
    pub exam_name: &'a str,
    pub subject: &'a str,
    pub total_marks: i32,
    pub key_type: KeyType,
    pub filename: &'a str,
    pub file_path: &'a str,
    pub file_url: &'a str,
    pub teacher_email: &'a str,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAnswerKey<'_>,
) -> Result<AnswerKey, sqlx::Error> {
    sqlx::query_as::<_, AnswerKey>(&format!(
        "INSERT INTO answer_keys (
            id, exam_name, subject, total_marks, key_type, filename,
            file_path, file_url, teacher_email, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.exam_name)
    .bind(params.subject)
    .bind(params.total_marks)
    .bind(params.key_type)
    .bind(params.filename)
    .bind(params.file_path)
    .bind(params.file_url)
    .bind(params.teacher_email)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// Newest key wins when several were uploaded for the same exam/subject pair.
pub(crate) async fn find_match(
    pool: &PgPool,
    exam_name: &str,
    subject: &str,
) -> Result<Option<AnswerKey>, sqlx::Error> {
    sqlx::query_as::<_, AnswerKey>(&format!(
        "SELECT {COLUMNS}
         FROM answer_keys
         WHERE exam_name = $1 AND subject = $2
         ORDER BY created_at DESC
         LIMIT 1"
    ))
    .bind(exam_name)
    .bind(subject)
    .fetch_optional(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamEntry {
    pub(crate) exam_name: String,
    pub(crate) subject: String,
    pub(crate) filename: String,
}

pub(crate) async fn list_distinct_exams(pool: &PgPool) -> Result<Vec<ExamEntry>, sqlx::Error> {
    sqlx::query_as::<_, ExamEntry>(
        "SELECT DISTINCT ON (exam_name, subject) exam_name, subject, filename
         FROM answer_keys
         ORDER BY exam_name, subject, created_at DESC",
    )
    .fetch_all(pool)
    .await
}
