use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Submission;
use crate::db::types::{EvaluationMethod, SheetType, SubmissionStatus};

const COLUMNS: &str = "\
    id, student_email, exam_name, subject, roll_number, answer_sheet_type, \
    notes, status, marks_obtained, total_marks, feedback, evaluation_method, \
    evaluated_at, created_at";

pub(crate) struct CreateSubmission<'a> {
    pub id: &'a str,
    pub student_email: &'a str,
    pub exam_name: &'a str,
    pub subject: &'a str,
    pub roll_number: &'a str,
    pub answer_sheet_type: SheetType,
    pub notes: &'a str,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, student_email, exam_name, subject, roll_number,
            answer_sheet_type, notes, status, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_email)
    .bind(params.exam_name)
    .bind(params.subject)
    .bind(params.roll_number)
    .bind(params.answer_sheet_type)
    .bind(params.notes)
    .bind(SubmissionStatus::Pending)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_latest_pending_by_roll(
    pool: &PgPool,
    roll_number: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS}
         FROM submissions
         WHERE roll_number = $1 AND status = $2
         ORDER BY created_at DESC
         LIMIT 1"
    ))
    .bind(roll_number)
    .bind(SubmissionStatus::Pending)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_latest_by_roll(
    pool: &PgPool,
    roll_number: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS}
         FROM submissions
         WHERE roll_number = $1
         ORDER BY created_at DESC
         LIMIT 1"
    ))
    .bind(roll_number)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_latest_by_roll_and_exam(
    pool: &PgPool,
    roll_number: &str,
    exam_name: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS}
         FROM submissions
         WHERE roll_number = $1 AND exam_name = $2
         ORDER BY created_at DESC
         LIMIT 1"
    ))
    .bind(roll_number)
    .bind(exam_name)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_email: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS}
         FROM submissions
         WHERE student_email = $1
         ORDER BY created_at DESC"
    ))
    .bind(student_email)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_pending(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS}
         FROM submissions
         WHERE status = $1
         ORDER BY created_at DESC"
    ))
    .bind(SubmissionStatus::Pending)
    .fetch_all(pool)
    .await
}

pub(crate) struct FinalizeEvaluation<'a> {
    pub submission_id: &'a str,
    pub marks_obtained: f64,
    pub total_marks: i32,
    pub feedback: &'a str,
    pub method: EvaluationMethod,
    pub evaluated_at: PrimitiveDateTime,
}

/// Conditional pending-only update; exactly one of any concurrent callers
/// observes `true`, everyone else loses the race and must report the
/// submission as already evaluated.
pub(crate) async fn finalize_evaluation(
    pool: &PgPool,
    params: FinalizeEvaluation<'_>,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE submissions
         SET status = $1,
             marks_obtained = $2,
             total_marks = $3,
             feedback = $4,
             evaluation_method = $5,
             evaluated_at = $6
         WHERE id = $7 AND status = $8",
    )
    .bind(SubmissionStatus::Evaluated)
    .bind(params.marks_obtained)
    .bind(params.total_marks)
    .bind(params.feedback)
    .bind(params.method)
    .bind(params.evaluated_at)
    .bind(params.submission_id)
    .bind(SubmissionStatus::Pending)
    .execute(pool)
    .await?;

    Ok(updated.rows_affected() > 0)
}
