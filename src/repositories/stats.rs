use sqlx::PgPool;

use crate::db::types::SubmissionStatus;

#[derive(Debug, Default)]
pub(crate) struct TeacherStats {
    pub(crate) total_exams: i64,
    pub(crate) total_submissions: i64,
    pub(crate) evaluated: i64,
    pub(crate) pending: i64,
}

#[derive(Debug, Default)]
pub(crate) struct StudentStats {
    pub(crate) total_submissions: i64,
    pub(crate) evaluated: i64,
    pub(crate) pending: i64,
    pub(crate) average_percentage: f64,
}

pub(crate) async fn teacher_stats(pool: &PgPool) -> Result<TeacherStats, sqlx::Error> {
    let total_exams: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM (SELECT DISTINCT exam_name, subject FROM answer_keys) AS exams",
    )
    .fetch_one(pool)
    .await?;

    let total_submissions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM submissions").fetch_one(pool).await?;

    let evaluated: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE status = $1")
        .bind(SubmissionStatus::Evaluated)
        .fetch_one(pool)
        .await?;

    let pending: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE status = $1")
        .bind(SubmissionStatus::Pending)
        .fetch_one(pool)
        .await?;

    Ok(TeacherStats { total_exams, total_submissions, evaluated, pending })
}

pub(crate) async fn student_stats(
    pool: &PgPool,
    student_email: &str,
) -> Result<StudentStats, sqlx::Error> {
    let (total_submissions, evaluated, pending): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE status = $2),
                COUNT(*) FILTER (WHERE status = $3)
         FROM submissions
         WHERE student_email = $1",
    )
    .bind(student_email)
    .bind(SubmissionStatus::Evaluated)
    .bind(SubmissionStatus::Pending)
    .fetch_one(pool)
    .await?;

    let sums: Option<(Option<f64>, Option<i64>)> = sqlx::query_as(
        "SELECT SUM(marks_obtained), SUM(total_marks)::BIGINT
         FROM submissions
         WHERE student_email = $1 AND status = $2",
    )
    .bind(student_email)
    .bind(SubmissionStatus::Evaluated)
    .fetch_optional(pool)
    .await?;

    let average_percentage = match sums {
        Some((Some(marks), Some(total))) if total > 0 => marks / total as f64 * 100.0,
        _ => 0.0,
    };

    Ok(StudentStats { total_submissions, evaluated, pending, average_percentage })
}
