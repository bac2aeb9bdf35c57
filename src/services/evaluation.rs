use thiserror::Error;

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Submission;
use crate::db::types::{EvaluationMethod, SheetType, SubmissionStatus};
use crate::repositories;
use crate::services::ai_evaluation::EvaluateRequest;

/// Failures of the evaluate operation. `NoMatchingKey` and `Service` leave
/// the submission pending so the caller can retry once a key is uploaded or
/// the AI collaborator recovers.
#[derive(Debug, Error)]
pub(crate) enum EvaluationError {
    #[error("submission not found")]
    NotFound,
    #[error("submission has already been evaluated")]
    AlreadyEvaluated,
    #[error("no answer key found for exam '{exam_name}' ({subject}); upload the key and retry")]
    NoMatchingKey { exam_name: String, subject: String },
    #[error("AI evaluation is only available for descriptive answer sheets")]
    UnsupportedSheetType,
    #[error("submission has no stored answer-sheet files")]
    NoFiles,
    #[error("evaluation service failed: {0}")]
    Service(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub(crate) struct EvaluationOutcome {
    pub(crate) submission_id: String,
    pub(crate) roll_number: String,
    pub(crate) marks_obtained: f64,
    pub(crate) total_marks: i32,
    pub(crate) feedback: String,
}

/// Runs the AI evaluation for one submission, addressed by submission id or,
/// failing that, by roll number (latest pending wins; roll numbers repeat
/// across exams).
pub(crate) async fn evaluate(
    state: &AppState,
    reference: &str,
) -> Result<EvaluationOutcome, EvaluationError> {
    let submission = resolve_submission(state, reference).await?;

    if submission.status != SubmissionStatus::Pending {
        return Err(EvaluationError::AlreadyEvaluated);
    }

    if submission.answer_sheet_type != SheetType::Descriptive {
        return Err(EvaluationError::UnsupportedSheetType);
    }

    let key =
        repositories::answer_keys::find_match(state.db(), &submission.exam_name, &submission.subject)
            .await?
            .ok_or_else(|| EvaluationError::NoMatchingKey {
                exam_name: submission.exam_name.clone(),
                subject: submission.subject.clone(),
            })?;

    let files = repositories::files::list_by_submission(state.db(), &submission.id).await?;
    if files.is_empty() {
        return Err(EvaluationError::NoFiles);
    }

    // The await below holds no submission lock; the conditional update at the
    // end is the only guard on the pending -> evaluated transition.
    let verdict = state
        .evaluator()
        .evaluate(EvaluateRequest {
            key_file_url: key.file_url.clone(),
            sheet_file_urls: files.iter().map(|file| file.file_url.clone()).collect(),
            total_marks: key.total_marks,
            exam_name: submission.exam_name.clone(),
            subject: submission.subject.clone(),
            submission_id: submission.id.clone(),
        })
        .await
        .map_err(|err| {
            metrics::counter!("evaluations_failed_total", "method" => "ai").increment(1);
            EvaluationError::Service(format!("{err:#}"))
        })?;

    let marks = clamp_marks(verdict.marks_obtained, key.total_marks);

    let finalized = repositories::submissions::finalize_evaluation(
        state.db(),
        repositories::submissions::FinalizeEvaluation {
            submission_id: &submission.id,
            marks_obtained: marks,
            total_marks: key.total_marks,
            feedback: &verdict.feedback,
            method: EvaluationMethod::Ai,
            evaluated_at: primitive_now_utc(),
        },
    )
    .await?;

    if !finalized {
        // A concurrent evaluation won the conditional update.
        return Err(EvaluationError::AlreadyEvaluated);
    }

    metrics::counter!("evaluations_completed_total", "method" => "ai").increment(1);

    Ok(EvaluationOutcome {
        submission_id: submission.id,
        roll_number: submission.roll_number,
        marks_obtained: marks,
        total_marks: key.total_marks,
        feedback: verdict.feedback,
    })
}

/// Teacher records marks directly, bypassing the AI collaborator. Same
/// at-most-once transition rule as the AI path.
pub(crate) async fn evaluate_manually(
    state: &AppState,
    roll_number: &str,
    exam_name: &str,
    marks_obtained: f64,
    total_marks: i32,
    feedback: &str,
) -> Result<EvaluationOutcome, EvaluationError> {
    let submission =
        repositories::submissions::find_latest_by_roll_and_exam(state.db(), roll_number, exam_name)
            .await?
            .ok_or(EvaluationError::NotFound)?;

    if submission.status != SubmissionStatus::Pending {
        return Err(EvaluationError::AlreadyEvaluated);
    }

    let marks = clamp_marks(marks_obtained, total_marks);

    let finalized = repositories::submissions::finalize_evaluation(
        state.db(),
        repositories::submissions::FinalizeEvaluation {
            submission_id: &submission.id,
            marks_obtained: marks,
            total_marks,
            feedback,
            method: EvaluationMethod::Manual,
            evaluated_at: primitive_now_utc(),
        },
    )
    .await?;

    if !finalized {
        return Err(EvaluationError::AlreadyEvaluated);
    }

    metrics::counter!("evaluations_completed_total", "method" => "manual").increment(1);

    Ok(EvaluationOutcome {
        submission_id: submission.id,
        roll_number: submission.roll_number,
        marks_obtained: marks,
        total_marks,
        feedback: feedback.to_string(),
    })
}

pub(crate) async fn resolve_submission(
    state: &AppState,
    reference: &str,
) -> Result<Submission, EvaluationError> {
    if let Some(submission) =
        repositories::submissions::find_by_id(state.db(), reference).await?
    {
        return Ok(submission);
    }

    repositories::submissions::find_latest_pending_by_roll(state.db(), reference)
        .await?
        .ok_or(EvaluationError::NotFound)
}

/// Marks from the collaborator are not trusted: clamp into `[0, total]` and
/// round to two decimals.
pub(crate) fn clamp_marks(marks: f64, total_marks: i32) -> f64 {
    let total = total_marks.max(0) as f64;
    let clamped = if marks.is_finite() { marks.clamp(0.0, total) } else { 0.0 };
    (clamped * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::clamp_marks;

    #[test]
    fn clamp_marks_bounds_to_total() {
        assert_eq!(clamp_marks(112.0, 100), 100.0);
        assert_eq!(clamp_marks(-3.0, 100), 0.0);
        assert_eq!(clamp_marks(87.5, 100), 87.5);
    }

    #[test]
    fn clamp_marks_rounds_to_two_decimals() {
        assert_eq!(clamp_marks(66.6666, 100), 66.67);
        assert_eq!(clamp_marks(0.004, 100), 0.0);
    }

    #[test]
    fn clamp_marks_handles_non_finite_input() {
        assert_eq!(clamp_marks(f64::NAN, 100), 0.0);
        assert_eq!(clamp_marks(f64::INFINITY, 100), 0.0);
    }
}
