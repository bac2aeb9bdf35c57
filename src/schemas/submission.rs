use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Submission, SubmissionFile};
use crate::db::types::{EvaluationMethod, SheetType, SubmissionStatus};

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) student_email: String,
    pub(crate) exam_name: String,
    pub(crate) subject: String,
    pub(crate) roll_number: String,
    pub(crate) answer_sheet_type: SheetType,
    pub(crate) notes: String,
    pub(crate) status: SubmissionStatus,
    pub(crate) marks_obtained: Option<f64>,
    pub(crate) total_marks: Option<i32>,
    pub(crate) feedback: Option<String>,
    pub(crate) evaluation_method: Option<EvaluationMethod>,
    pub(crate) files: Vec<String>,
    pub(crate) file_urls: Vec<String>,
    pub(crate) timestamp: String,
    pub(crate) evaluated_at: Option<String>,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: Submission, files: Vec<SubmissionFile>) -> Self {
        Self {
            id: submission.id,
            student_email: submission.student_email,
            exam_name: submission.exam_name,
            subject: submission.subject,
            roll_number: submission.roll_number,
            answer_sheet_type: submission.answer_sheet_type,
            notes: submission.notes,
            status: submission.status,
            marks_obtained: submission.marks_obtained,
            total_marks: submission.total_marks,
            feedback: submission.feedback,
            evaluation_method: submission.evaluation_method,
            files: files.iter().map(|file| file.filename.clone()).collect(),
            file_urls: files.into_iter().map(|file| file.file_url).collect(),
            timestamp: format_primitive(submission.created_at),
            evaluated_at: submission.evaluated_at.map(format_primitive),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionListResponse {
    pub(crate) submissions: Vec<SubmissionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PendingListResponse {
    pub(crate) pending: Vec<SubmissionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadAnswerResponse {
    pub(crate) message: String,
    pub(crate) submission_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EvaluateResponse {
    pub(crate) message: String,
    pub(crate) marks_obtained: f64,
    pub(crate) total_marks: i32,
    pub(crate) feedback: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ManualEvaluationRequest {
    pub(crate) roll_number: String,
    pub(crate) exam_name: String,
    #[validate(range(min = 0.0, message = "marks_obtained must be non-negative"))]
    pub(crate) marks_obtained: f64,
    #[serde(default = "default_total_marks")]
    pub(crate) total_marks: i32,
    #[serde(default)]
    pub(crate) feedback: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EvaluationReportResponse {
    pub(crate) roll_number: String,
    pub(crate) exam_name: String,
    pub(crate) subject: String,
    pub(crate) marks_obtained: Option<f64>,
    pub(crate) total_marks: Option<i32>,
    pub(crate) feedback: Option<String>,
    pub(crate) evaluation_method: Option<EvaluationMethod>,
    pub(crate) evaluated_at: Option<String>,
}

fn default_total_marks() -> i32 {
    100
}
