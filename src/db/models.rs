use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{EvaluationMethod, KeyType, SheetType, SubmissionStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AnswerKey {
    pub(crate) id: String,
    pub(crate) exam_name: String,
    pub(crate) subject: String,
    pub(crate) total_marks: i32,
    pub(crate) key_type: KeyType,
    pub(crate) filename: String,
    pub(crate) file_path: String,
    pub(crate) file_url: String,
    pub(crate) teacher_email: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
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
    pub(crate) evaluated_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SubmissionFile {
    pub(crate) id: String,
    pub(crate) submission_id: String,
    pub(crate) filename: String,
    pub(crate) file_path: String,
    pub(crate) file_url: String,
    pub(crate) file_size: i64,
    pub(crate) mime_type: String,
    pub(crate) order_index: i32,
    pub(crate) uploaded_at: PrimitiveDateTime,
}
