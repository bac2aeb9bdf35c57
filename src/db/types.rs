use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Teacher,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "keytype", rename_all = "lowercase")]
pub(crate) enum KeyType {
    Descriptive,
    Mcq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sheettype", rename_all = "lowercase")]
pub(crate) enum SheetType {
    Descriptive,
    Omr,
}

impl SheetType {
    pub(crate) fn folder(self) -> &'static str {
        match self {
            SheetType::Descriptive => "descriptive",
            SheetType::Omr => "omr",
        }
    }

    pub(crate) fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "omr" => SheetType::Omr,
            _ => SheetType::Descriptive,
        }
    }
}

/// `Failed` is reserved for a future hard-failure policy; every current
/// failure path leaves the submission `Pending` so it can be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "submissionstatus", rename_all = "lowercase")]
pub(crate) enum SubmissionStatus {
    Pending,
    Evaluated,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "evaluationmethod", rename_all = "lowercase")]
pub(crate) enum EvaluationMethod {
    Ai,
    Manual,
}
