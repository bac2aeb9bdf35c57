use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod auth;
pub(crate) mod stats;
pub(crate) mod submission;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamEntryResponse {
    pub(crate) exam_name: String,
    pub(crate) subject: String,
    pub(crate) filename: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamsResponse {
    pub(crate) exams: Vec<ExamEntryResponse>,
}
