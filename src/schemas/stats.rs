use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct TeacherStatsResponse {
    pub(crate) total_exams: i64,
    pub(crate) total_submissions: i64,
    pub(crate) evaluated: i64,
    pub(crate) pending: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentStatsResponse {
    pub(crate) total_submissions: i64,
    pub(crate) evaluated: i64,
    pub(crate) pending: i64,
    pub(crate) average_percentage: f64,
}
