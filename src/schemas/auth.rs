use serde::Serialize;

use crate::db::types::UserRole;

#[derive(Debug, Serialize)]
pub(crate) struct SignupResponse {
    pub(crate) message: String,
    pub(crate) access_token: String,
    pub(crate) token_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    pub(crate) message: String,
    pub(crate) redirect: String,
    pub(crate) name: String,
    pub(crate) role: UserRole,
    pub(crate) access_token: String,
    pub(crate) token_type: String,
}
