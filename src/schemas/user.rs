use serde::Deserialize;

use crate::db::types::UserRole;

#[derive(Debug, Deserialize)]
pub(crate) struct UserCreate {
    #[serde(alias = "full_name", alias = "fullName")]
    pub(crate) fullname: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserLogin {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) role: UserRole,
}
