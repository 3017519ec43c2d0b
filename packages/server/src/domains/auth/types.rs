use serde::{Deserialize, Serialize};

/// The two kinds of account that can log in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Employer,
    JobSeeker,
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKind::Employer => write!(f, "employer"),
            AccountKind::JobSeeker => write!(f, "job_seeker"),
        }
    }
}

/// Credentials posted to either login endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login: the account record and a bearer token
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse<T> {
    pub token: String,
    pub account_kind: AccountKind,
    pub account: T,
}
