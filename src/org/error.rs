use thiserror::Error;

/// Response class of an [`OrgError`], matching how callers report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    NotFound,
    BadRequest,
    Internal,
}

#[derive(Debug, Error)]
pub(crate) enum OrgError {
    #[error("Department with ID {0} not found")]
    DepartmentNotFound(i64),

    #[error("Parent department with ID {0} not found")]
    ParentNotFound(i64),

    #[error("Department cannot be its own parent")]
    SelfParent,

    #[error("Cannot move department under its own descendant")]
    Cycle,

    #[error("Cannot edit budget of non-leaf departments")]
    NonLeafBudget(i64),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl OrgError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Self::DepartmentNotFound(_) | Self::ParentNotFound(_) => ErrorKind::NotFound,
            // Reported as not-found for compatibility with existing clients.
            Self::NonLeafBudget(_) => ErrorKind::NotFound,
            Self::SelfParent | Self::Cycle | Self::Invalid(_) => ErrorKind::BadRequest,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}
