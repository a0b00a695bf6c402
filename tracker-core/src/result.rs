use error_stack::Report;

pub type RepoResult<T, E> = Result<T, Report<E>>;
pub type OptRepoResult<T, E> = Result<Option<T>, Report<E>>;

#[derive(Debug, thiserror::Error)]
pub enum DefectRepoError {
    #[error("failed to get defect")]
    Get,
    #[error("failed to list defects")]
    List,
    #[error("failed to create defect")]
    Create,
    #[error("failed to patch defect")]
    Patch,
    #[error("failed to change defect status")]
    ChangeStatus,
    #[error("failed to assign defect")]
    Assign,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewRepoError {
    #[error("failed to get review")]
    Get,
    #[error("failed to list reviews")]
    List,
    #[error("failed to create review")]
    Create,
    #[error("failed to update review likes")]
    UpdateLikes,
    #[error("failed to update review comments")]
    UpdateComments,
    #[error("failed to delete review")]
    Delete,
}

#[derive(Debug, thiserror::Error)]
pub enum AchievementRepoError {
    #[error("failed to get achievement")]
    Get,
    #[error("failed to list achievements")]
    List,
    #[error("failed to look up achievement by {0}")]
    FindBy(&'static str),
    #[error("failed to create achievement")]
    Create,
    #[error("failed to update achievement")]
    Update,
    #[error("failed to delete achievement")]
    Delete,
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectRepoError {
    #[error("failed to get project")]
    Get,
    #[error("failed to create project")]
    Create,
}

#[derive(Debug, thiserror::Error)]
pub enum UserRepoError {
    #[error("failed to get user")]
    Get,
}
