// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Job {job_id} has no niche")]
    MissingNiche { job_id: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
