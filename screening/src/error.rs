use crate::page::Page;
use crate::patient::FormError;
use crate::upload::UploadError;
use ml::PipelineError;
use thiserror::Error;

/// Recoverable errors surfaced on the current page. The session is left where it was
/// unless stated otherwise.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("please sign in first")]
    NotAuthenticated,

    #[error("invalid patient details: {0}")]
    InvalidPatient(#[from] FormError),

    #[error("upload rejected: {0}")]
    Upload(#[from] UploadError),

    #[error("patient details must be saved before an image can be analysed")]
    MissingPatientRecord,

    #[error("no uploaded image to analyse")]
    MissingUpload,

    /// The session has been sent back to the upload page.
    #[error("analysis failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("no diagnosis is available yet")]
    MissingDiagnosis,

    #[error("the stored diagnosis belongs to a different image")]
    StaleDiagnosis,

    #[error("cannot move from {from} to {to}")]
    IllegalTransition { from: Page, to: Page },

    #[error("{action} is not available on the {page} page")]
    UnexpectedAction { page: Page, action: &'static str },

    #[error("the {0} page is waiting for user input")]
    AwaitingInput(Page),
}
