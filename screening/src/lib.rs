//! Wizard-style screening flow: an explicit page state machine that collects
//! credentials, patient details and a CT image, runs the [`ml`] diagnosis
//! pipeline once per upload and serves the matching precaution guide.
//!
//! The crate does no rendering of its own. A front-end reads a [`PageView`]
//! from [`FlowController::view`], collects an [`Action`] from the user and
//! hands it back through [`FlowController::dispatch`]; automatic pages are
//! stepped with [`FlowController::advance`].

pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod pacing;
pub mod page;
pub mod patient;
pub mod precaution;
pub mod session;
pub mod upload;
pub mod view;

pub use auth::{Authenticator, Credentials, StaticCredentials};
pub use config::{AppConfig, load_config};
pub use controller::{Action, FlowController};
pub use error::FlowError;
pub use pacing::{NoPacer, Pacer, Pacing, ThreadPacer};
pub use page::Page;
pub use patient::{BloodGroup, FormError, Gender, PatientForm, PatientRecord, YesNo};
pub use session::{DiagnosisRecord, Session, SessionSnapshot, UploadedImage};
pub use upload::{ImageUpload, UploadError, UploadStore};
pub use view::PageView;
