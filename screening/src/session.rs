use crate::error::FlowError;
use crate::page::Page;
use crate::patient::PatientRecord;
use log::debug;
use ml::Diagnosis;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// An image accepted by the upload page and stored for this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub path: PathBuf,
    pub file_name: String,
}

/// A diagnosis together with the image that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisRecord {
    pub diagnosis: Diagnosis,
    pub image: PathBuf,
}

/// Per-visit state of the wizard. Owned by the caller and handed to the
/// controller as `&mut`; sessions never share mutable state.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    current_page: Page,
    authenticated: bool,
    patient_record: Option<PatientRecord>,
    uploaded_image: Option<UploadedImage>,
    diagnosis: Option<DiagnosisRecord>,
}

/// Read-only copy of a [`Session`] for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub current_page: Page,
    pub authenticated: bool,
    pub patient_record: Option<PatientRecord>,
    pub uploaded_image: Option<UploadedImage>,
    pub diagnosis: Option<DiagnosisRecord>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session on the welcome page.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            current_page: Page::Welcome,
            authenticated: false,
            patient_record: None,
            uploaded_image: None,
            diagnosis: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current_page(&self) -> Page {
        self.current_page
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn patient_record(&self) -> Option<&PatientRecord> {
        self.patient_record.as_ref()
    }

    pub fn uploaded_image(&self) -> Option<&UploadedImage> {
        self.uploaded_image.as_ref()
    }

    pub fn diagnosis(&self) -> Option<&DiagnosisRecord> {
        self.diagnosis.as_ref()
    }

    /// The diagnosis, provided it was produced from the currently uploaded image.
    pub fn current_diagnosis(&self) -> Result<&Diagnosis, FlowError> {
        match (&self.diagnosis, &self.uploaded_image) {
            (Some(record), Some(image)) if record.image == image.path => Ok(&record.diagnosis),
            (Some(_), _) => Err(FlowError::StaleDiagnosis),
            (None, _) => Err(FlowError::MissingDiagnosis),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            current_page: self.current_page,
            authenticated: self.authenticated,
            patient_record: self.patient_record.clone(),
            uploaded_image: self.uploaded_image.clone(),
            diagnosis: self.diagnosis.clone(),
        }
    }

    /// Checks that `next` is a legal edge from the current page and that the
    /// session may see it, without moving.
    pub(crate) fn check_transition(&self, next: Page) -> Result<(), FlowError> {
        if !self.current_page.can_transition_to(next) {
            return Err(FlowError::IllegalTransition {
                from: self.current_page,
                to: next,
            });
        }
        if next.requires_auth() && !self.authenticated {
            return Err(FlowError::NotAuthenticated);
        }
        Ok(())
    }

    pub(crate) fn transition_to(&mut self, next: Page) -> Result<(), FlowError> {
        self.check_transition(next)?;
        debug!("session {}: {} -> {}", self.id, self.current_page, next);
        self.current_page = next;
        Ok(())
    }

    pub(crate) fn mark_authenticated(&mut self) {
        self.authenticated = true;
    }

    pub(crate) fn set_patient_record(&mut self, record: PatientRecord) {
        self.patient_record = Some(record);
    }

    /// Binds a new upload; any earlier diagnosis no longer applies.
    pub(crate) fn bind_upload(&mut self, image: UploadedImage) {
        self.uploaded_image = Some(image);
        self.diagnosis = None;
    }

    pub(crate) fn clear_upload(&mut self) {
        self.uploaded_image = None;
        self.diagnosis = None;
    }

    pub(crate) fn set_diagnosis(&mut self, record: DiagnosisRecord) {
        self.diagnosis = Some(record);
    }

    /// Back to the upload page, keeping the login and patient record.
    pub(crate) fn restart(&mut self) -> Result<(), FlowError> {
        self.transition_to(Page::UploadImage)?;
        self.clear_upload();
        Ok(())
    }

    /// Places a session on an arbitrary page, bypassing the transition table.
    #[cfg(test)]
    pub(crate) fn at_page(page: Page, authenticated: bool) -> Self {
        Self {
            current_page: page,
            authenticated,
            ..Self::new()
        }
    }
}
