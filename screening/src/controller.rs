use crate::auth::{Authenticator, Credentials};
use crate::error::FlowError;
use crate::pacing::{Pacer, Pacing};
use crate::page::Page;
use crate::patient::PatientForm;
use crate::precaution;
use crate::session::{DiagnosisRecord, Session};
use crate::upload::{ACCEPTED_EXTENSIONS, ImageUpload, UploadStore};
use crate::view::{PageView, WELCOME_INTRO};
use log::{info, warn};
use ml::DiagnosisPipeline;
use std::{sync::Arc, time::Instant};

/// Something the user did on the current page.
#[derive(Debug, Clone)]
pub enum Action {
    SubmitCredentials(Credentials),
    SubmitPatient(PatientForm),
    Upload(ImageUpload),
    /// Result page: analyse another image with the same patient.
    Restart,
    /// Result page: edit the patient details.
    Back,
    /// Result page: open the precaution guide matching the diagnosis.
    ShowPrecaution,
    /// Precaution pages: return to the result.
    BackToResult,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SubmitCredentials(_) => "login",
            Action::SubmitPatient(_) => "patient form",
            Action::Upload(_) => "upload",
            Action::Restart => "restart",
            Action::Back => "back",
            Action::ShowPrecaution => "precaution",
            Action::BackToResult => "back to result",
        }
    }
}

/// Drives a [`Session`] through the wizard.
///
/// The controller holds only shared, read-only collaborators, so one instance
/// can serve any number of sessions.
pub struct FlowController {
    auth: Arc<dyn Authenticator>,
    pipeline: Arc<DiagnosisPipeline>,
    uploads: UploadStore,
    pacer: Arc<dyn Pacer>,
    pacing: Pacing,
}

impl FlowController {
    pub fn new(
        auth: Arc<dyn Authenticator>,
        pipeline: Arc<DiagnosisPipeline>,
        uploads: UploadStore,
        pacer: Arc<dyn Pacer>,
        pacing: Pacing,
    ) -> Self {
        Self {
            auth,
            pipeline,
            uploads,
            pacer,
            pacing,
        }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Runs the entry action of an automatic page (welcome, processing) and
    /// moves on. Other pages answer with [`FlowError::AwaitingInput`].
    pub fn advance(&self, session: &mut Session) -> Result<Page, FlowError> {
        match session.current_page() {
            Page::Welcome => {
                self.pacer.pause(self.pacing.welcome);
                session.transition_to(Page::Login)?;
            }
            Page::Processing => self.process(session)?,
            page => return Err(FlowError::AwaitingInput(page)),
        }
        Ok(session.current_page())
    }

    /// Applies a user action to the current page.
    ///
    /// On error the session stays on the page it was on.
    pub fn dispatch(&self, session: &mut Session, action: Action) -> Result<Page, FlowError> {
        match (session.current_page(), action) {
            (Page::Login, Action::SubmitCredentials(credentials)) => {
                self.login(session, &credentials)?
            }
            (Page::PatientDetails, Action::SubmitPatient(form)) => {
                self.save_patient(session, &form)?
            }
            (Page::UploadImage, Action::Upload(upload)) => self.upload(session, &upload)?,
            (Page::Result, Action::Restart) => session.restart()?,
            (Page::Result, Action::Back) => session.transition_to(Page::PatientDetails)?,
            (Page::Result, Action::ShowPrecaution) => {
                let next = precaution_page(session)?;
                session.transition_to(next)?;
            }
            (Page::PrecautionCancer | Page::PrecautionHealthy, Action::BackToResult) => {
                session.transition_to(Page::Result)?
            }
            (page, action) => {
                return Err(FlowError::UnexpectedAction {
                    page,
                    action: action.name(),
                });
            }
        }
        Ok(session.current_page())
    }

    /// Data for rendering the current page.
    pub fn view(&self, session: &Session) -> Result<PageView, FlowError> {
        let view = match session.current_page() {
            Page::Welcome => PageView::Welcome {
                intro: WELCOME_INTRO,
            },
            Page::Login => PageView::Login,
            Page::PatientDetails => PageView::PatientDetails {
                previous: session.patient_record().cloned(),
            },
            Page::UploadImage => PageView::UploadImage {
                accepted_extensions: &ACCEPTED_EXTENSIONS,
            },
            Page::Processing => PageView::Processing,
            Page::Result => PageView::Result {
                patient: session
                    .patient_record()
                    .cloned()
                    .ok_or(FlowError::MissingPatientRecord)?,
                diagnosis: session.current_diagnosis()?.clone(),
                precaution: precaution_page(session)?,
            },
            page @ (Page::PrecautionCancer | Page::PrecautionHealthy) => PageView::Precaution {
                page,
                guide: precaution::guide_for(page).ok_or(FlowError::AwaitingInput(page))?,
            },
        };
        Ok(view)
    }

    fn login(&self, session: &mut Session, credentials: &Credentials) -> Result<(), FlowError> {
        if !self.auth.validate(credentials) {
            warn!(
                "session {}: rejected login for {:?}",
                session.id(),
                credentials.username
            );
            return Err(FlowError::InvalidCredentials);
        }

        info!("session {}: signed in as {}", session.id(), credentials.username);
        session.mark_authenticated();
        self.pacer.pause(self.pacing.login);
        session.transition_to(Page::PatientDetails)
    }

    fn save_patient(&self, session: &mut Session, form: &PatientForm) -> Result<(), FlowError> {
        session.check_transition(Page::UploadImage)?;
        let record = form.validate()?;
        session.set_patient_record(record);
        self.pacer.pause(self.pacing.patient_details);
        session.transition_to(Page::UploadImage)
    }

    fn upload(&self, session: &mut Session, upload: &ImageUpload) -> Result<(), FlowError> {
        if session.patient_record().is_none() {
            return Err(FlowError::MissingPatientRecord);
        }
        session.check_transition(Page::Processing)?;

        let stored = self.uploads.store(session.id(), upload)?;
        session.bind_upload(stored);
        self.pacer.pause(self.pacing.upload);
        session.transition_to(Page::Processing)
    }

    /// Runs the pipeline once, then holds the processing page for whatever is
    /// left of its minimum duration.
    fn process(&self, session: &mut Session) -> Result<(), FlowError> {
        if session.patient_record().is_none() {
            return Err(FlowError::MissingPatientRecord);
        }
        let image = session
            .uploaded_image()
            .cloned()
            .ok_or(FlowError::MissingUpload)?;

        let started = Instant::now();
        match self.pipeline.diagnose_path(&image.path) {
            Ok(diagnosis) => {
                info!(
                    "session {}: {} -> {} ({:.2}%)",
                    session.id(),
                    image.file_name,
                    diagnosis.label,
                    diagnosis.confidence_pct
                );
                session.set_diagnosis(DiagnosisRecord {
                    diagnosis,
                    image: image.path,
                });
                self.pacer
                    .pause(self.pacing.processing.saturating_sub(started.elapsed()));
                session.transition_to(Page::Result)
            }
            Err(err) => {
                warn!("session {}: analysis of {} failed: {err}", session.id(), image.file_name);
                session.clear_upload();
                session.transition_to(Page::UploadImage)?;
                Err(FlowError::Pipeline(err))
            }
        }
    }
}

fn precaution_page(session: &Session) -> Result<Page, FlowError> {
    let diagnosis = session.current_diagnosis()?;
    Ok(if diagnosis.is_cancer() {
        Page::PrecautionCancer
    } else {
        Page::PrecautionHealthy
    })
}
