use crate::page::Page;
use crate::patient::PatientRecord;
use crate::precaution::PrecautionGuide;
use ml::Diagnosis;

/// Everything a front-end needs to draw the current page.
#[derive(Debug, Clone)]
pub enum PageView {
    Welcome {
        intro: &'static str,
    },
    Login,
    PatientDetails {
        /// Last saved record, to pre-fill the form when coming back from the result page.
        previous: Option<PatientRecord>,
    },
    UploadImage {
        accepted_extensions: &'static [&'static str],
    },
    Processing,
    Result {
        patient: PatientRecord,
        diagnosis: Diagnosis,
        /// Which precaution page the "precaution" button leads to.
        precaution: Page,
    },
    Precaution {
        page: Page,
        guide: &'static PrecautionGuide,
    },
}

pub const WELCOME_INTRO: &str =
    "This application helps in detecting Pancreatic Cancer using AI.";

impl PageView {
    pub fn page(&self) -> Page {
        match self {
            PageView::Welcome { .. } => Page::Welcome,
            PageView::Login => Page::Login,
            PageView::PatientDetails { .. } => Page::PatientDetails,
            PageView::UploadImage { .. } => Page::UploadImage,
            PageView::Processing => Page::Processing,
            PageView::Result { .. } => Page::Result,
            PageView::Precaution { page, .. } => *page,
        }
    }
}
