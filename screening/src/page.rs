use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Welcome,
    Login,
    PatientDetails,
    UploadImage,
    Processing,
    Result,
    PrecautionCancer,
    PrecautionHealthy,
}

/// Every legal `(from, to)` edge. Anything else is rejected by the session.
pub const TRANSITIONS: &[(Page, Page)] = &[
    (Page::Welcome, Page::Login),
    (Page::Login, Page::PatientDetails),
    (Page::PatientDetails, Page::UploadImage),
    (Page::UploadImage, Page::Processing),
    (Page::Processing, Page::Result),
    // pipeline failure
    (Page::Processing, Page::UploadImage),
    (Page::Result, Page::UploadImage),
    (Page::Result, Page::PatientDetails),
    (Page::Result, Page::PrecautionCancer),
    (Page::Result, Page::PrecautionHealthy),
    (Page::PrecautionCancer, Page::Result),
    (Page::PrecautionHealthy, Page::Result),
];

impl Page {
    pub const ALL: [Page; 8] = [
        Page::Welcome,
        Page::Login,
        Page::PatientDetails,
        Page::UploadImage,
        Page::Processing,
        Page::Result,
        Page::PrecautionCancer,
        Page::PrecautionHealthy,
    ];

    pub fn can_transition_to(self, next: Page) -> bool {
        TRANSITIONS.contains(&(self, next))
    }

    /// Pages reachable in one step from `self`.
    pub fn successors(self) -> impl Iterator<Item = Page> {
        TRANSITIONS
            .iter()
            .filter(move |(from, _)| *from == self)
            .map(|(_, to)| *to)
    }

    /// Pages that move on by themselves rather than waiting for the user.
    pub fn is_automatic(self) -> bool {
        matches!(self, Page::Welcome | Page::Processing)
    }

    /// Everything past the login page needs an authenticated session.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Page::Welcome | Page::Login)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Welcome => "welcome",
            Page::Login => "login",
            Page::PatientDetails => "patient_details",
            Page::UploadImage => "upload_image",
            Page::Processing => "processing",
            Page::Result => "result",
            Page::PrecautionCancer => "precaution_cancer",
            Page::PrecautionHealthy => "precaution_healthy",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
