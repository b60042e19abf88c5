use image::{ImageFormat, Rgb, RgbImage};
use ml::{DiagnosisLabel, DiagnosisPipeline, FixedRisk, INPUT_SIZE, InputTensor, ScoreModel};
use screening::{
    Action, Credentials, FlowController, FlowError, ImageUpload, NoPacer, Page, PageView, Pacing,
    PatientForm, Session, StaticCredentials, UploadStore,
};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

/// Scores 0.7 after checking it was handed a full-size NHWC tensor.
struct CheckedScore;

impl ScoreModel for CheckedScore {
    fn score(&self, input: &InputTensor) -> anyhow::Result<f32> {
        anyhow::ensure!(
            input.shape() == [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3],
            "unexpected shape {:?}",
            input.shape()
        );
        Ok(0.7)
    }
}

fn setup() -> (FlowController, TempDir) {
    let uploads = tempfile::tempdir().unwrap();
    let controller = FlowController::new(
        Arc::new(StaticCredentials::new("admin", "1234")),
        Arc::new(DiagnosisPipeline::new(CheckedScore, FixedRisk(42))),
        UploadStore::new(uploads.path()),
        Arc::new(NoPacer),
        Pacing::default(),
    );
    (controller, uploads)
}

fn patient() -> PatientForm {
    PatientForm {
        name: "Ada Lovelace".into(),
        age: 45,
        gender: "female".into(),
        blood_group: "O+".into(),
        height_cm: 170,
        weight_kg: 60,
        smoking_history: "no".into(),
        family_history: "yes".into(),
    }
}

fn ct_png() -> ImageUpload {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::from_fn(300, 200, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    ImageUpload::new("ct_scan.png", buf.into_inner())
}

#[test]
fn welcome_moves_to_login_by_itself() {
    let (controller, _uploads) = setup();
    let mut session = Session::new();

    assert!(matches!(
        controller.view(&session).unwrap(),
        PageView::Welcome { .. }
    ));
    assert_eq!(controller.advance(&mut session).unwrap(), Page::Login);
    assert!(matches!(controller.view(&session).unwrap(), PageView::Login));
}

#[test]
fn wrong_password_is_reported_and_page_kept() {
    let (controller, _uploads) = setup();
    let mut session = Session::new();
    controller.advance(&mut session).unwrap();

    let err = controller
        .dispatch(
            &mut session,
            Action::SubmitCredentials(Credentials::new("admin", "12345")),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(session.current_page(), Page::Login);
}

#[test]
fn full_visit_produces_cancer_diagnosis() {
    let (controller, uploads) = setup();
    let mut session = Session::new();

    controller.advance(&mut session).unwrap();
    controller
        .dispatch(
            &mut session,
            Action::SubmitCredentials(Credentials::new("admin", "1234")),
        )
        .unwrap();
    assert_eq!(
        controller
            .dispatch(&mut session, Action::SubmitPatient(patient()))
            .unwrap(),
        Page::UploadImage
    );
    assert_eq!(
        controller
            .dispatch(&mut session, Action::Upload(ct_png()))
            .unwrap(),
        Page::Processing
    );

    let stored = session.uploaded_image().unwrap().path.clone();
    assert!(stored.starts_with(uploads.path().join(session.id().to_string())));

    assert_eq!(controller.advance(&mut session).unwrap(), Page::Result);
    match controller.view(&session).unwrap() {
        PageView::Result {
            patient: record,
            diagnosis,
            precaution,
        } => {
            assert_eq!(record, patient().validate().unwrap());
            assert_eq!(record.age, 45);
            assert_eq!(diagnosis.label, DiagnosisLabel::CancerDetected);
            assert!((diagnosis.score - 0.7).abs() < 1e-6);
            assert!((diagnosis.confidence_pct - 70.0).abs() < 1e-3);
            assert!(diagnosis.future_risk_pct.is_none());
            assert_eq!(precaution, Page::PrecautionCancer);
        }
        other => panic!("expected the result view, got {other:?}"),
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_page, Page::Result);
    assert_eq!(snapshot.diagnosis.unwrap().image, stored);

    controller.uploads().discard(session.id()).unwrap();
    assert!(!stored.exists());
}

#[test]
fn cannot_skip_ahead_to_upload_without_login() {
    let (controller, _uploads) = setup();
    let mut session = Session::new();
    controller.advance(&mut session).unwrap();

    let err = controller
        .dispatch(&mut session, Action::Upload(ct_png()))
        .unwrap_err();
    assert!(matches!(err, FlowError::UnexpectedAction { .. }));
    assert_eq!(session.current_page(), Page::Login);
}

#[test]
fn second_image_replaces_the_first_diagnosis() {
    let (controller, _uploads) = setup();
    let mut session = Session::new();
    controller.advance(&mut session).unwrap();
    controller
        .dispatch(
            &mut session,
            Action::SubmitCredentials(Credentials::new("admin", "1234")),
        )
        .unwrap();
    controller
        .dispatch(&mut session, Action::SubmitPatient(patient()))
        .unwrap();
    controller
        .dispatch(&mut session, Action::Upload(ct_png()))
        .unwrap();
    controller.advance(&mut session).unwrap();

    controller.dispatch(&mut session, Action::Restart).unwrap();
    assert!(session.diagnosis().is_none());

    let mut second = ct_png();
    second.file_name = "follow_up.jpg".into();
    // jpg name with png bytes still decodes
    controller
        .dispatch(&mut session, Action::Upload(second))
        .unwrap();
    controller.advance(&mut session).unwrap();

    let record = session.diagnosis().unwrap();
    assert!(record.image.ends_with("follow_up.jpg"));
    assert!(session.current_diagnosis().is_ok());
}
