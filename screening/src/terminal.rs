use anyhow::{Result, bail};
use screening::{
    Action, BloodGroup, Credentials, FlowController, Gender, ImageUpload, PageView, PatientForm,
    PatientRecord, Session, YesNo,
};
use std::io::{BufRead, Write};
use std::path::Path;

/// Line-oriented front-end. Returns when the user types `q` or input ends.
pub fn run(
    controller: &FlowController,
    session: &mut Session,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    loop {
        let view = match controller.view(session) {
            Ok(view) => view,
            Err(err) => bail!("cannot render the {} page: {err}", session.current_page()),
        };
        let page = view.page();
        render(&view, &mut out)?;

        if page.is_automatic() {
            if let Err(err) = controller.advance(session) {
                writeln!(out, "Error: {err}")?;
                if session.current_page() == page {
                    bail!("stuck on the {page} page: {err}");
                }
            }
            continue;
        }

        let Some(action) = read_action(&view, &mut input, &mut out)? else {
            writeln!(out, "Goodbye.")?;
            return Ok(());
        };
        match controller.dispatch(session, action) {
            Ok(next) if next == page => {}
            Ok(_) => writeln!(out, "Done.")?,
            Err(err) => writeln!(out, "Error: {err}")?,
        }
    }
}

fn render(view: &PageView, out: &mut impl Write) -> Result<()> {
    writeln!(out)?;
    match view {
        PageView::Welcome { intro } => {
            writeln!(out, "== Pancreatic Cancer Detection ==")?;
            writeln!(out, "{intro}")?;
        }
        PageView::Login => writeln!(out, "== Login ==")?,
        PageView::PatientDetails { previous } => {
            writeln!(out, "== Patient Details ==")?;
            if previous.is_some() {
                writeln!(out, "(press enter to keep the saved value)")?;
            }
        }
        PageView::UploadImage {
            accepted_extensions,
        } => {
            writeln!(out, "== Upload CT Image ==")?;
            writeln!(out, "Accepted types: {}", accepted_extensions.join(", "))?;
        }
        PageView::Processing => writeln!(out, "Processing... please wait")?,
        PageView::Result {
            patient, diagnosis, ..
        } => {
            writeln!(out, "== Diagnosis Result ==")?;
            for (label, value) in patient.display_fields() {
                writeln!(out, "{label:>15}: {value}")?;
            }
            writeln!(out, "{:>15}: {}", "Diagnosis", diagnosis.label)?;
            writeln!(out, "{:>15}: {:.2}%", "Confidence", diagnosis.confidence_pct)?;
            if let Some(risk) = diagnosis.future_risk_pct {
                writeln!(
                    out,
                    "{:>15}: {risk}% (placeholder, not a prediction)",
                    "Future Risk"
                )?;
            }
        }
        PageView::Precaution { guide, .. } => write!(out, "{}", guide.to_markdown())?,
    }
    Ok(())
}

fn read_action(
    view: &PageView,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<Action>> {
    let action = match view {
        PageView::Login => {
            let Some(username) = prompt(input, out, "Username: ")? else {
                return Ok(None);
            };
            let Some(password) = prompt(input, out, "Password: ")? else {
                return Ok(None);
            };
            Action::SubmitCredentials(Credentials::new(username, password))
        }
        PageView::PatientDetails { previous } => match read_form(previous.as_ref(), input, out)? {
            Some(form) => Action::SubmitPatient(form),
            None => return Ok(None),
        },
        PageView::UploadImage { .. } => loop {
            let Some(path) = prompt(input, out, "Path to CT image (q to quit): ")? else {
                return Ok(None);
            };
            if path == "q" {
                return Ok(None);
            }
            match ImageUpload::from_path(Path::new(&path)) {
                Ok(upload) => break Action::Upload(upload),
                Err(err) => writeln!(out, "Error: cannot read {path}: {err}")?,
            }
        },
        PageView::Result { .. } => loop {
            let choice = prompt(
                input,
                out,
                "[r] new image  [b] edit patient  [p] precautions  [q] quit: ",
            )?;
            match choice.as_deref() {
                Some("r") => break Action::Restart,
                Some("b") => break Action::Back,
                Some("p") => break Action::ShowPrecaution,
                Some("q") | None => return Ok(None),
                Some(other) => writeln!(out, "Unknown choice {other:?}")?,
            }
        },
        PageView::Precaution { .. } => loop {
            match prompt(input, out, "[b] back to result  [q] quit: ")?.as_deref() {
                Some("b") => break Action::BackToResult,
                Some("q") | None => return Ok(None),
                Some(other) => writeln!(out, "Unknown choice {other:?}")?,
            }
        },
        PageView::Welcome { .. } | PageView::Processing => return Ok(None),
    };
    Ok(Some(action))
}

fn read_form(
    previous: Option<&PatientRecord>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<PatientForm>> {
    let saved = previous.map(PatientForm::from).unwrap_or_default();
    let has_saved = previous.is_some();

    let genders = Gender::ALL.map(Gender::as_str).join("/");
    let blood_groups = BloodGroup::ALL.map(BloodGroup::as_str).join("/");
    let yes_no = YesNo::ALL.map(YesNo::as_str).join("/");

    macro_rules! text {
        ($label:expr, $saved:expr) => {
            match prompt(input, out, &format!("{}: ", $label))? {
                None => return Ok(None),
                Some(value) if value.is_empty() && has_saved => $saved.clone(),
                Some(value) => value,
            }
        };
    }
    macro_rules! number {
        ($label:expr, $saved:expr) => {
            loop {
                let Some(value) = prompt(input, out, &format!("{}: ", $label))? else {
                    return Ok(None);
                };
                if value.is_empty() && has_saved {
                    break $saved;
                }
                match value.parse::<i64>() {
                    Ok(number) => break number,
                    Err(_) => writeln!(out, "Please enter a whole number")?,
                }
            }
        };
    }

    Ok(Some(PatientForm {
        name: text!("Name", saved.name),
        age: number!("Age", saved.age),
        gender: text!(format!("Gender ({genders})"), saved.gender),
        blood_group: text!(format!("Blood group ({blood_groups})"), saved.blood_group),
        height_cm: number!("Height (cm)", saved.height_cm),
        weight_kg: number!("Weight (kg)", saved.weight_kg),
        smoking_history: text!(format!("Smoking history ({yes_no})"), saved.smoking_history),
        family_history: text!(format!("Family history ({yes_no})"), saved.family_history),
    }))
}

/// Prints `label` and reads one trimmed line; `None` at end of input.
fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
