use serde::{Deserialize, Serialize};
use std::{fmt, ops::RangeInclusive, str::FromStr};
use thiserror::Error;

pub const AGE_RANGE: RangeInclusive<i64> = 1..=120;
pub const HEIGHT_CM_RANGE: RangeInclusive<i64> = 50..=250;
pub const WEIGHT_KG_RANGE: RangeInclusive<i64> = 20..=200;

/// Why a patient form was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field}: {value:?} is not one of {choices}")]
    UnknownChoice {
        field: &'static str,
        value: String,
        choices: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
        }
    }
}

/// Answer to the smoking and family-history questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub const ALL: [YesNo; 2] = [YesNo::Yes, YesNo::No];

    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

macro_rules! choice_impls {
    ($ty:ty, $field:literal, $choices:literal) => {
        impl FromStr for $ty {
            type Err = FormError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|choice| choice.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| FormError::UnknownChoice {
                        field: $field,
                        value: s.to_string(),
                        choices: $choices,
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_impls!(Gender, "gender", "Male, Female, Other");
choice_impls!(BloodGroup, "blood group", "A+, A-, B+, B-, O+, O-, AB+, AB-");
choice_impls!(YesNo, "yes/no answer", "Yes, No");

/// Raw patient form as submitted by the front-end, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientForm {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub blood_group: String,
    pub height_cm: i64,
    pub weight_kg: i64,
    pub smoking_history: String,
    pub family_history: String,
}

/// Validated patient details kept on the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub height_cm: u16,
    pub weight_kg: u16,
    pub smoking_history: YesNo,
    pub family_history: YesNo,
}

impl PatientForm {
    /// Checks ranges and choices; the first problem found is returned.
    pub fn validate(&self) -> Result<PatientRecord, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::EmptyName);
        }

        let age = in_range("age", self.age, AGE_RANGE)?;
        let height_cm = in_range("height (cm)", self.height_cm, HEIGHT_CM_RANGE)?;
        let weight_kg = in_range("weight (kg)", self.weight_kg, WEIGHT_KG_RANGE)?;

        Ok(PatientRecord {
            name: name.to_string(),
            age: age as u8,
            gender: self.gender.parse()?,
            blood_group: self.blood_group.parse()?,
            height_cm: height_cm as u16,
            weight_kg: weight_kg as u16,
            smoking_history: self.smoking_history.parse()?,
            family_history: self.family_history.parse()?,
        })
    }
}

impl From<&PatientRecord> for PatientForm {
    fn from(record: &PatientRecord) -> Self {
        Self {
            name: record.name.clone(),
            age: record.age.into(),
            gender: record.gender.to_string(),
            blood_group: record.blood_group.to_string(),
            height_cm: record.height_cm.into(),
            weight_kg: record.weight_kg.into(),
            smoking_history: record.smoking_history.to_string(),
            family_history: record.family_history.to_string(),
        }
    }
}

impl PatientRecord {
    /// Label/value pairs in display order for the result page.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Age", self.age.to_string()),
            ("Gender", self.gender.to_string()),
            ("Blood Group", self.blood_group.to_string()),
            ("Height", format!("{} cm", self.height_cm)),
            ("Weight", format!("{} kg", self.weight_kg)),
            ("Smoking", self.smoking_history.to_string()),
            ("Family History", self.family_history.to_string()),
        ]
    }
}

fn in_range(
    field: &'static str,
    value: i64,
    range: RangeInclusive<i64>,
) -> Result<i64, FormError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(FormError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
