use crate::page::Page;

/// One numbered block of advice.
#[derive(Debug)]
pub struct PrecautionSection {
    pub heading: &'static str,
    pub intro: &'static str,
    pub points: &'static [&'static str],
}

/// Static guidance shown after a diagnosis.
#[derive(Debug)]
pub struct PrecautionGuide {
    pub title: &'static str,
    pub sections: &'static [PrecautionSection],
}

pub static CANCER_PATIENT: PrecautionGuide = PrecautionGuide {
    title: "Precautions for Pancreatic Cancer",
    sections: &[
        PrecautionSection {
            heading: "Maintain a Healthy Diet",
            intro: "Eating a balanced and nutritious diet is crucial during and after pancreatic cancer treatment. Focus on:",
            points: &[
                "High-protein foods (lean meats, fish, eggs, legumes) to help repair tissues and fight infection.",
                "Fresh fruits and vegetables rich in antioxidants and vitamins.",
                "Whole grains for sustained energy.",
                "Healthy fats (olive oil, nuts, seeds, avocado) to support overall wellness.",
                "Staying hydrated with water and natural fluids like herbal teas or clear broths.",
            ],
        },
        PrecautionSection {
            heading: "Avoid Smoking and Alcohol",
            intro: "Smoking and alcohol can worsen symptoms and interfere with treatment:",
            points: &[
                "Smoking is a major risk factor for pancreatic and other cancers.",
                "Alcohol can stress the liver and pancreas, increasing complications.",
            ],
        },
        PrecautionSection {
            heading: "Regular Health Checkups",
            intro: "Routine medical follow-ups help monitor your progress and detect any complications early:",
            points: &[
                "Track treatment response, side effects, and nutritional status.",
                "Early detection of recurrence or new health issues.",
                "Adjust medications or dietary plans as needed.",
            ],
        },
        PrecautionSection {
            heading: "Exercise Regularly",
            intro: "Physical activity improves strength, reduces fatigue, and boosts mental health:",
            points: &[
                "Gentle exercises like walking, stretching, or yoga can be beneficial.",
                "Consult your doctor or physiotherapist for a personalized plan.",
            ],
        },
    ],
};

pub static HEALTHY_LIFE: PrecautionGuide = PrecautionGuide {
    title: "Precautions for a Healthy Life",
    sections: &[
        PrecautionSection {
            heading: "Maintain a Healthy Diet",
            intro: "A nutritious diet fuels your body and mind. Focus on:",
            points: &[
                "Plenty of fresh fruits and vegetables",
                "Whole grains like brown rice, oats, and whole wheat",
                "Lean proteins such as chicken, fish, beans, and nuts",
                "Healthy fats from sources like olive oil, avocados, and seeds",
                "Staying hydrated by drinking enough water throughout the day",
            ],
        },
        PrecautionSection {
            heading: "Avoid Smoking and Alcohol",
            intro: "Cutting out tobacco and limiting alcohol greatly reduces health risks:",
            points: &[
                "Smoking is linked to cancer, heart disease, and lung conditions",
                "Excessive alcohol can damage the liver, heart, and brain",
            ],
        },
        PrecautionSection {
            heading: "Regular Health Checkups",
            intro: "Don't wait until you're sick to see a doctor. Routine checkups help:",
            points: &[
                "Catch potential health issues early",
                "Monitor vital signs, cholesterol, blood pressure, and blood sugar",
                "Keep vaccinations and screenings up to date",
            ],
        },
        PrecautionSection {
            heading: "Exercise Regularly",
            intro: "Staying active improves physical and mental well-being:",
            points: &[
                "Aim for at least 30 minutes of moderate activity most days",
                "Mix cardio (like walking or biking) with strength and flexibility exercises",
                "Physical activity helps control weight, reduce stress, and boost energy",
            ],
        },
    ],
};

/// Guide rendered on a precaution page, if `page` is one.
pub fn guide_for(page: Page) -> Option<&'static PrecautionGuide> {
    match page {
        Page::PrecautionCancer => Some(&CANCER_PATIENT),
        Page::PrecautionHealthy => Some(&HEALTHY_LIFE),
        _ => None,
    }
}

impl PrecautionGuide {
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        for (idx, section) in self.sections.iter().enumerate() {
            out.push_str(&format!(
                "\n**{}. {}**\n{}\n",
                idx + 1,
                section.heading,
                section.intro
            ));
            for point in section.points {
                out.push_str(&format!("- {point}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_precaution_pages_have_guides() {
        for page in Page::ALL {
            let expected = matches!(page, Page::PrecautionCancer | Page::PrecautionHealthy);
            assert_eq!(guide_for(page).is_some(), expected, "{page}");
        }
    }

    #[test]
    fn markdown_numbers_sections() {
        let md = HEALTHY_LIFE.to_markdown();
        assert!(md.starts_with("# Precautions for a Healthy Life\n"));
        assert!(md.contains("**1. Maintain a Healthy Diet**"));
        assert!(md.contains("**4. Exercise Regularly**"));
        assert!(md.contains("- Keep vaccinations and screenings up to date\n"));
    }

    #[test]
    fn both_guides_cover_four_topics() {
        assert_eq!(CANCER_PATIENT.sections.len(), 4);
        assert_eq!(HEALTHY_LIFE.sections.len(), 4);
    }
}
