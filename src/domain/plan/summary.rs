//! Bounded patient summary and the plan-generation prompt.
//!
//! Every field is rendered, including absent ones, so the generator never
//! has to guess whether something was asked.

use std::fmt::{self, Write as _};

use crate::domain::classification::ClassificationResult;
use crate::domain::flow::intake::keys;
use crate::domain::flow::{AnswerValue, Answers};

/// Longest rendered value, in characters.
pub const MAX_VALUE_CHARS: usize = 500;

/// Token rendered for an absent value.
pub const NOT_PROVIDED: &str = "not provided";

const INSTRUCTIONS: &str = "You are a helpful medical AI assistant. Based on the following patient data, generate a personalized weight management plan that is strictly aligned with the NICE guideline for Overweight and Obesity Management (NG246). Write in a professional, narrative format, as if a doctor is giving advice in person. Values marked \"not provided\" were not collected; do not assume anything about them.";

const OUTPUT_FORMAT: &str = r#"Respond with ONLY a JSON object with the following string fields, each holding a paragraph or two of professional, empathetic advice:
- "assessmentSummary": summarize the assessment, explaining the BMI and waist-to-height ratio classifications and what they mean. Acknowledge the patient's goals.
- "healthyEating": analyze the patient's diet, estimate calorie intake, and weave specific recommendations into the text, referencing the foods they mentioned.
- "physicalActivity": discuss a strategy based on current activity levels and suggest 3-4 specific, suitable exercises, explaining why they fit.
- "behaviorAndMindset": discuss sleep (referencing reported sleep issues), stress management, smoking and alcohol use, and eating triggers in a supportive way.
- "treatmentConsiderations": analyze eligibility for pharmacotherapy and bariatric surgery against the NICE NG246 criteria, factoring in medications, comorbidities and contraindications. Frame this as a topic for discussion with their doctor.

The tone must be encouraging, non-stigmatizing and empathetic, as recommended by NICE. Do not use bullet points or checklists."#;

/// One titled group of summary lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySection {
    pub title: &'static str,
    pub fields: Vec<(&'static str, String)>,
}

/// Human-readable digest of the interview for the generation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    sections: Vec<SummarySection>,
}

impl PatientSummary {
    pub fn build(answers: &Answers, classification: &ClassificationResult) -> Self {
        let value = |key: &str| render(answers.get(key));
        let out_of_ten = |key: &str| match answers.number(key) {
            Some(n) => bounded(&format!("{}/10", AnswerValue::Number(n))),
            None => NOT_PROVIDED.to_string(),
        };

        let sections = vec![
            SummarySection {
                title: "Patient Demographics",
                fields: vec![
                    ("Age", value(keys::AGE)),
                    ("Gender", value(keys::GENDER)),
                    ("Gender (specified)", value("gender_other")),
                    ("Ethnicity", value(keys::ETHNICITY)),
                ],
            },
            SummarySection {
                title: "Measurements",
                fields: vec![
                    ("BMI", optional(classification.bmi.map(|bmi| format!("{:.1}", bmi)))),
                    ("BMI Class", optional(classification.bmi_class.map(|c| c.label().to_string()))),
                    ("Waist-to-Height Ratio", optional(classification.whtr.map(|r| format!("{:.2}", r)))),
                    ("Waist-to-Height Class", optional(classification.whtr_class.map(|c| c.label().to_string()))),
                ],
            },
            SummarySection {
                title: "Medical History",
                fields: vec![
                    ("Currently Pregnant/Breastfeeding", value(keys::PREGNANCY_CURRENT)),
                    ("Planning Pregnancy", value(keys::PREGNANCY_PLANNING)),
                    ("Comorbidities", value(keys::COMORBIDITIES)),
                    ("Comorbidities (specified)", value("comorbidities_other")),
                    ("Contraindications", value(keys::CONTRAINDICATIONS)),
                    ("Contraindications (specified)", value("contraindications_other")),
                    ("Current Medications", value(keys::MEDICATIONS)),
                ],
            },
            SummarySection {
                title: "Dietary Intake",
                fields: vec![
                    ("Breakfast", value(keys::DIET_BREAKFAST)),
                    ("Lunch", value(keys::DIET_LUNCH)),
                    ("Dinner", value(keys::DIET_DINNER)),
                    ("Snacks/Beverages", value(keys::DIET_SNACKS)),
                    ("Portions", value(keys::DIET_PORTIONS)),
                ],
            },
            SummarySection {
                title: "Activity Levels",
                fields: vec![
                    ("Work Activity", value(keys::ACTIVITY_WORK)),
                    ("Planned Exercise", value(keys::ACTIVITY_PLANNED)),
                    ("Daily Routine", value(keys::ACTIVITY_ROUTINE)),
                    ("Sedentary Time", value(keys::ACTIVITY_SEDENTARY)),
                    ("Overall Level", value(keys::ACTIVITY_OVERALL)),
                ],
            },
            SummarySection {
                title: "Sleep Habits",
                fields: vec![
                    ("Hours", value(keys::SLEEP_HOURS)),
                    ("Quality", value(keys::SLEEP_QUALITY)),
                    ("Issues", value(keys::SLEEP_ISSUES)),
                    ("Willing to Improve Sleep", value(keys::SLEEP_WILLINGNESS)),
                ],
            },
            SummarySection {
                title: "Lifestyle Factors",
                fields: vec![
                    ("Smoking", value(keys::SMOKING)),
                    ("Tobacco Products per Day", value(keys::SMOKING_QUANTITY)),
                    ("Interested in Cessation Support", value(keys::SMOKING_CESSATION)),
                    ("Alcohol Use", value(keys::ALCOHOL)),
                    ("Alcohol Frequency", value(keys::ALCOHOL_FREQUENCY)),
                    ("CAGE Score", cage_score(answers)),
                    ("Stress Level", out_of_ten(keys::STRESS_LEVEL)),
                    ("Eating Triggers", value(keys::EATING_TRIGGERS)),
                ],
            },
            SummarySection {
                title: "Weight Loss History",
                fields: vec![
                    ("Previous Attempts", value(keys::WEIGHT_LOSS_HISTORY)),
                    ("Methods", value(keys::WEIGHT_LOSS_METHODS)),
                    ("Medications Tried", value(keys::WEIGHT_LOSS_MEDS)),
                    ("Supervised", value(keys::WEIGHT_LOSS_SUPERVISION)),
                ],
            },
            SummarySection {
                title: "Readiness",
                fields: vec![("Willing to Make Lifestyle Changes", value(keys::READINESS))],
            },
            SummarySection {
                title: "Personal Goals",
                fields: vec![
                    ("Short-term", value(keys::GOAL_SHORT)),
                    ("Medium-term", value(keys::GOAL_MEDIUM)),
                    ("Long-term", value(keys::GOAL_LONG)),
                    ("Beyond 1 Year", value(keys::GOAL_YEAR_PLUS)),
                ],
            },
            SummarySection {
                title: "Motivation",
                fields: vec![("Motivation Level", out_of_ten(keys::MOTIVATION))],
            },
        ];

        Self { sections }
    }

    pub fn sections(&self) -> &[SummarySection] {
        &self.sections
    }

    /// Rendered value for a field label, if present.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .flat_map(|section| section.fields.iter())
            .find(|(name, _)| *name == label)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for PatientSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            let line = section
                .fields
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{}: {}", section.title, line)?;
        }
        Ok(())
    }
}

/// Full user prompt for plan generation.
pub fn plan_prompt(summary: &PatientSummary) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\n");
    // Writing to a String cannot fail.
    let _ = write!(prompt, "{}", summary);
    prompt.push('\n');
    prompt.push_str(OUTPUT_FORMAT);
    prompt
}

fn render(value: Option<&AnswerValue>) -> String {
    match value {
        Some(AnswerValue::Text(text)) if text.trim().is_empty() => NOT_PROVIDED.to_string(),
        Some(value) => bounded(&value.to_string()),
        None => NOT_PROVIDED.to_string(),
    }
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_PROVIDED.to_string())
}

/// Number of "Yes" answers to the four CAGE questions, as "n/4".
fn cage_score(answers: &Answers) -> String {
    let answered: Vec<&AnswerValue> = keys::CAGE.iter().filter_map(|key| answers.get(key)).collect();
    if answered.is_empty() {
        return NOT_PROVIDED.to_string();
    }
    let positive = answered.iter().filter(|answer| answer.is("Yes")).count();
    format!("{}/4", positive)
}

fn bounded(text: &str) -> String {
    match text.char_indices().nth(MAX_VALUE_CHARS) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
