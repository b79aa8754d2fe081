//! The weight-management intake interview.
//!
//! Questions follow the NICE overweight and obesity management guideline
//! (NG246): eligibility, demographics, measurements, medical history, diet,
//! activity, sleep, lifestyle, weight-loss history, motivation and goals.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::domain::classification::{
    ClassificationInput, LengthUnit, MeasurementCategory, UnitSelection,
};

use super::answer::{AnswerValue, Answers};
use super::definition::{ClarificationRule, FlowDefinition, FlowDefinitionError};
use super::step::Step;

/// Storage keys read by classification and plan generation.
pub mod keys {
    pub const GENDER: &str = "gender";
    pub const ETHNICITY: &str = "ethnicity";
    pub const PREGNANCY_CURRENT: &str = "pregnancy_current_status";
    pub const PREGNANCY_PLANNING: &str = "pregnancy_planning_status";
    pub const AGE: &str = "age";
    pub const WEIGHT: &str = "weight";
    pub const HEIGHT: &str = "height";
    pub const WAIST: &str = "waist";
    pub const COMORBIDITIES: &str = "comorbidities";
    pub const CONTRAINDICATIONS: &str = "contraindications";
    pub const MEDICATIONS: &str = "medications";
    pub const DIET_BREAKFAST: &str = "diet_breakfast";
    pub const DIET_LUNCH: &str = "diet_lunch";
    pub const DIET_DINNER: &str = "diet_dinner";
    pub const DIET_SNACKS: &str = "diet_snacks";
    pub const DIET_PORTIONS: &str = "diet_portions";
    pub const ACTIVITY_WORK: &str = "activity_work_level";
    pub const ACTIVITY_PLANNED: &str = "activity_planned_exercise";
    pub const ACTIVITY_ROUTINE: &str = "activity_daily_routine";
    pub const ACTIVITY_SEDENTARY: &str = "activity_sedentary_time";
    pub const ACTIVITY_OVERALL: &str = "activity_overall_level";
    pub const SLEEP_HOURS: &str = "sleep_hours";
    pub const SLEEP_QUALITY: &str = "sleep_quality";
    pub const SLEEP_ISSUES: &str = "sleep_issues";
    pub const SLEEP_WILLINGNESS: &str = "sleep_willingness";
    pub const SMOKING: &str = "smoking_intro";
    pub const SMOKING_QUANTITY: &str = "smoking_quantity";
    pub const SMOKING_CESSATION: &str = "smoking_cessation_interest";
    pub const ALCOHOL: &str = "alcohol_intro";
    pub const ALCOHOL_FREQUENCY: &str = "alcohol_frequency";
    pub const CAGE: [&str; 4] = ["cage1", "cage2", "cage3", "cage4"];
    pub const STRESS_LEVEL: &str = "stress_level";
    pub const EATING_TRIGGERS: &str = "eating_triggers";
    pub const WEIGHT_LOSS_HISTORY: &str = "weight_loss_history";
    pub const WEIGHT_LOSS_METHODS: &str = "weight_loss_methods";
    pub const WEIGHT_LOSS_MEDS: &str = "weight_loss_meds_specify";
    pub const WEIGHT_LOSS_SUPERVISION: &str = "weight_loss_supervision";
    pub const MOTIVATION: &str = "motivation_level";
    pub const READINESS: &str = "readiness_for_changes";
    pub const GOAL_SHORT: &str = "goal_short_term";
    pub const GOAL_MEDIUM: &str = "goal_medium_term";
    pub const GOAL_LONG: &str = "goal_long_term";
    pub const GOAL_YEAR_PLUS: &str = "goal_year_plus";
}

/// Step ids the engine and shells refer to directly.
pub mod steps {
    pub const WELCOME: &str = "welcome";
    pub const CLARIFY_OTHER: &str = "prompt_for_other_text";
    pub const SPECIFY_MEDICATION: &str = "specify_medication";
    pub const GENERATE_REPORT: &str = "generate_report";
    pub const EXIT_UNDERAGE: &str = "exit_underage";
}

pub const OTHER_MARKER: &str = "Other (please specify)";
pub const PRESCRIPTION_MARKER: &str = "Prescription medications";

const YES_NO: &[&str] = &["Yes", "No"];
const YES_NO_UNSURE: &[&str] = &["Yes", "No", "Unsure"];
const YES_NO_PREFER_NOT: &[&str] = &["Yes", "No", "Other/Prefer not to say"];

static INTAKE_FLOW: Lazy<Result<Arc<FlowDefinition>, FlowDefinitionError>> =
    Lazy::new(|| build().map(Arc::new));

/// The intake flow, validated once per process.
pub fn intake_flow() -> Result<Arc<FlowDefinition>, FlowDefinitionError> {
    INTAKE_FLOW.clone()
}

/// Pulls the classification inputs out of recorded answers.
pub fn classification_input(answers: &Answers, units: UnitSelection) -> ClassificationInput {
    ClassificationInput {
        weight: answers.number(keys::WEIGHT),
        height: answers.number(keys::HEIGHT),
        waist: answers.number(keys::WAIST),
        ethnicity: answers.text(keys::ETHNICITY).map(str::to_string),
        units,
    }
}

fn age_is_adult(answer: &AnswerValue, _: &UnitSelection) -> bool {
    answer.as_number().is_some_and(|age| age > 17.0 && age < 100.0)
}

fn weight_in_range(answer: &AnswerValue, _: &UnitSelection) -> bool {
    answer.as_number().is_some_and(|w| w > 20.0 && w < 500.0)
}

fn height_in_range(answer: &AnswerValue, units: &UnitSelection) -> bool {
    answer.as_number().is_some_and(|h| match units.height {
        LengthUnit::Cm => h > 100.0 && h < 250.0,
        LengthUnit::In => h > 40.0 && h < 100.0,
    })
}

fn not_blank(answer: &AnswerValue, _: &UnitSelection) -> bool {
    answer.as_text().is_some_and(|text| !text.trim().is_empty())
}

fn after_age_check(answer: &AnswerValue, _: &Answers) -> &'static str {
    if answer.is("Yes, I am") {
        "gender"
    } else {
        steps::EXIT_UNDERAGE
    }
}

fn after_ethnicity(_: &AnswerValue, answers: &Answers) -> &'static str {
    if answers.text(keys::GENDER) == Some("Female") {
        "pregnancy_current"
    } else {
        "age"
    }
}

fn after_smoking(answer: &AnswerValue, _: &Answers) -> &'static str {
    if answer.is("Yes") {
        "smoking_quantity"
    } else {
        "alcohol_intro"
    }
}

fn after_alcohol(answer: &AnswerValue, _: &Answers) -> &'static str {
    if answer.is("Yes") {
        "alcohol_frequency"
    } else {
        "behavior_stress"
    }
}

fn after_weight_loss_history(answer: &AnswerValue, _: &Answers) -> &'static str {
    if answer.is("Yes") {
        "weight_loss_methods"
    } else {
        "motivation"
    }
}

fn build() -> Result<FlowDefinition, FlowDefinitionError> {
    let steps = vec![
        Step::choice(
            steps::WELCOME,
            "Hello, I'm your virtual health assistant, providing guidance based on NICE clinical standards. I'm here to help you create a personalized weight management plan. This tool is for guidance and is not a substitute for professional medical advice. Shall we begin?",
            &["Yes, let's begin"],
        )
        .next("ageCheck"),
        Step::choice(
            "ageCheck",
            "Great. First, could you confirm if you are 18 years or older?",
            &["Yes, I am", "No, I am not"],
        )
        .branch(after_age_check),
        Step::choice(
            "gender",
            "Thank you. What is your gender?",
            &["Male", "Female", OTHER_MARKER],
        )
        .key(keys::GENDER)
        .next("ethnicity"),
        Step::choice(
            "ethnicity",
            "To help provide the most accurate assessment based on NICE guidelines, could you please share which ethnic background best describes you?",
            &[
                "White",
                "Asian (e.g., South Asian, Chinese)",
                "Black (e.g., African, Caribbean)",
                "Middle Eastern",
                "Mixed or Multiple ethnic groups",
                "Prefer not to say",
            ],
        )
        .key(keys::ETHNICITY)
        .branch(after_ethnicity),
        Step::choice("pregnancy_current", "Are you currently pregnant or breastfeeding?", YES_NO_PREFER_NOT)
            .key(keys::PREGNANCY_CURRENT)
            .next("pregnancy_planning"),
        Step::choice("pregnancy_planning", "Are you planning pregnancy in the next 6 months?", YES_NO_PREFER_NOT)
            .key(keys::PREGNANCY_PLANNING)
            .next("age"),
        Step::number("age", "And what is your age?")
            .key(keys::AGE)
            .validate(age_is_adult, "Please enter a valid age.")
            .next("weight"),
        Step::measurement("weight", "Okay. Could you please provide your current weight?", MeasurementCategory::Weight)
            .key(keys::WEIGHT)
            .validate(weight_in_range, "Please enter a valid weight.")
            .next("height"),
        Step::measurement("height", "Thanks. And your height?", MeasurementCategory::Height)
            .key(keys::HEIGHT)
            .validate(height_in_range, "Please enter a valid height.")
            .next("waist"),
        Step::measurement(
            "waist",
            "Great. The NICE guidelines also use waist measurement to assess health risks. Could you provide your waist size (measured midway between your ribs and hips)?",
            MeasurementCategory::Height,
        )
        .key(keys::WAIST)
        .next("comorbidities"),
        Step::multi_choice(
            "comorbidities",
            "Thank you. Now, please select any weight-related health conditions you have.",
            &[
                "Hypertension",
                "Obstructive Sleep Apnea",
                "NAFLD (Fatty Liver)",
                "PCOS",
                "Cardiovascular Disease",
                "Joint/Mobility Issues",
                "Type 2 Diabetes",
                "None of these",
                OTHER_MARKER,
            ],
        )
        .key(keys::COMORBIDITIES)
        .next("contraindications"),
        Step::multi_choice(
            "contraindications",
            "Do you have a history of any of the following?",
            &[
                "Medullary Thyroid Cancer (MTC)",
                "MEN-2 Syndrome",
                "Pancreatitis",
                "Severe GI Disease (e.g., gastroparesis)",
                "Current Steroid Use",
                "None of these",
                OTHER_MARKER,
            ],
        )
        .key(keys::CONTRAINDICATIONS)
        .next("medications"),
        Step::multi_choice(
            "medications",
            "Are you currently taking any of the following medications?",
            &[
                "Insulin or oral diabetes meds",
                "Corticosteroids",
                "Antipsychotics",
                "Antidepressants",
                "Metformin",
                "None",
            ],
        )
        .key(keys::MEDICATIONS)
        .next("diet_intro"),
        Step::free_text(
            "diet_intro",
            "To help assess your calorie intake, I'd like to know what your typical daily diet looks like. Let's break it down by meals. First, what do you usually have for breakfast?",
        )
        .key(keys::DIET_BREAKFAST)
        .placeholder("e.g., Two eggs, toast with butter...")
        .next("diet_lunch"),
        Step::free_text("diet_lunch", "Got it! Now, what about lunch? What do you typically eat?")
            .key(keys::DIET_LUNCH)
            .placeholder("e.g., Chicken salad sandwich, apple...")
            .next("diet_dinner"),
        Step::free_text("diet_dinner", "And for dinner, what does a usual evening meal include for you?")
            .key(keys::DIET_DINNER)
            .placeholder("e.g., Salmon, rice, broccoli...")
            .next("diet_snacks"),
        Step::free_text(
            "diet_snacks",
            "Do you usually have any snacks or beverages during the day or evening? Please include things like coffee, soft drinks, fruits, sweets, etc.",
        )
        .key(keys::DIET_SNACKS)
        .placeholder("e.g., Coffee with milk, a banana, a cookie...")
        .next("diet_portions"),
        Step::free_text(
            "diet_portions",
            "Thanks! Just to make sure we have everything, would you like to mention portion sizes or how much of each item you usually have? This helps us estimate calories more accurately.",
        )
        .key(keys::DIET_PORTIONS)
        .placeholder("e.g., 'About a cup of rice', '2 slices of toast'...")
        .next("activity_intro"),
        Step::info(
            "activity_intro",
            "To better understand your energy needs, I'd like to ask about your typical daily physical activity.",
        )
        .next("activity_work"),
        Step::free_text(
            "activity_work",
            "First, how physically active are you at work or during the day? For example, do you mostly sit (like at a desk), stand or walk around, or do more active/manual work?",
        )
        .key(keys::ACTIVITY_WORK)
        .placeholder("e.g., Mostly sit at a desk")
        .next("activity_planned"),
        Step::free_text(
            "activity_planned",
            "Great! Now, do you do any planned exercise or sports? If yes, what kind, how often per week, and for how long each session?",
        )
        .key(keys::ACTIVITY_PLANNED)
        .placeholder("e.g., I run 3 times a week for 30 minutes")
        .next("activity_routine"),
        Step::free_text(
            "activity_routine",
            "Do you walk, cycle, or use stairs as part of your daily routine (e.g., walking to work, taking stairs instead of elevators)?",
        )
        .key(keys::ACTIVITY_ROUTINE)
        .placeholder("e.g., I take the stairs every day")
        .next("activity_sedentary"),
        Step::free_text(
            "activity_sedentary",
            "How much time do you usually spend sitting or inactive during the day, like watching TV, working on a computer, or resting?",
        )
        .key(keys::ACTIVITY_SEDENTARY)
        .placeholder("e.g., About 6 hours")
        .next("activity_summary"),
        Step::choice(
            "activity_summary",
            "Thanks! Would you say your overall activity level is: sedentary, lightly active, moderately active, or very active?",
            &["Sedentary", "Lightly Active", "Moderately Active", "Very Active"],
        )
        .key(keys::ACTIVITY_OVERALL)
        .next("sleep_hours"),
        Step::choice(
            "sleep_hours",
            "On average, how many hours of sleep do you get per night?",
            &["Less than 5 hours", "5-6 hours", "7-8 hours", "More than 8 hours"],
        )
        .key(keys::SLEEP_HOURS)
        .next("sleep_quality"),
        Step::choice(
            "sleep_quality",
            "How would you rate the quality of your sleep?",
            &["Very good", "Good", "Fair", "Poor"],
        )
        .key(keys::SLEEP_QUALITY)
        .next("sleep_issues"),
        Step::multi_choice(
            "sleep_issues",
            "Do you experience any of the following sleep-related issues?",
            &[
                "Difficulty falling asleep",
                "Difficulty staying asleep",
                "Loud snoring or gasping",
                "Excessive daytime sleepiness",
                "Restless legs",
                "None",
            ],
        )
        .key(keys::SLEEP_ISSUES)
        .next("sleep_willingness"),
        Step::choice(
            "sleep_willingness",
            "Are you willing to adopt strategies to improve your sleep, such as maintaining a consistent sleep schedule?",
            YES_NO_UNSURE,
        )
        .key(keys::SLEEP_WILLINGNESS)
        .next("smoking_intro"),
        Step::choice("smoking_intro", "Do you currently smoke or use tobacco products?", YES_NO)
            .branch(after_smoking),
        Step::number("smoking_quantity", "How many cigarettes or tobacco products do you use per day?")
            .key(keys::SMOKING_QUANTITY)
            .next("smoking_cessation"),
        Step::choice("smoking_cessation", "Are you interested in smoking cessation support?", YES_NO)
            .key(keys::SMOKING_CESSATION)
            .next("alcohol_intro"),
        Step::choice("alcohol_intro", "Do you consume alcohol?", YES_NO).branch(after_alcohol),
        Step::choice(
            "alcohol_frequency",
            "How often do you have a drink containing alcohol?",
            &["Never", "Monthly or less", "2-4 times a month", "2-3 times a week", "4+ times a week"],
        )
        .key(keys::ALCOHOL_FREQUENCY)
        .next("cage1"),
        Step::choice("cage1", "Have you ever felt you should Cut down on your drinking?", YES_NO)
            .next("cage2"),
        Step::choice("cage2", "Have people Annoyed you by criticizing your drinking?", YES_NO)
            .next("cage3"),
        Step::choice("cage3", "Have you ever felt bad or Guilty about your drinking?", YES_NO)
            .next("cage4"),
        Step::choice(
            "cage4",
            "Have you ever had a drink first thing in the morning to steady your nerves (Eye-opener)?",
            YES_NO,
        )
        .next("behavior_stress"),
        Step::scale("behavior_stress", "How would you rate your typical stress level on a scale of 1 to 10?", 1, 10)
            .key(keys::STRESS_LEVEL)
            .next("behavior_triggers"),
        Step::free_text(
            "behavior_triggers",
            "What situations, if any, typically lead to emotional or mindless eating for you?",
        )
        .key(keys::EATING_TRIGGERS)
        .placeholder("e.g., watching TV, feeling stressed")
        .next("weight_loss_history"),
        Step::choice("weight_loss_history", "Have you tried to lose weight before?", YES_NO)
            .branch(after_weight_loss_history),
        Step::multi_choice(
            "weight_loss_methods",
            "What methods have you tried?",
            &["Diet or exercise", PRESCRIPTION_MARKER, "Supplements", "Surgery"],
        )
        .key(keys::WEIGHT_LOSS_METHODS)
        .next("weight_loss_supervision"),
        Step::free_text(
            steps::SPECIFY_MEDICATION,
            "Please specify the prescription medication(s) you tried.",
        )
        .validate(not_blank, "Please tell us which medication(s) you tried."),
        Step::choice(
            "weight_loss_supervision",
            "Were your previous weight loss attempts supervised by a healthcare professional?",
            YES_NO,
        )
        .key(keys::WEIGHT_LOSS_SUPERVISION)
        .next("motivation"),
        Step::scale("motivation", "On a scale of 1 to 10, how motivated are you to manage your weight?", 1, 10)
            .key(keys::MOTIVATION)
            .next("readiness"),
        Step::choice(
            "readiness",
            "Are you willing to make lifestyle changes alongside medication (if prescribed)?",
            YES_NO_UNSURE,
        )
        .key(keys::READINESS)
        .next("goal_setting_short"),
        Step::free_text("goal_setting_short", "What are your short-term (1-month) weight management goals?")
            .key(keys::GOAL_SHORT)
            .placeholder("e.g., Build a routine...")
            .next("goal_setting_medium"),
        Step::free_text("goal_setting_medium", "What are your medium-term (2-5 months) weight management goals?")
            .key(keys::GOAL_MEDIUM)
            .placeholder("e.g., Continue progress...")
            .next("goal_setting_long"),
        Step::free_text("goal_setting_long", "What are your long-term (6-12 months) weight management goals?")
            .key(keys::GOAL_LONG)
            .placeholder("e.g., Plan for challenges...")
            .next("goal_setting_year_plus"),
        Step::free_text("goal_setting_year_plus", "What are your goals beyond 1 year?")
            .key(keys::GOAL_YEAR_PLUS)
            .placeholder("e.g., Discuss maintenance...")
            .next(steps::GENERATE_REPORT),
        Step::free_text(steps::CLARIFY_OTHER, "Please provide more details.")
            .validate(not_blank, "Please provide a few words of detail."),
        Step::summary(
            steps::GENERATE_REPORT,
            "Thank you for all this information. I'm now analyzing your responses to create your personalized weight management plan, based on NICE guidelines.",
        ),
        Step::exit(
            steps::EXIT_UNDERAGE,
            "This tool is for adults aged 18 and over. It's best to speak with a pediatrician or a family doctor for guidance. Thank you.",
        ),
    ];

    let rules = vec![
        ClarificationRule::other(OTHER_MARKER, steps::CLARIFY_OTHER),
        ClarificationRule::specify(PRESCRIPTION_MARKER, steps::SPECIFY_MEDICATION, keys::WEIGHT_LOSS_MEDS),
    ];

    FlowDefinition::new(steps::WELCOME, steps, rules)
}
