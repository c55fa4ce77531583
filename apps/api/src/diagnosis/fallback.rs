//! Canned diagnoses used when no model is available or a call fails.
//!
//! The keyword table is an ordered list of (substring, result) pairs checked
//! against the lowercased symptoms. The first match wins; `DEFAULT_RULE`
//! (common cold) applies when nothing matches.

use crate::diagnosis::models::{Diagnosis, DiagnosisRequest, DurationBucket, Urgency};

/// Confidence reported by the generic failure fallback.
pub const GENERIC_FALLBACK_CONFIDENCE: u8 = 30;

/// Static description of one canned result.
pub struct KeywordRule {
    pub pattern: &'static str,
    pub primary: &'static str,
    pub confidence: u8,
    pub differentials: &'static [&'static str],
    pub tests: &'static [&'static str],
    pub treatments: &'static [&'static str],
    pub urgency: Urgency,
    pub notes: &'static str,
}

impl KeywordRule {
    fn to_diagnosis(&self) -> Diagnosis {
        Diagnosis {
            primary_diagnosis: self.primary.to_string(),
            confidence: self.confidence,
            differential_diagnoses: to_strings(self.differentials),
            recommended_tests: to_strings(self.tests),
            treatment_options: to_strings(self.treatments),
            urgency: self.urgency,
            notes: self.notes.to_string(),
        }
    }
}

/// Evaluated top to bottom.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        pattern: "headache",
        primary: "Tension Headache",
        confidence: 85,
        differentials: &["Migraine", "Sinus Headache"],
        tests: &["Blood pressure measurement"],
        treatments: &[
            "Rest in a quiet, dark room",
            "Stay hydrated",
            "Consider over-the-counter pain relievers",
            "Practice stress management techniques",
        ],
        urgency: Urgency::Low,
        notes: "Consult a doctor if headache persists for more than 3 days or becomes severe",
    },
    KeywordRule {
        pattern: "fever",
        primary: "Viral Infection",
        confidence: 80,
        differentials: &["Common Cold", "Flu"],
        tests: &["Temperature monitoring", "Complete blood count if fever persists"],
        treatments: &[
            "Rest and stay hydrated",
            "Take acetaminophen or ibuprofen for fever",
            "Monitor temperature regularly",
            "Stay home to avoid spreading illness",
        ],
        urgency: Urgency::Low,
        notes: "Seek medical attention if fever exceeds 103°F or persists beyond 3 days",
    },
    KeywordRule {
        pattern: "cough",
        primary: "Upper Respiratory Infection",
        confidence: 85,
        differentials: &["Bronchitis", "Allergies"],
        tests: &["Chest examination if cough persists"],
        treatments: &[
            "Stay hydrated with warm liquids",
            "Use honey for natural cough relief",
            "Consider over-the-counter cough suppressants",
            "Use a humidifier",
        ],
        urgency: Urgency::Low,
        notes: "See a doctor if cough persists for more than 2 weeks or produces colored mucus",
    },
    KeywordRule {
        pattern: "fatigue",
        primary: "Sleep Deprivation",
        confidence: 80,
        differentials: &["Stress/Anxiety", "Iron Deficiency"],
        tests: &["Complete blood count", "Thyroid function test"],
        treatments: &[
            "Ensure 7-9 hours of quality sleep",
            "Practice stress management",
            "Maintain a balanced diet",
            "Exercise regularly",
        ],
        urgency: Urgency::Low,
        notes: "Consult a doctor if fatigue persists for more than 2 weeks",
    },
    KeywordRule {
        pattern: "stomach",
        primary: "Food Poisoning",
        confidence: 75,
        differentials: &["Gastritis", "Viral Gastroenteritis"],
        tests: &["Stool test if symptoms persist"],
        treatments: &[
            "Stay hydrated with clear fluids",
            "Follow BRAT diet (bananas, rice, applesauce, toast)",
            "Avoid dairy and fatty foods",
            "Rest and avoid strenuous activity",
        ],
        urgency: Urgency::Medium,
        notes: "Seek medical attention if symptoms persist beyond 24 hours or include severe pain",
    },
];

pub static DEFAULT_RULE: KeywordRule = KeywordRule {
    pattern: "",
    primary: "Common Cold",
    confidence: 85,
    differentials: &["Seasonal Allergies", "Sinus Infection"],
    tests: &[],
    treatments: &[
        "Rest and stay hydrated",
        "Consider over-the-counter decongestants",
        "Monitor symptoms for 3-5 days",
        "Seek medical attention if symptoms worsen",
    ],
    urgency: Urgency::Low,
    notes: "Schedule a follow-up with your doctor if symptoms persist beyond 10 days",
};

/// Returns the first rule whose pattern occurs in the symptoms, or `DEFAULT_RULE`.
pub fn match_rule(symptoms: &str) -> &'static KeywordRule {
    let text = symptoms.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|rule| text.contains(rule.pattern))
        .unwrap_or(&DEFAULT_RULE)
}

/// Keyword-table diagnosis with age and duration adjustments applied.
pub fn keyword_diagnosis(request: &DiagnosisRequest) -> Diagnosis {
    let mut diagnosis = match_rule(&request.symptoms).to_diagnosis();

    match request.age {
        Some(age) if age < 18 => diagnosis
            .treatment_options
            .push("Consult with a pediatrician for age-appropriate treatment".to_string()),
        Some(age) if age > 65 => diagnosis.treatment_options.push(
            "Monitor closely as symptoms may progress differently in older adults".to_string(),
        ),
        _ => {}
    }

    if request.duration == DurationBucket::MoreThanOneWeek {
        diagnosis.urgency = diagnosis.urgency.max(Urgency::Medium);
        diagnosis
            .treatment_options
            .push("Consider scheduling a doctor appointment for persistent symptoms".to_string());
    }

    diagnosis
}

/// Low-confidence result returned alongside any diagnosis failure.
pub fn generic_fallback() -> Diagnosis {
    Diagnosis {
        primary_diagnosis: "General Assessment".to_string(),
        confidence: GENERIC_FALLBACK_CONFIDENCE,
        differential_diagnoses: vec![],
        recommended_tests: vec![],
        treatment_options: to_strings(&[
            "Monitor your symptoms closely",
            "Rest and stay hydrated",
            "Consider over-the-counter medications if appropriate",
            "Seek medical attention if symptoms worsen",
        ]),
        urgency: Urgency::Low,
        notes: "Please consult with a healthcare provider for proper diagnosis and treatment"
            .to_string(),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(symptoms: &str, age: Option<u32>, duration: DurationBucket) -> DiagnosisRequest {
        DiagnosisRequest {
            symptoms: symptoms.to_string(),
            age,
            duration,
        }
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "fever" also matches, but "headache" comes first in the table
        let rule = match_rule("I have a headache and fever for 2 days");
        assert_eq!(rule.primary, "Tension Headache");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(match_rule("Persistent COUGH at night").primary, "Upper Respiratory Infection");
    }

    #[test]
    fn test_no_match_uses_default() {
        assert_eq!(match_rule("itchy eyes").primary, DEFAULT_RULE.primary);
    }

    #[test]
    fn test_rule_patterns_are_nonempty_and_unique() {
        let mut patterns: Vec<_> = KEYWORD_RULES.iter().map(|r| r.pattern).collect();
        assert!(patterns.iter().all(|p| !p.is_empty()));
        patterns.sort();
        patterns.dedup();
        assert_eq!(patterns.len(), KEYWORD_RULES.len());
    }

    #[test]
    fn test_child_gets_pediatric_advice() {
        let d = keyword_diagnosis(&request("fever", Some(8), DurationBucket::OneToThreeDays));
        assert!(d.treatment_options.iter().any(|t| t.contains("pediatrician")));
    }

    #[test]
    fn test_older_adult_gets_monitoring_advice() {
        let d = keyword_diagnosis(&request("fever", Some(70), DurationBucket::OneToThreeDays));
        assert!(d.treatment_options.iter().any(|t| t.contains("older adults")));
    }

    #[test]
    fn test_long_duration_raises_urgency() {
        let d = keyword_diagnosis(&request("cough", Some(30), DurationBucket::MoreThanOneWeek));
        assert_eq!(d.urgency, Urgency::Medium);
        assert!(d.treatment_options.iter().any(|t| t.contains("appointment")));
    }

    #[test]
    fn test_long_duration_keeps_medium_urgency() {
        let d = keyword_diagnosis(&request("stomach ache", None, DurationBucket::MoreThanOneWeek));
        assert_eq!(d.urgency, Urgency::Medium);
    }

    #[test]
    fn test_generic_fallback_is_low_confidence() {
        let d = generic_fallback();
        assert!(d.confidence < 50);
        assert_eq!(d.urgency, Urgency::Low);
    }
}
