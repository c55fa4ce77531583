use serde::{de, Deserialize, Deserializer, Serialize};

use crate::diagnosis::DiagnosisError;

/// Oldest age accepted from the form.
pub const MAX_AGE: u32 = 130;

/// Suggested speed of follow-up care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl<'de> Deserialize<'de> for Urgency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            other => Err(de::Error::custom(format!(
                "urgency must be one of low|medium|high, got '{other}'"
            ))),
        }
    }
}

/// How long the user has had the symptoms. Mirrors the form's fixed options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationBucket {
    #[default]
    #[serde(rename = "Less than 24 hours")]
    LessThan24Hours,
    #[serde(rename = "1-3 days")]
    OneToThreeDays,
    #[serde(rename = "3-7 days")]
    ThreeToSevenDays,
    #[serde(rename = "More than 1 week")]
    MoreThanOneWeek,
}

impl DurationBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationBucket::LessThan24Hours => "Less than 24 hours",
            DurationBucket::OneToThreeDays => "1-3 days",
            DurationBucket::ThreeToSevenDays => "3-7 days",
            DurationBucket::MoreThanOneWeek => "More than 1 week",
        }
    }
}

/// Structured diagnosis, as returned by the model and stored in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub primary_diagnosis: String,
    /// 0 – 100
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
    #[serde(default)]
    pub differential_diagnoses: Vec<String>,
    #[serde(default)]
    pub recommended_tests: Vec<String>,
    #[serde(default)]
    pub treatment_options: Vec<String>,
    pub urgency: Urgency,
    #[serde(default)]
    pub notes: String,
}

/// Accepts `85`, `85.4` or `"85"`; rejects anything outside 0 – 100.
fn deserialize_confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("confidence is not numeric: '{s}'")))?,
    };

    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(de::Error::custom(format!(
            "confidence must be within 0-100, got {value}"
        )));
    }
    Ok(value.round() as u8)
}

/// Validated diagnosis input.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosisRequest {
    pub symptoms: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub duration: DurationBucket,
}

impl DiagnosisRequest {
    /// Rejects blank symptoms and implausible ages. Age 0 means "not specified".
    pub fn validate(mut self) -> Result<Self, DiagnosisError> {
        let trimmed = self.symptoms.trim();
        if trimmed.is_empty() {
            return Err(DiagnosisError::Validation(
                "No symptoms provided.".to_string(),
            ));
        }
        self.symptoms = trimmed.to_string();

        self.age = self.age.filter(|a| *a > 0);
        if let Some(age) = self.age {
            if age > MAX_AGE {
                return Err(DiagnosisError::Validation(format!(
                    "age must be between 1 and {MAX_AGE}"
                )));
            }
        }
        Ok(self)
    }
}
