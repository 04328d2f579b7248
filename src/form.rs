//! Worksheet answers
//!
//! The persistence layer only sees [`FormRecord`], an opaque JSON object.
//! [`WorksheetData`] is the typed view of the current schema that the UI
//! works with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat mapping of field name to value, as stored
pub type FormRecord = Map<String, Value>;

/// Highest value accepted by the 0-10 score fields
pub const MAX_SCORE: u8 = 10;

/// Logical step a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Observe = 1,
    Factors = 2,
    Seeds = 3,
    Blueprint = 4,
}

impl Step {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Step::Observe),
            2 => Some(Step::Factors),
            3 => Some(Step::Seeds),
            4 => Some(Step::Blueprint),
            _ => None,
        }
    }
}

/// Free-text and single-choice fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Step1Scene,
    Step1Body,
    Step1Feelings,
    Step2External,
    Step2Internal,
    Step2Physical,
    Step2Social,
    Step3Reliefs,
    Step3Awareness,
    Step4Name,
    Step4Guide,
}

impl TextField {
    pub const ALL: [TextField; 11] = [
        TextField::Step1Scene,
        TextField::Step1Body,
        TextField::Step1Feelings,
        TextField::Step2External,
        TextField::Step2Internal,
        TextField::Step2Physical,
        TextField::Step2Social,
        TextField::Step3Reliefs,
        TextField::Step3Awareness,
        TextField::Step4Name,
        TextField::Step4Guide,
    ];

    /// Key used in the stored record
    pub fn key(&self) -> &'static str {
        match self {
            TextField::Step1Scene => "step1Scene",
            TextField::Step1Body => "step1Body",
            TextField::Step1Feelings => "step1Feelings",
            TextField::Step2External => "step2External",
            TextField::Step2Internal => "step2Internal",
            TextField::Step2Physical => "step2Physical",
            TextField::Step2Social => "step2Social",
            TextField::Step3Reliefs => "step3Reliefs",
            TextField::Step3Awareness => "step3Awareness",
            TextField::Step4Name => "step4Name",
            TextField::Step4Guide => "step4Guide",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn step(&self) -> Step {
        match self {
            TextField::Step1Scene | TextField::Step1Body | TextField::Step1Feelings => Step::Observe,
            TextField::Step2External
            | TextField::Step2Internal
            | TextField::Step2Physical
            | TextField::Step2Social => Step::Factors,
            TextField::Step3Reliefs | TextField::Step3Awareness => Step::Seeds,
            TextField::Step4Name | TextField::Step4Guide => Step::Blueprint,
        }
    }
}

/// Nullable 0-10 score fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreField {
    Step1Intensity,
    Step2Fatigue,
}

impl ScoreField {
    pub const ALL: [ScoreField; 2] = [ScoreField::Step1Intensity, ScoreField::Step2Fatigue];

    pub fn key(&self) -> &'static str {
        match self {
            ScoreField::Step1Intensity => "step1Intensity",
            ScoreField::Step2Fatigue => "step2Fatigue",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn step(&self) -> Step {
        match self {
            ScoreField::Step1Intensity => Step::Observe,
            ScoreField::Step2Fatigue => Step::Factors,
        }
    }
}

/// Answers for the current schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetData {
    // === Step 1: observe the runaway thought ===
    pub step1_scene: String,
    pub step1_body: String,
    pub step1_feelings: String,
    /// How strong the spiral was (0 = calm, 10 = out of control)
    pub step1_intensity: Option<u8>,

    // === Step 2: hidden factors ===
    pub step2_external: String,
    pub step2_internal: String,
    pub step2_physical: String,
    pub step2_social: String,
    pub step2_fatigue: Option<u8>,

    // === Step 3: seeds of awareness ===
    pub step3_reliefs: String,
    pub step3_awareness: String,

    // === Step 4: personal blueprint ===
    pub step4_name: String,
    pub step4_guide: String,
}

impl WorksheetData {
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Step1Scene => &self.step1_scene,
            TextField::Step1Body => &self.step1_body,
            TextField::Step1Feelings => &self.step1_feelings,
            TextField::Step2External => &self.step2_external,
            TextField::Step2Internal => &self.step2_internal,
            TextField::Step2Physical => &self.step2_physical,
            TextField::Step2Social => &self.step2_social,
            TextField::Step3Reliefs => &self.step3_reliefs,
            TextField::Step3Awareness => &self.step3_awareness,
            TextField::Step4Name => &self.step4_name,
            TextField::Step4Guide => &self.step4_guide,
        }
    }

    pub fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Step1Scene => &mut self.step1_scene,
            TextField::Step1Body => &mut self.step1_body,
            TextField::Step1Feelings => &mut self.step1_feelings,
            TextField::Step2External => &mut self.step2_external,
            TextField::Step2Internal => &mut self.step2_internal,
            TextField::Step2Physical => &mut self.step2_physical,
            TextField::Step2Social => &mut self.step2_social,
            TextField::Step3Reliefs => &mut self.step3_reliefs,
            TextField::Step3Awareness => &mut self.step3_awareness,
            TextField::Step4Name => &mut self.step4_name,
            TextField::Step4Guide => &mut self.step4_guide,
        }
    }

    pub fn score(&self, field: ScoreField) -> Option<u8> {
        match field {
            ScoreField::Step1Intensity => self.step1_intensity,
            ScoreField::Step2Fatigue => self.step2_fatigue,
        }
    }

    pub fn score_mut(&mut self, field: ScoreField) -> &mut Option<u8> {
        match field {
            ScoreField::Step1Intensity => &mut self.step1_intensity,
            ScoreField::Step2Fatigue => &mut self.step2_fatigue,
        }
    }

    /// Complete record with every key of the current schema
    pub fn to_record(&self) -> FormRecord {
        match serde_json::to_value(self) {
            Ok(Value::Object(record)) => record,
            // A struct of strings and integers always serializes to an object
            other => {
                log::error!("Worksheet did not serialize to an object: {:?}", other);
                FormRecord::new()
            }
        }
    }

    /// Record of the default (empty) answers
    pub fn default_record() -> FormRecord {
        Self::default().to_record()
    }

    /// Typed view of a loaded record.
    ///
    /// Values of the wrong type and scores outside 0-10 fall back to the
    /// field's default, so stale data from an older schema never blocks
    /// rendering. Unknown keys are ignored.
    pub fn from_record(record: &FormRecord) -> Self {
        let mut data = Self::default();
        for field in TextField::ALL {
            match record.get(field.key()) {
                Some(Value::String(s)) => *data.text_mut(field) = s.clone(),
                Some(Value::Null) | None => {}
                Some(other) => {
                    log::debug!("Ignoring non-text value for {}: {}", field.key(), other)
                }
            }
        }
        for field in ScoreField::ALL {
            *data.score_mut(field) = record.get(field.key()).and_then(parse_score);
        }
        data
    }
}

/// Accept a stored score as an integer 0-10 (or a numeric string from
/// a `<select>` value); anything else is treated as unanswered.
fn parse_score(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u8::try_from(n).ok().filter(|n| *n <= MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_record_has_every_key() {
        let record = WorksheetData::default_record();
        assert_eq!(record.len(), TextField::ALL.len() + ScoreField::ALL.len());
        assert_eq!(record["step1Scene"], json!(""));
        assert_eq!(record["step1Intensity"], Value::Null);
        assert_eq!(record["step2Fatigue"], Value::Null);
    }

    #[test]
    fn test_record_uses_field_keys() {
        let mut data = WorksheetData::default();
        data.step4_name = "あおい".to_string();
        data.step2_fatigue = Some(7);

        let record = data.to_record();
        for field in TextField::ALL {
            assert_eq!(record[field.key()], json!(data.text(field)), "{}", field.key());
        }
        for field in ScoreField::ALL {
            let expected = data.score(field).map(Value::from).unwrap_or(Value::Null);
            assert_eq!(record[field.key()], expected, "{}", field.key());
        }
        assert_eq!(record["step2Fatigue"], json!(7));
    }

    #[test]
    fn test_from_record_roundtrip() {
        let mut data = WorksheetData::default();
        data.step1_scene = "夜眠れなかった".to_string();
        data.step1_feelings = "不安".to_string();
        data.step1_intensity = Some(0);
        data.step3_awareness = "その他".to_string();

        assert_eq!(WorksheetData::from_record(&data.to_record()), data);
    }

    #[test]
    fn test_from_record_is_lenient() {
        let record = json!({
            "step1Scene": 42,
            "step1Body": "胸が苦しい",
            "step1Intensity": "7",
            "step2Fatigue": 11,
            "legacyField": "dropped"
        });
        let record = record.as_object().unwrap();

        let data = WorksheetData::from_record(record);
        assert_eq!(data.step1_scene, "");
        assert_eq!(data.step1_body, "胸が苦しい");
        assert_eq!(data.step1_intensity, Some(7));
        assert_eq!(data.step2_fatigue, None);
    }

    #[test]
    fn test_field_keys() {
        for field in TextField::ALL {
            assert_eq!(TextField::from_key(field.key()), Some(field));
        }
        for field in ScoreField::ALL {
            assert_eq!(ScoreField::from_key(field.key()), Some(field));
        }
        assert_eq!(TextField::from_key("step1Intensity"), None);
        assert_eq!(TextField::Step3Reliefs.step(), Step::Seeds);
        assert_eq!(ScoreField::Step2Fatigue.step().number(), 2);
        assert_eq!(Step::from_number(5), None);
    }
}
