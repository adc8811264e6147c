//! Aggregated analysis result

use serde::{Deserialize, Serialize};
use std::fmt;

/// Musical scale of a detected key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Major,
    Minor,
}

impl Scale {
    /// Parse an engine-reported scale name, ignoring case
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "major" => Some(Scale::Major),
            "minor" => Some(Scale::Minor),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tempo and key of a whole recording, merged from per-window estimates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Precise BPM from the first window that produced one
    pub bpm: Option<f32>,

    /// `bpm` rounded to the nearest integer
    pub rounded_bpm: Option<u32>,

    /// Pitch class of the most confident key estimate (e.g. "A#")
    pub key: Option<String>,

    pub scale: Option<Scale>,

    /// Confidence of the chosen key (0.0-1.0), present once a key is chosen
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub confidence: Option<f32>,
}

impl AnalysisResult {
    pub(crate) fn set_bpm(&mut self, bpm: f32) {
        self.bpm = Some(bpm);
        self.rounded_bpm = Some(bpm.round() as u32);
    }

    pub(crate) fn set_key(&mut self, key: String, scale: Option<Scale>, confidence: f32) {
        self.key = Some(key);
        self.scale = scale;
        self.confidence = Some(confidence);
    }

    /// True when neither tempo nor key was found
    pub fn is_empty(&self) -> bool {
        self.bpm.is_none() && self.key.is_none()
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bpm {
            Some(bpm) => write!(f, "BPM={:.2}", bpm)?,
            None => write!(f, "BPM=unknown")?,
        }
        match (&self.key, self.scale) {
            (Some(key), Some(scale)) => write!(f, ", Key={} {}", key, scale)?,
            (Some(key), None) => write!(f, ", Key={}", key)?,
            (None, _) => write!(f, ", Key=unknown")?,
        }
        if let Some(confidence) = self.confidence {
            write!(f, " (confidence: {:.2})", confidence)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_parse() {
        assert_eq!(Scale::parse("Major"), Some(Scale::Major));
        assert_eq!(Scale::parse(" minor "), Some(Scale::Minor));
        assert_eq!(Scale::parse("dorian"), None);
    }

    #[test]
    fn test_rounded_bpm() {
        let mut result = AnalysisResult::default();
        result.set_bpm(127.6);
        assert_eq!(result.rounded_bpm, Some(128));
    }

    #[test]
    fn test_serialized_field_names() {
        let mut result = AnalysisResult::default();
        result.set_bpm(90.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["roundedBpm"], 90);
        assert!(json["key"].is_null());
        assert!(json.get("confidence").is_none());

        result.set_key("A#".to_string(), Some(Scale::Major), 0.5);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["scale"], "major");
        assert_eq!(json["confidence"], 0.5);
    }

    #[test]
    fn test_display() {
        let mut result = AnalysisResult::default();
        assert_eq!(result.to_string(), "BPM=unknown, Key=unknown");
        result.set_bpm(120.0);
        result.set_key("G".to_string(), Some(Scale::Minor), 0.75);
        assert_eq!(result.to_string(), "BPM=120.00, Key=G minor (confidence: 0.75)");
    }
}
