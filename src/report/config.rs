use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_TITLE: &str = "Analysis Report";
pub const DEFAULT_FIELD: &str = "N/A";

/// Which optional body sections to include.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sections {
    #[serde(deserialize_with = "null_as_false")]
    pub exec: bool,
    #[serde(deserialize_with = "null_as_false")]
    pub quality: bool,
}

/// Report options as posted by the client, e.g.
///
/// ```json
/// { "title": "Ward 12 survey", "org": "City Water Board",
///   "sections": { "exec": true, "quality": true },
///   "include_maps": false, "recommendations": true }
/// ```
///
/// Missing switches leave their section out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: Option<String>,
    pub date: Option<String>,
    pub org: Option<String>,
    pub author: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub sections: Sections,
    #[serde(deserialize_with = "null_as_false")]
    pub include_maps: bool,
    #[serde(deserialize_with = "null_as_false")]
    pub recommendations: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}

fn null_as_default<'de, D: Deserializer<'de>>(d: D) -> Result<Sections, D::Error> {
    Ok(Option::<Sections>::deserialize(d)?.unwrap_or_default())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ReportConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn title(&self) -> &str {
        non_blank(&self.title).unwrap_or(DEFAULT_TITLE)
    }

    /// The configured date, or `today` formatted `%Y-%m-%d`.
    pub fn date(&self, today: NaiveDate) -> String {
        non_blank(&self.date)
            .map(str::to_string)
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string())
    }

    pub fn org(&self) -> &str {
        non_blank(&self.org).unwrap_or(DEFAULT_FIELD)
    }

    pub fn author(&self) -> &str {
        non_blank(&self.author).unwrap_or(DEFAULT_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_placeholders_and_omits_sections() {
        let cfg = ReportConfig::from_json("{}").unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(cfg.title(), "Analysis Report");
        assert_eq!(cfg.date(today), "2026-03-09");
        assert_eq!(cfg.org(), "N/A");
        assert_eq!(cfg.author(), "N/A");
        assert!(!cfg.sections.exec && !cfg.sections.quality);
        assert!(!cfg.include_maps && !cfg.recommendations);
    }

    #[test]
    fn options_toggle_independently() {
        let cfg = ReportConfig::from_json(
            r#"{"title": "Survey", "date": "2025-12-01", "sections": {"quality": true},
                "recommendations": true, "unknown": 1}"#,
        )
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(cfg.title(), "Survey");
        assert_eq!(cfg.date(today), "2025-12-01");
        assert!(!cfg.sections.exec);
        assert!(cfg.sections.quality);
        assert!(cfg.recommendations);
        assert!(!cfg.include_maps);
    }

    #[test]
    fn null_switches_are_off() {
        let cfg = ReportConfig::from_json(r#"{"sections": null, "include_maps": null}"#).unwrap();
        assert_eq!(cfg.sections, Sections::default());
        assert!(!cfg.include_maps);
    }

    #[test]
    fn blank_fields_fall_back() {
        let cfg = ReportConfig::from_json(r#"{"title": "  ", "author": ""}"#).unwrap();
        assert_eq!(cfg.title(), DEFAULT_TITLE);
        assert_eq!(cfg.author(), DEFAULT_FIELD);
    }
}
