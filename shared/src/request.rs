//! Form options shared by the three summarize endpoints.

use serde::{Deserialize, Serialize};

use crate::validation::{
    validate_focus_topics, validate_quiz_question_count, ValidationError, DEFAULT_QUIZ_QUESTIONS,
};

/// A closed set of options carried as plain strings in form data.
pub trait WireChoice: Sized + Copy + Default + 'static {
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn from_wire(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.iter().copied().find(|c| c.as_str() == raw)
    }

    /// Missing or blank input selects the default.
    fn parse_field(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            None => Ok(Self::default()),
            Some(value) => Self::from_wire(value).ok_or_else(|| {
                let expected: Vec<_> = Self::ALL.iter().map(|c| c.as_str()).collect();
                ValidationError::new(
                    Self::FIELD,
                    format!(
                        "Invalid value '{value}' for {}; expected one of {}.",
                        Self::FIELD,
                        expected.join(", ")
                    ),
                )
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    #[default]
    Summary,
    Quiz,
}

impl WireChoice for OutputType {
    const FIELD: &'static str = "output_type";
    const ALL: &'static [Self] = &[OutputType::Summary, OutputType::Quiz];

    fn as_str(&self) -> &'static str {
        match self {
            OutputType::Summary => "summary",
            OutputType::Quiz => "quiz",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl WireChoice for SummaryLength {
    const FIELD: &'static str = "summary_length";
    const ALL: &'static [Self] = &[SummaryLength::Short, SummaryLength::Medium, SummaryLength::Long];

    fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    #[default]
    Narrative,
    BulletPoints,
    Academic,
    Simplified,
}

impl WireChoice for SummaryStyle {
    const FIELD: &'static str = "summary_style";
    const ALL: &'static [Self] = &[
        SummaryStyle::Narrative,
        SummaryStyle::BulletPoints,
        SummaryStyle::Academic,
        SummaryStyle::Simplified,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SummaryStyle::Narrative => "narrative",
            SummaryStyle::BulletPoints => "bullet_points",
            SummaryStyle::Academic => "academic",
            SummaryStyle::Simplified => "simplified",
        }
    }
}

/// Options accepted by every summarize endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeOptions {
    pub output_type: OutputType,
    pub summary_length: SummaryLength,
    pub summary_style: SummaryStyle,
    pub focus_topics: Option<String>,
    pub num_quiz_questions: u8,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            output_type: OutputType::default(),
            summary_length: SummaryLength::default(),
            summary_style: SummaryStyle::default(),
            focus_topics: None,
            num_quiz_questions: DEFAULT_QUIZ_QUESTIONS,
        }
    }
}

impl SummarizeOptions {
    /// Parses and validates the shared options from a form-field lookup.
    pub fn from_fields<'a>(field: impl Fn(&str) -> Option<&'a str>) -> Result<Self, ValidationError> {
        let focus_topics = match field("focus_topics").map(str::trim).filter(|t| !t.is_empty()) {
            Some(topics) => {
                validate_focus_topics(topics)?;
                Some(topics.to_string())
            }
            None => None,
        };
        let num_quiz_questions = match field("num_quiz_questions").filter(|n| !n.trim().is_empty()) {
            Some(raw) => validate_quiz_question_count(raw)?,
            None => DEFAULT_QUIZ_QUESTIONS,
        };

        Ok(Self {
            output_type: OutputType::parse_field(field(OutputType::FIELD))?,
            summary_length: SummaryLength::parse_field(field(SummaryLength::FIELD))?,
            summary_style: SummaryStyle::parse_field(field(SummaryStyle::FIELD))?,
            focus_topics,
            num_quiz_questions,
        })
    }

    /// Form fields in the shape the upstream service expects.
    ///
    /// `num_quiz_questions` is only sent when a quiz is requested.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            (OutputType::FIELD, self.output_type.as_str().to_string()),
            (SummaryLength::FIELD, self.summary_length.as_str().to_string()),
            (SummaryStyle::FIELD, self.summary_style.as_str().to_string()),
        ];
        if let Some(topics) = &self.focus_topics {
            fields.push(("focus_topics", topics.clone()));
        }
        if self.output_type == OutputType::Quiz {
            fields.push(("num_quiz_questions", self.num_quiz_questions.to_string()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(pairs: &[(&str, &'static str)]) -> Result<SummarizeOptions, ValidationError> {
        let map: HashMap<String, &'static str> =
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        SummarizeOptions::from_fields(|name| map.get(name).copied())
    }

    #[test]
    fn missing_fields_use_defaults() {
        assert_eq!(parse(&[]).unwrap(), SummarizeOptions::default());
    }

    #[test]
    fn wire_names_round_trip() {
        let opts = parse(&[
            ("output_type", "quiz"),
            ("summary_length", "long"),
            ("summary_style", "bullet_points"),
            ("focus_topics", " ownership, lifetimes "),
            ("num_quiz_questions", "8"),
        ])
        .unwrap();
        assert_eq!(opts.output_type, OutputType::Quiz);
        assert_eq!(opts.summary_style, SummaryStyle::BulletPoints);
        assert_eq!(
            opts.to_fields(),
            vec![
                ("output_type", "quiz".to_string()),
                ("summary_length", "long".to_string()),
                ("summary_style", "bullet_points".to_string()),
                ("focus_topics", "ownership, lifetimes".to_string()),
                ("num_quiz_questions", "8".to_string()),
            ]
        );
    }

    #[test]
    fn question_count_only_sent_for_quizzes() {
        let opts = parse(&[("num_quiz_questions", "3")]).unwrap();
        assert!(opts.to_fields().iter().all(|(k, _)| *k != "num_quiz_questions"));
    }

    #[test]
    fn invalid_choice_names_the_field() {
        let err = parse(&[("summary_style", "poetic")]).unwrap_err();
        assert_eq!(err.field, "summary_style");
        assert!(err.message.contains("narrative, bullet_points, academic, simplified"));
    }

    #[test]
    fn out_of_range_question_count_is_rejected() {
        let err = parse(&[("output_type", "quiz"), ("num_quiz_questions", "25")]).unwrap_err();
        assert_eq!(err.field, "num_quiz_questions");
    }
}
