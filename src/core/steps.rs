//! Tutorial checklist extraction.
//!
//! A tutorial body is markdown. Steps start at a level 2-3 heading or a bold
//! line whose text begins with a step marker, a number and a colon
//! (`## Paso 2: Cobrar`, `**Step 2:** Charge`). Everything after it, up to the
//! next step, becomes that step's content.

use crate::domain::model::TutorialStep;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AppError, Result};
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_STEP_MARKERS: [&str; 2] = ["Paso", "Step"];

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("heading pattern is valid"));

static DEFAULT_EXTRACTOR: LazyLock<StepExtractor> = LazyLock::new(|| {
    StepExtractor::with_markers(&DEFAULT_STEP_MARKERS).expect("default markers are valid")
});

/// 以預設標記（Paso / Step）解析
pub fn extract_steps(content: &str) -> Vec<TutorialStep> {
    DEFAULT_EXTRACTOR.extract(content)
}

#[derive(Debug, Clone)]
pub struct StepExtractor {
    marker: Regex,
}

enum Line {
    Step(String),
    Heading,
    Text,
}

impl StepExtractor {
    pub fn with_markers<S: AsRef<str>>(markers: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = markers
            .iter()
            .map(|m| m.as_ref().trim())
            .filter(|m| !m.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Err(AppError::ConfigError {
                message: "at least one step marker is required".to_string(),
            });
        }

        let pattern = format!(r"(?i)^(?:{})\s*\d+\s*:", alternatives.join("|"));
        let marker = Regex::new(&pattern).map_err(|e| AppError::ConfigError {
            message: format!("invalid step marker pattern: {}", e),
        })?;

        Ok(Self { marker })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::with_markers(config.step_markers())
    }

    pub fn extract(&self, content: &str) -> Vec<TutorialStep> {
        let mut steps = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in content.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }

            match self.classify(line) {
                Line::Step(title) => {
                    if let Some(done) = current.take() {
                        steps.push(finish(done));
                    }
                    current = Some((title, Vec::new()));
                }
                Line::Heading => {}
                Line::Text => {
                    // 第一個步驟之前的文字直接丟棄
                    if let Some((_, body)) = current.as_mut() {
                        body.push(line);
                    }
                }
            }
        }

        if let Some(done) = current.take() {
            steps.push(finish(done));
        }

        tracing::debug!("Extracted {} tutorial steps", steps.len());
        steps
    }

    fn classify(&self, line: &str) -> Line {
        if let Some(caps) = HEADING.captures(line) {
            let level = caps[1].len();
            let title = strip_emphasis(&caps[2]);
            if (2..=3).contains(&level) && self.marker.is_match(&title) {
                return Line::Step(title);
            }
            return Line::Heading;
        }

        if line.starts_with("**") || line.starts_with("__") {
            let title = strip_emphasis(line);
            if self.marker.is_match(&title) {
                return Line::Step(title);
            }
        }

        Line::Text
    }
}

impl Default for StepExtractor {
    fn default() -> Self {
        DEFAULT_EXTRACTOR.clone()
    }
}

fn finish((title, body): (String, Vec<&str>)) -> TutorialStep {
    TutorialStep {
        title,
        content: body.join(" "),
    }
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_matches(|c: char| c == '*' || c == '_')
        .trim()
        .to_string()
}
