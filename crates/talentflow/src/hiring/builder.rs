//! Copy-on-write edits of an assessment tree.
//!
//! Every edit borrows the current assessment and returns a new one; the
//! caller decides when (and whether) the result is saved.

use uuid::Uuid;

use super::domain::{Assessment, Question, QuestionKind, Section};

pub const DEFAULT_SECTION_TITLE: &str = "New Section";
pub const DEFAULT_QUESTION_LABEL: &str = "Enter your question here";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    #[error("section '{0}' does not exist")]
    UnknownSection(String),
    #[error("question '{question_id}' does not exist in section '{section_id}'")]
    UnknownQuestion {
        section_id: String,
        question_id: String,
    },
}

impl Assessment {
    /// Append an empty section with a fresh id.
    pub fn add_section(&self, title: Option<&str>) -> Assessment {
        let mut next = self.clone();
        next.sections.push(Section {
            id: Uuid::new_v4().to_string(),
            title: title.unwrap_or(DEFAULT_SECTION_TITLE).to_string(),
            questions: Vec::new(),
        });
        next
    }

    /// Append a short-text question with the placeholder label.
    pub fn add_question(&self, section_id: &str) -> Result<Assessment, BuilderError> {
        self.with_section(section_id, |section| {
            section.questions.push(Question {
                id: Uuid::new_v4().to_string(),
                kind: QuestionKind::ShortText,
                label: DEFAULT_QUESTION_LABEL.to_string(),
                required: None,
                options: None,
                min: None,
                max: None,
                condition: None,
            });
        })
    }

    pub fn rename_section(&self, section_id: &str, title: &str) -> Result<Assessment, BuilderError> {
        self.with_section(section_id, |section| section.title = title.to_string())
    }

    pub fn relabel_question(
        &self,
        section_id: &str,
        question_id: &str,
        label: &str,
    ) -> Result<Assessment, BuilderError> {
        self.with_question(section_id, question_id, |question| {
            question.label = label.to_string()
        })
    }

    /// Change a question's kind. Options and bounds are kept as they are.
    pub fn retype_question(
        &self,
        section_id: &str,
        question_id: &str,
        kind: QuestionKind,
    ) -> Result<Assessment, BuilderError> {
        self.with_question(section_id, question_id, |question| question.kind = kind)
    }

    fn with_section(
        &self,
        section_id: &str,
        edit: impl FnOnce(&mut Section),
    ) -> Result<Assessment, BuilderError> {
        let mut next = self.clone();
        let section = next
            .sections
            .iter_mut()
            .find(|section| section.id == section_id)
            .ok_or_else(|| BuilderError::UnknownSection(section_id.to_string()))?;
        edit(section);
        Ok(next)
    }

    fn with_question(
        &self,
        section_id: &str,
        question_id: &str,
        edit: impl FnOnce(&mut Question),
    ) -> Result<Assessment, BuilderError> {
        let mut missing = None;
        let next = self.with_section(section_id, |section| {
            match section
                .questions
                .iter_mut()
                .find(|question| question.id == question_id)
            {
                Some(question) => edit(question),
                None => {
                    missing = Some(BuilderError::UnknownQuestion {
                        section_id: section_id.to_string(),
                        question_id: question_id.to_string(),
                    })
                }
            }
        })?;
        match missing {
            Some(err) => Err(err),
            None => Ok(next),
        }
    }
}
