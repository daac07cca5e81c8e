use std::collections::BTreeMap;

use serde_json::{Number, Value};

use super::domain::{AnswerMap, Assessment, QuestionKind};

/// Input control used to collect an answer for one question kind.
#[derive(Debug, Clone, PartialEq)]
pub enum InputWidget {
    TextLine,
    TextArea,
    Number { min: Option<f64>, max: Option<f64> },
    FilePicker,
    SingleChoice(Vec<String>),
    MultiChoice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub question_id: String,
    pub label: String,
    pub widget: InputWidget,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSection {
    pub id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

/// Fill-out view of a saved assessment. `required`, bounds and display
/// conditions are shown but not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct FormLayout {
    pub job_id: String,
    pub sections: Vec<FormSection>,
}

impl FormLayout {
    pub fn from_assessment(assessment: &Assessment) -> Self {
        let sections = assessment
            .sections
            .iter()
            .map(|section| FormSection {
                id: section.id.clone(),
                title: section.title.clone(),
                fields: section
                    .questions
                    .iter()
                    .map(|question| {
                        let options = question.options.clone().unwrap_or_default();
                        let widget = match question.kind {
                            QuestionKind::ShortText => InputWidget::TextLine,
                            QuestionKind::LongText => InputWidget::TextArea,
                            QuestionKind::Numeric => InputWidget::Number {
                                min: question.min.as_ref().and_then(Number::as_f64),
                                max: question.max.as_ref().and_then(Number::as_f64),
                            },
                            QuestionKind::File => InputWidget::FilePicker,
                            QuestionKind::SingleChoice => InputWidget::SingleChoice(options),
                            QuestionKind::MultiChoice => InputWidget::MultiChoice(options),
                        };
                        FormField {
                            question_id: question.id.clone(),
                            label: question.label.clone(),
                            widget,
                            required: question.required.unwrap_or(false),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            job_id: assessment.job_id.clone(),
            sections,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }
}

/// Transient free-text answers keyed by question id.
///
/// Keys are not checked against the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseSheet {
    answers: BTreeMap<String, String>,
}

impl ResponseSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, question_id: impl Into<String>, value: impl Into<String>) {
        self.answers.insert(question_id.into(), value.into());
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn to_answer_map(&self) -> AnswerMap {
        self.answers
            .iter()
            .map(|(id, value)| (id.clone(), Value::String(value.clone())))
            .collect()
    }
}
