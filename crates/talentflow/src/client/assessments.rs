use std::sync::Arc;

use tracing::{info, warn};

use super::{ApiClient, ClientError, Transport};
use crate::hiring::builder::BuilderError;
use crate::hiring::domain::{AnswerMap, Assessment};
use crate::hiring::runtime::{FormLayout, ResponseSheet};

/// What the server stored on the last successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfirmation {
    pub job_id: String,
    pub sections: usize,
    pub questions: usize,
}

impl SaveConfirmation {
    fn of(assessment: &Assessment) -> Self {
        Self {
            job_id: assessment.job_id.clone(),
            sections: assessment.sections.len(),
            questions: assessment.question_count(),
        }
    }
}

/// Builder state for one job's assessment. Edits stay local until `save`.
pub struct AssessmentEditor<T> {
    client: Arc<ApiClient<T>>,
    loading: bool,
    draft: Assessment,
}

impl<T: Transport> AssessmentEditor<T> {
    pub fn new(client: Arc<ApiClient<T>>, job_id: impl Into<String>) -> Self {
        Self {
            client,
            loading: true,
            draft: Assessment::empty(job_id),
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn draft(&self) -> &Assessment {
        &self.draft
    }

    /// Replace the draft with the stored assessment for `job_id`. A failed
    /// fetch leaves an empty draft for that job.
    pub async fn load(&mut self, job_id: &str) {
        self.loading = true;
        self.draft = match self.client.get_assessment(job_id).await {
            Ok(assessment) => assessment,
            Err(err) => {
                warn!(%job_id, error = %err, "failed to fetch assessment");
                Assessment::empty(job_id)
            }
        };
        self.loading = false;
    }

    /// Apply one builder edit to the draft. A failed edit leaves it untouched.
    pub fn edit(
        &mut self,
        change: impl FnOnce(&Assessment) -> Result<Assessment, BuilderError>,
    ) -> Result<&Assessment, BuilderError> {
        self.draft = change(&self.draft)?;
        Ok(&self.draft)
    }

    pub fn add_section(&mut self, title: Option<&str>) -> &Assessment {
        self.draft = self.draft.add_section(title);
        &self.draft
    }

    /// PUT the whole draft.
    pub async fn save(&mut self) -> Result<SaveConfirmation, ClientError> {
        let stored = self.client.save_assessment(&self.draft).await?;
        let confirmation = SaveConfirmation::of(&stored);
        info!(
            job_id = %confirmation.job_id,
            sections = confirmation.sections,
            questions = confirmation.questions,
            "assessment saved"
        );
        self.draft = stored;
        Ok(confirmation)
    }

    pub async fn submit(&self, answers: &AnswerMap) -> Result<(), ClientError> {
        self.client.submit_response(&self.draft.job_id, answers).await
    }

    pub fn preview(&self) -> FormLayout {
        FormLayout::from_assessment(&self.draft)
    }
}

/// Fill-out state for a saved assessment.
pub struct AssessmentRunner<T> {
    client: Arc<ApiClient<T>>,
    assessment: Assessment,
    sheet: ResponseSheet,
}

impl<T: Transport> AssessmentRunner<T> {
    pub fn new(client: Arc<ApiClient<T>>, job_id: impl Into<String>) -> Self {
        Self {
            client,
            assessment: Assessment::empty(job_id),
            sheet: ResponseSheet::new(),
        }
    }

    /// Fetch the assessment and start a blank sheet.
    pub async fn load(&mut self, job_id: &str) -> Result<(), ClientError> {
        self.sheet.clear();
        self.assessment = self.client.get_assessment(job_id).await?;
        Ok(())
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    pub fn layout(&self) -> FormLayout {
        FormLayout::from_assessment(&self.assessment)
    }

    pub fn sheet(&self) -> &ResponseSheet {
        &self.sheet
    }

    pub fn answer(&mut self, question_id: impl Into<String>, value: impl Into<String>) {
        self.sheet.set(question_id, value);
    }

    /// Send the sheet as one response record. The sheet is kept on failure.
    pub async fn submit(&mut self) -> Result<usize, ClientError> {
        let answers = self.sheet.to_answer_map();
        self.client
            .submit_response(&self.assessment.job_id, &answers)
            .await?;
        let answered = answers.len();
        self.sheet.clear();
        Ok(answered)
    }
}
