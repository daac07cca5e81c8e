use crate::infra::{api_router, open_backend};
use clap::Subcommand;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use talentflow::client::{
    export_candidates, ApiClient, AssessmentEditor, AssessmentRunner, CandidateFilter,
    CandidateProfile, CandidatesBoard, HttpTransport, JobsBoard, LocalTransport, RevealWindow,
    Transport,
};
use talentflow::config::AppConfig;
use talentflow::error::AppError;
use talentflow::hiring::{
    domain::parse_tags, Assessment, InputWidget, Job, JobDraft, JobPatch, JobStatus, QuestionKind,
    Stage,
};
use talentflow::telemetry::{self, LogSink};
use tracing::info;

#[derive(Debug)]
pub(crate) enum View {
    Jobs(JobCommand),
    Candidates(CandidateCommand),
    Assessments(AssessmentCommand),
}

#[derive(Subcommand, Debug)]
pub(crate) enum JobCommand {
    /// List jobs in board order
    List {
        /// Match against title, slug or tags
        #[arg(long)]
        search: Option<String>,
        /// Only show active or archived jobs
        #[arg(long, value_parser = parse_status)]
        status: Option<JobStatus>,
    },
    /// Create a job at the end of the board
    Create {
        #[arg(long)]
        title: String,
        /// Defaults to the title in kebab case
        #[arg(long)]
        slug: Option<String>,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Change a job's title, slug or tags
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
    },
    /// Toggle a job between active and archived
    Archive { id: String },
    /// Move the job at one board position to another
    Move { from: usize, to: usize },
}

#[derive(Subcommand, Debug)]
pub(crate) enum CandidateCommand {
    /// List candidates, 40 at first and 30 more per extra page
    List {
        /// Match against name or email
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        stage: Option<Stage>,
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show a candidate and their timeline
    Show { id: String },
    /// Move a candidate to another stage
    Stage { id: String, stage: Stage },
    /// Write the matching candidates as CSV
    Export {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        stage: Option<Stage>,
        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum AssessmentCommand {
    /// Summarise the assessment of every job
    List,
    /// Show the fill-out form for a job
    Show { job_id: String },
    /// Append a section
    AddSection {
        job_id: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Append a short-text question to a section
    AddQuestion { job_id: String, section_id: String },
    /// Rename a section
    RenameSection {
        job_id: String,
        section_id: String,
        title: String,
    },
    /// Change a question's label
    Relabel {
        job_id: String,
        section_id: String,
        question_id: String,
        label: String,
    },
    /// Change a question's type
    Retype {
        job_id: String,
        section_id: String,
        question_id: String,
        kind: QuestionKind,
    },
    /// Submit answers as `--answer <question-id>=<value>`
    Fill {
        job_id: String,
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, String)>,
    },
}

fn parse_status(raw: &str) -> Result<JobStatus, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "active" => Ok(JobStatus::Active),
        "archived" => Ok(JobStatus::Archived),
        other => Err(format!("unknown status '{other}' (expected active or archived)")),
    }
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected <question-id>=<value>, got '{raw}'")),
    }
}

/// Run one dashboard command against the in-process backend or `remote`.
pub(crate) async fn run(
    config: AppConfig,
    remote: Option<String>,
    view: View,
) -> Result<(), AppError> {
    telemetry::init(&config.telemetry, LogSink::Stderr)?;
    let mut out = std::io::stdout();

    match remote {
        Some(url) => {
            info!(%url, "using remote backend");
            let client = Arc::new(ApiClient::new(HttpTransport::new(url)));
            render(client, view, &mut out).await
        }
        None => {
            let backend = open_backend(&config)?;
            let client = Arc::new(ApiClient::new(LocalTransport::new(api_router(
                backend, &config,
            ))));
            render(client, view, &mut out).await
        }
    }
}

pub(crate) async fn render<T: Transport, W: Write>(
    client: Arc<ApiClient<T>>,
    view: View,
    out: &mut W,
) -> Result<(), AppError> {
    match view {
        View::Jobs(command) => jobs_view(client, command, out).await,
        View::Candidates(command) => candidates_view(client, command, out).await,
        View::Assessments(command) => assessments_view(client, command, out).await,
    }
}

async fn jobs_view<T: Transport, W: Write>(
    client: Arc<ApiClient<T>>,
    command: JobCommand,
    out: &mut W,
) -> Result<(), AppError> {
    let mut board = JobsBoard::new(client);
    board.load().await;

    match command {
        JobCommand::List { search, status } => {
            let jobs: Vec<&Job> = board
                .filter(search.as_deref().unwrap_or(""))
                .into_iter()
                .filter(|job| status.map_or(true, |status| job.status == status))
                .collect();
            write_jobs(out, &jobs)?;
        }
        JobCommand::Create { title, slug, tags } => {
            let job = board
                .create(JobDraft {
                    title,
                    slug,
                    tags: parse_tags(&tags),
                    ..JobDraft::default()
                })
                .await?;
            writeln!(
                out,
                "created job {} '{}' at position {}",
                job.id, job.title, job.order
            )?;
        }
        JobCommand::Edit {
            id,
            title,
            slug,
            tags,
        } => {
            let job = board
                .update(
                    &id,
                    JobPatch {
                        title,
                        slug,
                        tags: tags.as_deref().map(parse_tags),
                        ..JobPatch::default()
                    },
                )
                .await?;
            writeln!(out, "updated job {} '{}' ({})", job.id, job.title, job.slug)?;
        }
        JobCommand::Archive { id } => {
            let job = board.toggle_archive(&id).await?;
            writeln!(out, "job {} is now {}", job.id, job.status.label())?;
        }
        JobCommand::Move { from, to } => match board.move_job(from, to).await {
            Ok(true) => {
                writeln!(out, "moved job from position {from} to {to}")?;
                write_jobs(out, &board.jobs().iter().collect::<Vec<_>>())?;
            }
            Ok(false) => writeln!(out, "nothing to move")?,
            Err(err) => {
                writeln!(out, "Reorder failed ({err}); list reloaded from server.")?;
                write_jobs(out, &board.jobs().iter().collect::<Vec<_>>())?;
                return Err(err.into());
            }
        },
    }
    Ok(())
}

fn write_jobs<W: Write>(out: &mut W, jobs: &[&Job]) -> Result<(), AppError> {
    writeln!(out, "{:<5} {:<38} {:<9} {:<40} TAGS", "ORDER", "ID", "STATUS", "TITLE")?;
    for job in jobs {
        writeln!(
            out,
            "{:<5} {:<38} {:<9} {:<40} {}",
            job.order,
            job.id,
            job.status.label(),
            job.title,
            job.tags.join(", ")
        )?;
    }
    Ok(())
}

async fn candidates_view<T: Transport, W: Write>(
    client: Arc<ApiClient<T>>,
    command: CandidateCommand,
    out: &mut W,
) -> Result<(), AppError> {
    match command {
        CandidateCommand::List {
            search,
            stage,
            pages,
        } => {
            let mut board = CandidatesBoard::new(client);
            board.load().await;
            let filter = CandidateFilter {
                search: search.unwrap_or_default(),
                stage,
            };
            let matches = board.filter(&filter);
            let mut window = RevealWindow::new();
            for _ in 1..pages {
                window.reveal_more(matches.len());
            }
            let visible = window.slice(&matches);
            writeln!(out, "{:<38} {:<24} {:<32} STAGE", "ID", "NAME", "EMAIL")?;
            for candidate in visible {
                writeln!(
                    out,
                    "{:<38} {:<24} {:<32} {}",
                    candidate.id, candidate.name, candidate.email, candidate.stage
                )?;
            }
            writeln!(
                out,
                "showing {} of {} matching candidates",
                visible.len(),
                matches.len()
            )?;
        }
        CandidateCommand::Show { id } => {
            let mut profile = CandidateProfile::new(client);
            profile.load(&id).await?;
            let Some(candidate) = profile.candidate() else {
                return Err(AppError::Input(format!("candidate '{id}' not found")));
            };
            writeln!(out, "{} <{}>", candidate.name, candidate.email)?;
            writeln!(out, "stage: {}", candidate.stage)?;
            if let Some(job_id) = &candidate.job_id {
                writeln!(out, "job: {job_id}")?;
            }
            writeln!(out, "timeline:")?;
            for entry in profile.timeline() {
                writeln!(out, "  {}  {}", entry.date, entry.stage)?;
            }
        }
        CandidateCommand::Stage { id, stage } => {
            let mut profile = CandidateProfile::new(client);
            profile.load(&id).await?;
            if profile.candidate().is_none() {
                return Err(AppError::Input(format!("candidate '{id}' not found")));
            }
            let updated = profile.set_stage(stage).await?;
            writeln!(out, "{} moved to {}", updated.name, updated.stage)?;
        }
        CandidateCommand::Export {
            search,
            stage,
            output,
        } => {
            let mut board = CandidatesBoard::new(client);
            board.load().await;
            let filter = CandidateFilter {
                search: search.unwrap_or_default(),
                stage,
            };
            let matches = board.filter(&filter);
            let rows = match &output {
                Some(path) => export_candidates(File::create(path)?, matches)?,
                None => export_candidates(&mut *out, matches)?,
            };
            info!(rows, "candidates exported");
        }
    }
    Ok(())
}

async fn assessments_view<T: Transport, W: Write>(
    client: Arc<ApiClient<T>>,
    command: AssessmentCommand,
    out: &mut W,
) -> Result<(), AppError> {
    match command {
        AssessmentCommand::List => {
            let mut board = JobsBoard::new(client.clone());
            board.load().await;
            writeln!(out, "{:<38} {:<40} SECTIONS QUESTIONS", "JOB", "TITLE")?;
            for job in board.jobs() {
                let assessment = client.get_assessment(&job.id).await?;
                writeln!(
                    out,
                    "{:<38} {:<40} {:<8} {}",
                    job.id,
                    job.title,
                    assessment.sections.len(),
                    assessment.question_count()
                )?;
            }
        }
        AssessmentCommand::Show { job_id } => {
            let mut runner = AssessmentRunner::new(client, job_id.as_str());
            runner.load(&job_id).await?;
            let layout = runner.layout();
            if layout.sections.is_empty() {
                writeln!(out, "job {job_id} has no assessment yet")?;
            }
            for section in &layout.sections {
                writeln!(out, "[{}] {}", section.id, section.title)?;
                for field in &section.fields {
                    let marker = if field.required { " *" } else { "" };
                    writeln!(
                        out,
                        "  ({}) {}{} : {}",
                        field.question_id,
                        field.label,
                        marker,
                        describe(&field.widget)
                    )?;
                }
            }
        }
        AssessmentCommand::AddSection { job_id, title } => {
            let mut editor = AssessmentEditor::new(client, job_id.as_str());
            editor.load(&job_id).await;
            let section = editor
                .add_section(title.as_deref())
                .sections
                .last()
                .map(|section| section.id.clone());
            let confirmation = editor.save().await?;
            writeln!(
                out,
                "added section {} ({} sections, {} questions saved for job {})",
                section.unwrap_or_default(),
                confirmation.sections,
                confirmation.questions,
                confirmation.job_id
            )?;
        }
        AssessmentCommand::AddQuestion { job_id, section_id } => {
            let mut editor = AssessmentEditor::new(client, job_id.as_str());
            editor.load(&job_id).await;
            let question = last_question(
                editor.edit(|draft| draft.add_question(&section_id))?,
                &section_id,
            );
            let confirmation = editor.save().await?;
            writeln!(
                out,
                "added question {} ({} questions saved for job {})",
                question.unwrap_or_default(),
                confirmation.questions,
                confirmation.job_id
            )?;
        }
        AssessmentCommand::RenameSection {
            job_id,
            section_id,
            title,
        } => {
            let mut editor = AssessmentEditor::new(client, job_id.as_str());
            editor.load(&job_id).await;
            editor.edit(|draft| draft.rename_section(&section_id, &title))?;
            editor.save().await?;
            writeln!(out, "section {section_id} renamed to '{title}'")?;
        }
        AssessmentCommand::Relabel {
            job_id,
            section_id,
            question_id,
            label,
        } => {
            let mut editor = AssessmentEditor::new(client, job_id.as_str());
            editor.load(&job_id).await;
            editor.edit(|draft| draft.relabel_question(&section_id, &question_id, &label))?;
            editor.save().await?;
            writeln!(out, "question {question_id} relabelled to '{label}'")?;
        }
        AssessmentCommand::Retype {
            job_id,
            section_id,
            question_id,
            kind,
        } => {
            let mut editor = AssessmentEditor::new(client, job_id.as_str());
            editor.load(&job_id).await;
            editor.edit(|draft| draft.retype_question(&section_id, &question_id, kind))?;
            editor.save().await?;
            writeln!(out, "question {question_id} is now {}", kind.label())?;
        }
        AssessmentCommand::Fill { job_id, answers } => {
            let mut runner = AssessmentRunner::new(client, job_id.as_str());
            runner.load(&job_id).await?;
            for (question_id, value) in answers {
                runner.answer(question_id, value);
            }
            let answered = runner.submit().await?;
            writeln!(out, "submitted {answered} answers for job {job_id}")?;
        }
    }
    Ok(())
}

fn last_question(assessment: &Assessment, section_id: &str) -> Option<String> {
    assessment
        .sections
        .iter()
        .find(|section| section.id == section_id)
        .and_then(|section| section.questions.last())
        .map(|question| question.id.clone())
}

fn describe(widget: &InputWidget) -> String {
    match widget {
        InputWidget::TextLine => "short text".to_string(),
        InputWidget::TextArea => "long text".to_string(),
        InputWidget::Number { min, max } => match (min, max) {
            (Some(min), Some(max)) => format!("number {min}..{max}"),
            (Some(min), None) => format!("number >= {min}"),
            (None, Some(max)) => format!("number <= {max}"),
            (None, None) => "number".to_string(),
        },
        InputWidget::FilePicker => "file".to_string(),
        InputWidget::SingleChoice(options) => format!("one of [{}]", options.join(" | ")),
        InputWidget::MultiChoice(options) => format!("any of [{}]", options.join(" | ")),
    }
}
