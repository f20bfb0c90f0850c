use crate::infra::{parse_field, InMemoryResultPublisher};
use chrono::Utc;
use clap::Args;
use potability::config::AppConfig;
use potability::error::AppError;
use potability::workflows::potability::{
    sample_dataset, ClassifyError, Dataset, InputMode, Parameter, PotabilityService, RawFields,
    ResultPayload, ResultSource, SessionError,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct ClassifyArgs {
    /// Form value as NAME=VALUE (repeatable); omitted fields count as blank.
    #[arg(long, value_parser = parse_field)]
    pub(crate) field: Vec<(String, String)>,
    /// Classify the first row of a .csv or .json dataset instead of form fields.
    #[arg(long, conflicts_with_all = ["field", "sample_dataset"])]
    pub(crate) file: Option<PathBuf>,
    /// Classify the first row of the built-in sample dataset.
    #[arg(long, conflicts_with = "field")]
    pub(crate) sample_dataset: bool,
    /// Skip the configured validation delay.
    #[arg(long)]
    pub(crate) no_delay: bool,
}

#[derive(Args, Debug, Default)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["file", "sample_dataset"])
))]
pub(crate) struct ExportArgs {
    /// Dataset (.csv or .json) to export.
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    /// Export the built-in sample dataset.
    #[arg(long)]
    pub(crate) sample_dataset: bool,
    /// File name prefix; defaults to APP_EXPORT_LABEL.
    #[arg(long)]
    pub(crate) label: Option<String>,
    /// Directory to write the CSV into.
    #[arg(long, default_value = ".")]
    pub(crate) out_dir: PathBuf,
}

type CliService = PotabilityService<InMemoryResultPublisher>;

fn cli_service(config: &AppConfig) -> (CliService, InMemoryResultPublisher) {
    let publisher = InMemoryResultPublisher::default();
    let service = PotabilityService::new(Arc::new(publisher.clone()))
        .with_export_label(config.validation.export_label.clone());
    (service, publisher)
}

pub(crate) async fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let ClassifyArgs {
        field,
        file,
        sample_dataset: use_sample,
        no_delay,
    } = args;

    let config = AppConfig::load()?;
    let (service, _) = cli_service(&config);

    let mode = if let Some(path) = file {
        InputMode::dataset(service.load_path(&path).await?)
    } else if use_sample {
        InputMode::dataset(sample_dataset())
    } else {
        let mut form = RawFields::blank();
        for (name, value) in field {
            form.insert(name, value);
        }
        InputMode::manual(form)
    };

    let latency = if no_delay {
        Duration::ZERO
    } else {
        config.validation.latency
    };
    classify_and_render(&service, mode, latency).await?;
    Ok(())
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        file,
        sample_dataset: use_sample,
        label,
        out_dir,
    } = args;

    let config = AppConfig::load()?;
    let (service, _) = cli_service(&config);

    let dataset = match file {
        Some(path) => service.load_path(&path).await?,
        None if use_sample => sample_dataset(),
        None => Dataset::default(),
    };

    let export = service.export(&dataset, label.as_deref(), Utc::now())?;
    tokio::fs::create_dir_all(&out_dir).await?;
    let path = out_dir.join(&export.file_name);
    tokio::fs::write(&path, export.content.as_bytes()).await?;

    println!(
        "Exported {} row(s) to {}",
        dataset.len(),
        path.display()
    );
    Ok(())
}

pub(crate) async fn run_demo() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let (service, _) = cli_service(&config);
    let latency = config.validation.latency;
    let dataset = sample_dataset();

    println!("Water potability screening demo");

    println!("\nManual entry (first sample row typed into the form)");
    let form = dataset
        .first()
        .map(RawFields::from_record)
        .unwrap_or_else(RawFields::blank);
    classify_and_render(&service, InputMode::manual(form), latency).await?;

    println!("\nManual entry with pH left blank");
    let incomplete = dataset
        .first()
        .map(RawFields::from_record)
        .unwrap_or_else(RawFields::blank)
        .with(Parameter::Ph.key(), "");
    classify_and_render(&service, InputMode::manual(incomplete), latency).await?;

    println!("\nDataset mode (built-in sample)");
    classify_and_render(&service, InputMode::dataset(dataset.clone()), latency).await?;

    let export = service.export(&dataset, None, Utc::now())?;
    println!("\nCSV export preview ({})", export.file_name);
    println!("{}", export.content);
    Ok(())
}

/// Runs one session and prints its verdict or every violation. Rejected
/// input is reported, not raised, and yields `None`.
async fn classify_and_render(
    service: &CliService,
    mode: InputMode,
    latency: Duration,
) -> Result<Option<ResultPayload>, AppError> {
    let session = service.session(latency);
    if !latency.is_zero() {
        println!("Validating ({} ms)...", latency.as_millis());
    }

    match session.run(mode).await {
        Ok(payload) => {
            render_payload(&payload);
            Ok(Some(payload))
        }
        Err(SessionError::Classify(ClassifyError::Validation(error))) => {
            println!("Input rejected: {} field(s) need attention", error.violations.len());
            for violation in &error.violations {
                println!("- {}: {}", violation.field.label(), violation.reason());
            }
            Ok(None)
        }
        Err(SessionError::Classify(ClassifyError::EmptyDataset)) => {
            println!("Dataset has no rows to classify");
            Ok(None)
        }
        Err(other) => Err(other.into()),
    }
}

fn render_payload(payload: &ResultPayload) {
    println!(
        "Potability: {} (score {:.0}/100) - {}",
        payload.category,
        payload.score,
        payload.category.summary()
    );

    match &payload.source {
        ResultSource::Manual { .. } => println!("Source: manual entry"),
        ResultSource::Dataset {
            total_rows,
            classified_rows,
            ..
        } => println!("Source: dataset ({classified_rows} of {total_rows} row(s) classified)"),
    }

    println!("Parameter breakdown:");
    for component in &payload.components {
        let unit = component.parameter.unit();
        let value = if unit.is_empty() {
            format!("{}", component.value)
        } else {
            format!("{} {}", component.value, unit)
        };
        println!(
            "  - {:<16} {:>14} | {:>4.0} pts | {}",
            component.parameter.label(),
            value,
            component.points,
            component.notes
        );
    }
}
