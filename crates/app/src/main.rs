use std::fmt;
use std::sync::Arc;

use assess_core::model::AssessmentId;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    AppServices, AssessmentCatalogService, AssessmentLoopService, BackendOptions, Clock,
    FailurePolicy, UploadSimulator,
};
use storage::demo::seed_demo;
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidAssessmentId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidFailureRate { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidAssessmentId { raw } => {
                write!(f, "invalid --assessment-id value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidFailureRate { raw } => {
                write!(f, "invalid --failure-rate value (expected 0..1): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn current_assessment_id(&self) -> AssessmentId {
        self.services.assessment_id()
    }

    fn catalog(&self) -> Arc<AssessmentCatalogService> {
        self.services.catalog()
    }

    fn assessment_loop(&self) -> Arc<AssessmentLoopService> {
        self.services.assessment_loop()
    }

    fn uploads(&self) -> UploadSimulator {
        self.services.uploads()
    }
}

struct Args {
    db_url: String,
    assessment_id: AssessmentId,
    failure_rate: f64,
    api_url: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- ui   [--db <sqlite_url>] [--assessment-id <id>] [--failure-rate <0..1>] [--api-url <url>]"
    );
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>] [--assessment-id <id>]");
    eprintln!();
    eprintln!("Defaults for ui:");
    eprintln!("  --db sqlite:dev.sqlite3");
    eprintln!("  --assessment-id 1");
    eprintln!("  --failure-rate 0");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESS_DB_URL, ASSESS_ID, ASSESS_FAILURE_RATE, ASSESS_API_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

fn parse_failure_rate(raw: &str) -> Result<f64, ArgsError> {
    match raw.trim().parse::<f64>() {
        Ok(rate) if (0.0..=1.0).contains(&rate) => Ok(rate),
        _ => Err(ArgsError::InvalidFailureRate {
            raw: raw.to_string(),
        }),
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ASSESS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut assessment_id = std::env::var("ASSESS_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| AssessmentId::new(1), AssessmentId::new);
        let mut failure_rate = match std::env::var("ASSESS_FAILURE_RATE") {
            Ok(raw) => parse_failure_rate(&raw)?,
            Err(_) => 0.0,
        };
        let mut api_url = std::env::var("ASSESS_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--assessment-id" => {
                    let value = require_value(args, "--assessment-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidAssessmentId { raw: value.clone() })?;
                    assessment_id = AssessmentId::new(parsed);
                }
                "--failure-rate" => {
                    let value = require_value(args, "--failure-rate")?;
                    failure_rate = parse_failure_rate(&value)?;
                }
                "--api-url" => {
                    api_url = Some(require_value(args, "--api-url")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            assessment_id,
            failure_rate,
            api_url,
        })
    }

    fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            failure_policy: FailurePolicy::from_rate(self.failure_rate),
            api_url: self.api_url.clone(),
            upload: UploadSimulator::default(),
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    info!(db_url = %parsed.db_url, "using sqlite storage");

    match cmd {
        Command::Ui => {
            let services = AppServices::new_sqlite(
                &parsed.db_url,
                Clock::system(),
                parsed.assessment_id,
                parsed.backend_options(),
            )
            .await?;
            info!(assessment_id = %services.assessment_id(), "launching desktop UI");

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
            let context = build_app_context(&app);

            // Some dev setups default to an always-on-top window; turn it off explicitly.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Assessments")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => {
            let storage = Storage::sqlite(&parsed.db_url).await?;
            let assessment = seed_demo(&storage, parsed.assessment_id).await?;
            info!(
                assessment_id = %assessment.id(),
                title = assessment.title(),
                "demo assessment seeded"
            );
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
