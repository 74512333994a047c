use std::fmt;

use assess_core::model::AssessmentId;
use storage::demo::seed_demo;
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    assessment_id: AssessmentId,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidAssessmentId { raw: String },
    InvalidDbUrl { raw: String },
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("ASSESS_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut assessment_id = std::env::var("ASSESS_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| AssessmentId::new(1), AssessmentId::new);

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--assessment-id" => {
                    let value = require_value(&mut args, "--assessment-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidAssessmentId { raw: value.clone() })?;
                    assessment_id = AssessmentId::new(parsed);
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
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --assessment-id <id>      Assessment id to upsert (default: 1)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  ASSESS_DB_URL, ASSESS_ID");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let assessment = seed_demo(&storage, args.assessment_id).await?;
    let groups = storage.questions.get_questions(assessment.id()).await?;

    println!(
        "Seeded assessment {} ({}) with {} questions into {}",
        assessment.id(),
        assessment.title(),
        groups.len(),
        args.db_url
    );
    for group in groups.groups() {
        println!(
            "  {:<16} {}",
            group.question_type().label(),
            group.questions().len()
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
