use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use finboard::config::Config;
use finboard::date_utils::{parse_date, DateRange};
use finboard::error::AppResult;
use finboard::models::Granularity;
use finboard::services::csv_parser::parse_csv;
use finboard::services::report::{build_report, render_text, ReportOptions};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Income and expense analytics for a movements export.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV export with date, type and amount columns.
    csv: PathBuf,

    /// Bucket size for the history: daily, weekly or monthly.
    #[arg(short, long)]
    granularity: String,

    /// First day of the analysed range (YYYY-MM-DD). Defaults to the start of the month.
    #[arg(long)]
    from: Option<String>,

    /// Last day of the analysed range (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    to: Option<String>,

    /// Date to treat as today (YYYY-MM-DD).
    #[arg(long)]
    today: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> AppResult<()> {
    let config = Config::from_env()?;
    let granularity: Granularity = args.granularity.parse()?;

    let today = match &args.today {
        Some(value) => parse_date(value)?,
        None => config.time_reference.date_of(&Utc::now()),
    };

    let range = match (&args.from, &args.to) {
        (Some(from), Some(to)) => DateRange::parse(from, to)?,
        (Some(from), None) => DateRange::new(parse_date(from)?, today)?,
        (None, Some(to)) => {
            let month_start = DateRange::month_to_date(today).from;
            DateRange::new(month_start, parse_date(to)?)?
        }
        (None, None) => DateRange::month_to_date(today),
    };
    let history_range = DateRange::trailing_months(today, config.history_months);

    tracing::info!(
        file = %args.csv.display(),
        granularity = %granularity,
        reference = %config.time_reference,
        range = %range.display_label(),
        "Building analytics report"
    );

    let content = std::fs::read(&args.csv)?;
    let parsed = parse_csv(&content)?;
    for error in &parsed.errors {
        tracing::warn!("{}", error);
    }

    let report = build_report(
        &parsed.records,
        &ReportOptions {
            granularity,
            range,
            history_range,
            reference: config.time_reference,
        },
    );

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report, &config.currency, &config.locale)),
    }

    Ok(())
}
