//! bodylog - Body metrics tracker

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use bodylog::aggregate::aggregate_latest;
use bodylog::db::Database;
use bodylog::format::{format_duration, format_height, format_number, format_percentage, format_weight};
use bodylog::health::load_records;
use bodylog::metrics::MetricsHistory;
use bodylog::timer::{DEFAULT_REST_SECS, RestTimer};
use bodylog::units::{HeightUnit, WeightUnit, parse_height_to_meters};

#[derive(Parser)]
#[command(name = "bodylog")]
#[command(author, version, about = "Body metrics tracker")]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "BODYLOG_DB", default_value = "bodylog.db", global = true)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum System {
    Metric,
    Imperial,
}

#[derive(Clone, Copy, ValueEnum)]
enum Quantity {
    Weight,
    Height,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge provider records into daily rows
    Sync {
        /// JSON file with latest records or a full export
        file: PathBuf,
    },

    /// List stored metrics
    History {
        /// Number of days to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(short, long, value_enum, default_value = "metric")]
        unit: System,
    },

    /// Show summary statistics
    Stats,

    /// Convert a measurement between metric and imperial
    Convert {
        #[arg(value_enum)]
        quantity: Quantity,

        value: f64,

        /// Unit of the given value. Weight: metric, kg, kgs, imperial, lb, lbs.
        /// Height: metric, cm, imperial, in, inches, ft, feet
        #[arg(short, long, default_value = "metric")]
        from: String,
    },

    /// Rest timer between sets
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },
}

#[derive(Subcommand)]
enum TimerAction {
    Start {
        #[arg(short, long, default_value_t = DEFAULT_REST_SECS)]
        secs: u32,
    },
    Status,
    Stop,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut db = Database::open(&cli.db)?;

    match cli.command {
        Commands::Sync { file } => {
            let latest = load_records(&file)?;
            if latest.is_empty() {
                warn!("no records found in {}", file.display());
            }

            let by_date = aggregate_latest(&latest);
            let written = db.upsert_all(&by_date)?;
            info!(written, "sync finished");

            for (date, aggregate) in &by_date {
                println!("{} | {} field(s)", date, aggregate.populated_fields());
            }
        }

        Commands::History { limit, unit } => {
            let (weight_unit, height_unit) = match unit {
                System::Metric => (WeightUnit::Metric, HeightUnit::Metric),
                System::Imperial => (WeightUnit::Imperial, HeightUnit::Imperial),
            };

            println!("Body metrics:");
            println!("{:-<50}", "");
            for m in db.get_metrics()?.iter().take(limit) {
                println!(
                    "{} | {:>12} | {:>8} | {:>6}",
                    m.date,
                    m.weight.map(|w| format_weight(w, weight_unit)).unwrap_or_else(|| "-".into()),
                    m.height.map(|h| format_height(h, height_unit)).unwrap_or_else(|| "-".into()),
                    m.fat_percentage.map(format_percentage).unwrap_or_else(|| "-".into()),
                );
            }
        }

        Commands::Stats => {
            let history = MetricsHistory::new(db.get_metrics()?);

            println!("Body Statistics");
            println!("{:-<40}", "");
            println!("Days recorded: {}", history.len());

            if let Some(weight) = history.latest_weight() {
                println!("Latest weight: {}", format_weight(weight, WeightUnit::Metric));
            }
            if let Some(change) = history.weight_change() {
                println!("Weight change: {} kg", format_number(change, 2));
            }
            if let Some(fat) = history.average_body_fat() {
                println!("Average body fat: {}", format_percentage(fat));
            }
            if let Some(bmi) = history.current_bmi() {
                println!("BMI: {}", format_number(bmi, 1));
            }
        }

        Commands::Convert { quantity, value, from } => match quantity {
            Quantity::Weight => {
                let unit: WeightUnit = from.parse()?;
                let kg = unit.convert_to_kg(value);
                println!("{} = {}", format_weight(kg, WeightUnit::Metric), format_weight(kg, WeightUnit::Imperial));
            }
            Quantity::Height => {
                let meters = parse_height_to_meters(value, &from)?;
                println!("{} = {}", format_height(meters, HeightUnit::Metric), format_height(meters, HeightUnit::Imperial));
            }
        },

        Commands::Timer { action } => match action {
            TimerAction::Start { secs } => {
                let timer = RestTimer::start(Utc::now(), secs);
                db.save_rest_timer(&timer)?;
                println!("Rest timer started: {}", format_duration(secs));
            }
            TimerAction::Status => match db.load_rest_timer()? {
                Some(timer) if !timer.is_finished(Utc::now()) => {
                    println!("Rest: {} left", format_duration(timer.remaining_secs(Utc::now())));
                }
                Some(_) => {
                    db.clear_rest_timer()?;
                    println!("Rest over");
                }
                None => println!("No rest timer running"),
            },
            TimerAction::Stop => {
                db.clear_rest_timer()?;
                println!("Rest timer stopped");
            }
        },
    }

    Ok(())
}
