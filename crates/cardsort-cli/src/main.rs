//! Command-line entry point for the card sorter.
//!
//! The default backend is the in-memory simulator, which scripts its own
//! card passages so the whole actuation path can be exercised on a
//! development machine. Build with `--features hardware-rppal` and pass
//! `--hardware` to drive the real Raspberry Pi header (the cards must
//! then be fed physically).

mod demo;

use anyhow::Context;
use cardsort_core::SortDirection;
use cardsort_gpio::{ActiveLevel, AnyGpioBackend, MemoryGpio, MemoryGpioHandle};
use cardsort_sequencer::{
    SequencerConfig, SorterPins, SortSequencer, StopController, StopSignal,
};
use cardsort_storage::{
    CardFilter, Database, DatabaseConfig, ScannedCardRepository, SortingRuleRepository,
    SqliteScannedCardRepository, SqliteSortingRuleRepository, export,
    models::{RuleAttribute, RuleOperator, SortingRule},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cardsort", version, about = "MTG card-sorter control")]
struct Cli {
    /// SQLite database file for scan records and sorting rules.
    #[arg(long, env = "CARDSORT_DATABASE", default_value = "cardsort.db")]
    database: String,

    /// Relay wiring convention of the sorter unit.
    #[arg(long, value_enum, default_value = "active-high")]
    wiring: Wiring,

    /// Drive the real GPIO header instead of the simulator.
    #[cfg(feature = "hardware-rppal")]
    #[arg(long)]
    hardware: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Wiring {
    /// Logic HIGH energizes the relays.
    ActiveHigh,
    /// Logic LOW energizes the relays.
    ActiveLow,
}

impl From<Wiring> for ActiveLevel {
    fn from(wiring: Wiring) -> Self {
        match wiring {
            Wiring::ActiveHigh => ActiveLevel::ActiveHigh,
            Wiring::ActiveLow => ActiveLevel::ActiveLow,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the demo pipeline over a batch of simulated cards.
    Run {
        /// Number of cards to process.
        #[arg(long, default_value_t = 5)]
        cards: u32,

        /// Halt on the first sequencer fault instead of skipping the card.
        #[arg(long)]
        stop_on_fault: bool,
    },

    /// Physically route a single card.
    Sort {
        /// Direction to route the card.
        #[arg(long)]
        direction: SortDirectionArg,
    },

    /// Manage the sorting rules.
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Export the scan log as CSV.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortDirectionArg {
    Left,
    Right,
}

impl From<SortDirectionArg> for SortDirection {
    fn from(arg: SortDirectionArg) -> Self {
        match arg {
            SortDirectionArg::Left => SortDirection::Left,
            SortDirectionArg::Right => SortDirection::Right,
        }
    }
}

#[derive(Debug, Subcommand)]
enum RulesAction {
    /// List all rules in evaluation order.
    List,

    /// Add a rule.
    Add {
        /// Human-readable rule name.
        #[arg(long)]
        name: String,

        /// Attribute to test: cmc, price, color-identity, type-line.
        #[arg(long, value_enum)]
        attribute: AttributeArg,

        /// Operator: gt, ge, lt, le, eq, contains.
        #[arg(long, value_enum)]
        operator: OperatorArg,

        /// Comparison value.
        #[arg(long)]
        value: String,

        /// Direction for matching cards.
        #[arg(long, value_enum)]
        direction: SortDirectionArg,
    },

    /// Delete a rule by id.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AttributeArg {
    Cmc,
    Price,
    ColorIdentity,
    TypeLine,
}

impl From<AttributeArg> for RuleAttribute {
    fn from(arg: AttributeArg) -> Self {
        match arg {
            AttributeArg::Cmc => RuleAttribute::Cmc,
            AttributeArg::Price => RuleAttribute::Price,
            AttributeArg::ColorIdentity => RuleAttribute::ColorIdentity,
            AttributeArg::TypeLine => RuleAttribute::TypeLine,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OperatorArg {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Contains,
}

impl From<OperatorArg> for RuleOperator {
    fn from(arg: OperatorArg) -> Self {
        match arg {
            OperatorArg::Gt => RuleOperator::Gt,
            OperatorArg::Ge => RuleOperator::Ge,
            OperatorArg::Lt => RuleOperator::Lt,
            OperatorArg::Le => RuleOperator::Le,
            OperatorArg::Eq => RuleOperator::Eq,
            OperatorArg::Contains => RuleOperator::Contains,
        }
    }
}

/// Backend plus, for the simulator, the handle that scripts the sensor.
enum SelectedBackend {
    Memory(AnyGpioBackend, MemoryGpioHandle),
    #[cfg(feature = "hardware-rppal")]
    Hardware(AnyGpioBackend),
}

impl SelectedBackend {
    fn split(self) -> (AnyGpioBackend, Option<MemoryGpioHandle>) {
        match self {
            SelectedBackend::Memory(backend, handle) => (backend, Some(handle)),
            #[cfg(feature = "hardware-rppal")]
            SelectedBackend::Hardware(backend) => (backend, None),
        }
    }
}

fn select_backend(cli: &Cli) -> anyhow::Result<SelectedBackend> {
    #[cfg(feature = "hardware-rppal")]
    if cli.hardware {
        let backend = cardsort_gpio::RppalGpio::new().context("opening GPIO peripheral")?;
        return Ok(SelectedBackend::Hardware(AnyGpioBackend::Rppal(backend)));
    }

    let _ = cli;
    let (gpio, handle) = MemoryGpio::new();
    Ok(SelectedBackend::Memory(AnyGpioBackend::Memory(gpio), handle))
}

/// Wire Ctrl-C to the sequencer stop signal.
fn spawn_ctrl_c_handler() -> StopSignal {
    let (controller, signal) = StopController::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after actuator release");
            controller.stop();
        }
    });
    signal
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let active_level: ActiveLevel = cli.wiring.into();

    match &cli.command {
        Command::Run {
            cards,
            stop_on_fault,
        } => {
            let backend = select_backend(&cli)?;
            let db = Database::new(DatabaseConfig::new(cli.database.clone()))
                .await
                .context("opening database")?;
            demo::run_demo(backend, active_level, &db, *cards, *stop_on_fault).await?;
            db.close().await;
        }

        Command::Sort { direction } => {
            let backend = select_backend(&cli)?;
            let (gpio, sim) = backend.split();

            let pins = SorterPins::default_layout(active_level)?;
            let sensor = pins.sensor;
            let stop = spawn_ctrl_c_handler();
            let mut sequencer =
                SortSequencer::new(gpio, pins, SequencerConfig::default())?.with_stop(stop);

            if let Some(handle) = sim {
                demo::spawn_card_feed(handle, sensor, 1);
            }

            let report = sequencer.route_card((*direction).into()).await?;
            info!(
                direction = %report.direction,
                total_ms = report.total.as_millis() as u64,
                "card routed"
            );
            sequencer.shutdown()?;
        }

        Command::Rules { action } => {
            let db = Database::new(DatabaseConfig::new(cli.database.clone()))
                .await
                .context("opening database")?;
            run_rules(action, &db).await?;
            db.close().await;
        }

        Command::Export { output } => {
            let db = Database::new(DatabaseConfig::new(cli.database.clone()))
                .await
                .context("opening database")?;
            let cards = SqliteScannedCardRepository::new(db.pool().clone());
            let records = cards.list(&CardFilter::all()).await?;

            match output {
                Some(path) => {
                    let file = std::fs::File::create(path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    export::write_csv(&records, file)?;
                    info!(count = records.len(), path = %path.display(), "exported scan log");
                }
                None => {
                    export::write_csv(&records, std::io::stdout().lock())?;
                }
            }
            db.close().await;
        }
    }

    Ok(())
}

async fn run_rules(action: &RulesAction, db: &Database) -> anyhow::Result<()> {
    let rules = SqliteSortingRuleRepository::new(db.pool().clone());

    match action {
        RulesAction::List => {
            let stored = rules.list().await?;
            if stored.is_empty() {
                println!("no sorting rules defined (recognized cards default to right)");
            }
            for rule in stored {
                println!(
                    "[{}] {}: {} {} {} -> {}",
                    rule.id, rule.name, rule.attribute, rule.operator, rule.value,
                    rule.sort_direction
                );
            }
        }

        RulesAction::Add {
            name,
            attribute,
            operator,
            value,
            direction,
        } => {
            let rule = SortingRule::new(
                name.clone(),
                (*attribute).into(),
                (*operator).into(),
                value.clone(),
                (*direction).into(),
            );
            let id = rules.add(&rule).await?;
            println!("added rule {}", id);
        }

        RulesAction::Delete { id } => {
            if rules.delete(*id).await? {
                println!("deleted rule {}", id);
            } else {
                println!("no rule with id {}", id);
            }
        }
    }

    Ok(())
}
