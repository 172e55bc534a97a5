//! Simulated batch run: a built-in deck fed through the full pipeline
//! against the in-memory GPIO backend.

use crate::SelectedBackend;
use cardsort_gpio::{ActiveLevel, ChannelId, LogicLevel, MemoryGpioHandle};
use cardsort_pipeline::SortPipeline;
use cardsort_recognition::{
    CardMetadata, MockIdentifier, MockIdentifierHandle, MockMetadataHandle, MockMetadataProvider,
    ScannedName,
};
use cardsort_sequencer::{SequencerConfig, SorterPins, SortSequencer};
use cardsort_storage::Database;
use std::time::Duration;
use tracing::{info, warn};

/// Built-in demo deck: (raw OCR text, corrected name, price, colors, cmc,
/// type line). A `None` name simulates a failed recognition.
const DECK: &[(&str, Option<&str>, f64, &str, f64, &str)] = &[
    ("Sol Ring", Some("Sol Ring"), 1.5, "C", 1.0, "Artifact"),
    ("Lightning Bolt", Some("Lightning Bolt"), 0.5, "R", 1.0, "Instant"),
    ("Craw Wurm", Some("Craw Wurm"), 0.2, "G", 6.0, "Creature"),
    ("c0unte2sp3ll", None, 0.0, "", 0.0, ""),
    ("Azorius Charm", Some("Azorius Charm"), 0.3, "WU", 2.0, "Instant"),
    ("Island", Some("Island"), 0.1, "U", 0.0, "Basic Land"),
];

/// Queue `count` scans from the built-in deck and register their metadata.
async fn seed_deck(
    scans: &MockIdentifierHandle,
    metadata: &MockMetadataHandle,
    count: u32,
) -> anyhow::Result<()> {
    for (_, name, price, colors, cmc, type_line) in DECK {
        if let Some(name) = name {
            metadata.insert(
                *name,
                CardMetadata {
                    price: Some(*price),
                    color_identity: Some((*colors).to_string()),
                    cmc: Some(*cmc),
                    type_line: Some((*type_line).to_string()),
                    image_uri: None,
                },
            );
        }
    }

    for index in 0..count {
        let (raw, name, ..) = DECK[index as usize % DECK.len()];
        let scan = match name {
            Some(name) => ScannedName::recognized(raw, name),
            None => ScannedName::unrecognized(raw),
        };
        scans.push_scan(scan).await?;
    }

    Ok(())
}

/// Script `count` card passages on the simulated light barrier.
///
/// The cycle is deliberately slower than the sequencer's worst-case card
/// time, so the feed never runs ahead of the pipeline.
pub fn spawn_card_feed(handle: MemoryGpioHandle, sensor: ChannelId, count: u32) {
    tokio::spawn(async move {
        let ms = Duration::from_millis;
        for _ in 0..count {
            tokio::time::sleep(ms(600)).await;
            let _ = handle.set_input_level(sensor, LogicLevel::High);
            tokio::time::sleep(ms(400)).await;
            let _ = handle.set_input_level(sensor, LogicLevel::Low);
            tokio::time::sleep(ms(200)).await;
            let _ = handle.set_input_level(sensor, LogicLevel::High);
            tokio::time::sleep(ms(200)).await;
            let _ = handle.set_input_level(sensor, LogicLevel::Low);
            tokio::time::sleep(ms(1100)).await;
        }
    });
}

/// Process `cards` simulated cards through the full pipeline.
pub async fn run_demo(
    backend: SelectedBackend,
    active_level: ActiveLevel,
    db: &Database,
    cards: u32,
    stop_on_fault: bool,
) -> anyhow::Result<()> {
    let (gpio, sim) = backend.split();
    let pins = SorterPins::default_layout(active_level)?;
    let sensor = pins.sensor;
    let stop = crate::spawn_ctrl_c_handler();
    let sequencer = SortSequencer::new(gpio, pins, SequencerConfig::default())?.with_stop(stop);

    let (identifier, scans) = MockIdentifier::new();
    let (provider, metadata) = MockMetadataProvider::new();
    seed_deck(&scans, &metadata, cards).await?;

    if let Some(handle) = sim {
        spawn_card_feed(handle, sensor, cards);
    }

    let mut pipeline = SortPipeline::new(identifier, provider, sequencer, db);
    let mut routed = 0u32;
    let mut faulted = 0u32;

    for index in 0..cards {
        match pipeline.process_next().await {
            Ok(outcome) => {
                routed += 1;
                info!(
                    card = index + 1,
                    id = outcome.card_id,
                    direction = %outcome.direction,
                    total_ms = outcome.report.total.as_millis() as u64,
                    "card sorted"
                );
            }
            Err(err) if err.is_cancelled() => {
                warn!(card = index + 1, "run cancelled by operator");
                break;
            }
            Err(err) => {
                faulted += 1;
                warn!(card = index + 1, error = %err, "card failed");
                if stop_on_fault {
                    pipeline.shutdown()?;
                    return Err(err.into());
                }
            }
        }
    }

    info!(routed, faulted, "run complete");
    pipeline.shutdown()?;
    Ok(())
}
