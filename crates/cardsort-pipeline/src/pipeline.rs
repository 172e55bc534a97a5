//! The sort pipeline.

use crate::error::PipelineResult;
use cardsort_core::SortDirection;
use cardsort_gpio::GpioBackend;
use cardsort_recognition::{CardIdentifier, CardMetadata, MetadataProvider, ScannedName};
use cardsort_sequencer::{RouteReport, SortSequencer};
use cardsort_storage::{
    CardProfile, Database, ScannedCard, ScannedCardRepository, SortingRuleRepository,
    SqliteScannedCardRepository, SqliteSortingRuleRepository, evaluate_rules,
};
use tracing::{info, instrument};

/// Result of processing one card end to end.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Database id of the stored scan record.
    pub card_id: i64,

    /// Direction the card was routed.
    pub direction: SortDirection,

    /// Diagnostic report from the sequencer.
    pub report: RouteReport,
}

/// End-to-end card-sorting pipeline.
///
/// Generic over the identifier, metadata provider, and GPIO backend so the
/// same orchestration runs against mocks in tests and real collaborators
/// in production.
pub struct SortPipeline<I, M, G>
where
    I: CardIdentifier,
    M: MetadataProvider,
    G: GpioBackend,
{
    identifier: I,
    metadata: M,
    sequencer: SortSequencer<G>,
    cards: SqliteScannedCardRepository,
    rules: SqliteSortingRuleRepository,
}

impl<I, M, G> SortPipeline<I, M, G>
where
    I: CardIdentifier,
    M: MetadataProvider,
    G: GpioBackend,
{
    /// Assemble a pipeline over the given collaborators and database.
    pub fn new(identifier: I, metadata: M, sequencer: SortSequencer<G>, db: &Database) -> Self {
        Self {
            identifier,
            metadata,
            sequencer,
            cards: SqliteScannedCardRepository::new(db.pool().clone()),
            rules: SqliteSortingRuleRepository::new(db.pool().clone()),
        }
    }

    /// Access the sequencer (e.g. to inspect its phase).
    #[must_use]
    pub fn sequencer(&self) -> &SortSequencer<G> {
        &self.sequencer
    }

    /// Release the hardware and dismantle the pipeline. Call exactly once
    /// at shutdown.
    ///
    /// # Errors
    /// Propagates the backend reset failure.
    pub fn shutdown(self) -> PipelineResult<()> {
        self.sequencer.shutdown()?;
        Ok(())
    }

    /// Identify, route, and record the next card.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Recognition`](crate::PipelineError::Recognition)
    ///   if identification or the metadata lookup fails
    /// - [`PipelineError::Sequencer`](crate::PipelineError::Sequencer) if
    ///   the physical routing faults; nothing is stored for the card
    /// - [`PipelineError::Storage`](crate::PipelineError::Storage) if rule
    ///   loading or record insertion fails
    #[instrument(skip(self))]
    pub async fn process_next(&mut self) -> PipelineResult<PipelineOutcome> {
        let scan = self.identifier.identify().await?;

        let metadata = match &scan.corrected {
            Some(name) => self.metadata.fetch(name).await?,
            None => None,
        };

        let profile = build_profile(&scan, metadata.as_ref());
        let rules = self.rules.list().await?;
        let direction = evaluate_rules(&rules, &profile);

        info!(
            name = scan.corrected.as_deref().unwrap_or("<unrecognized>"),
            %direction,
            "card decided, routing"
        );

        let report = self.sequencer.route_card(direction).await?;

        let record = build_record(&scan, metadata.as_ref(), direction);
        let card_id = self.cards.add(&record).await?;

        Ok(PipelineOutcome {
            card_id,
            direction,
            report,
        })
    }
}

fn build_profile(scan: &ScannedName, metadata: Option<&CardMetadata>) -> CardProfile {
    CardProfile {
        name: scan.corrected.clone(),
        cmc: metadata.and_then(|m| m.cmc),
        price: metadata.and_then(|m| m.price),
        color_identity: metadata.and_then(|m| m.color_identity.clone()),
        type_line: metadata.and_then(|m| m.type_line.clone()),
    }
}

fn build_record(
    scan: &ScannedName,
    metadata: Option<&CardMetadata>,
    direction: SortDirection,
) -> ScannedCard {
    let mut record =
        ScannedCard::new(scan.corrected.clone(), direction).with_ocr_raw(scan.raw_text.clone());

    if let Some(metadata) = metadata {
        if let Some(price) = metadata.price {
            record = record.with_price(price);
        }
        if let Some(cmc) = metadata.cmc {
            record = record.with_cmc(cmc);
        }
        if let Some(colors) = &metadata.color_identity {
            record = record.with_color_identity(colors.clone());
        }
        if let Some(type_line) = &metadata.type_line {
            record = record.with_type_line(type_line.clone());
        }
        if let Some(uri) = &metadata.image_uri {
            record = record.with_image_uri(uri.clone());
        }
    }

    record
}
