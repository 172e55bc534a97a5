//! Mock recognition collaborators for testing and development.
//!
//! This module provides simulated implementations that can be controlled
//! programmatically without a camera or network access.

use crate::error::{RecognitionError, Result};
use crate::traits::{CardIdentifier, MetadataProvider};
use crate::types::{CardMetadata, ScannedName};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Mock card identifier fed from a test-controlled queue.
///
/// # Examples
///
/// ```
/// use cardsort_recognition::{CardIdentifier, MockIdentifier, ScannedName};
///
/// #[tokio::main]
/// async fn main() -> cardsort_recognition::Result<()> {
///     let (mut identifier, handle) = MockIdentifier::new();
///
///     handle.push_scan(ScannedName::recognized("Sol Ring", "Sol Ring")).await?;
///
///     let scan = identifier.identify().await?;
///     assert_eq!(scan.corrected.as_deref(), Some("Sol Ring"));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockIdentifier {
    scan_rx: mpsc::Receiver<ScannedName>,
}

impl MockIdentifier {
    /// Create a new mock identifier.
    ///
    /// Returns a tuple of (MockIdentifier, MockIdentifierHandle) where the
    /// handle queues the scans the identifier will produce.
    pub fn new() -> (Self, MockIdentifierHandle) {
        let (scan_tx, scan_rx) = mpsc::channel(32);
        (Self { scan_rx }, MockIdentifierHandle { scan_tx })
    }
}

impl CardIdentifier for MockIdentifier {
    async fn identify(&mut self) -> Result<ScannedName> {
        self.scan_rx
            .recv()
            .await
            .ok_or_else(|| RecognitionError::disconnected("mock scan queue closed"))
    }
}

/// Handle for feeding scans to a [`MockIdentifier`].
#[derive(Debug, Clone)]
pub struct MockIdentifierHandle {
    scan_tx: mpsc::Sender<ScannedName>,
}

impl MockIdentifierHandle {
    /// Queue the next scan the identifier will produce.
    ///
    /// # Errors
    /// Returns a disconnected error if the identifier has been dropped.
    pub async fn push_scan(&self, scan: ScannedName) -> Result<()> {
        self.scan_tx
            .send(scan)
            .await
            .map_err(|_| RecognitionError::disconnected("mock identifier dropped"))
    }
}

/// Mock metadata provider backed by an in-memory card database.
#[derive(Debug, Default)]
pub struct MockMetadataProvider {
    cards: Arc<Mutex<HashMap<String, CardMetadata>>>,
}

impl MockMetadataProvider {
    /// Create a new mock provider with an empty card database.
    ///
    /// Returns a tuple of (MockMetadataProvider, MockMetadataHandle) where
    /// the handle manages the card database.
    pub fn new() -> (Self, MockMetadataHandle) {
        let cards = Arc::new(Mutex::new(HashMap::new()));
        (
            Self {
                cards: cards.clone(),
            },
            MockMetadataHandle { cards },
        )
    }
}

impl MetadataProvider for MockMetadataProvider {
    async fn fetch(&self, name: &str) -> Result<Option<CardMetadata>> {
        let cards = self
            .cards
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(cards.get(name).cloned())
    }
}

/// Handle for managing a [`MockMetadataProvider`]'s card database.
#[derive(Debug, Clone)]
pub struct MockMetadataHandle {
    cards: Arc<Mutex<HashMap<String, CardMetadata>>>,
}

impl MockMetadataHandle {
    /// Register metadata for a card name.
    pub fn insert(&self, name: impl Into<String>, metadata: CardMetadata) {
        let mut cards = self
            .cards
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cards.insert(name.into(), metadata);
    }

    /// Number of cards in the database.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
