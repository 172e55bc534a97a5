//! Collaborator trait definitions for the recognition boundary.
//!
//! These traits use native `async fn` methods (Edition 2024 RPITIT); no
//! `async_trait` macro is needed. They are not object-safe — use generic
//! type parameters, as the pipeline does.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{CardMetadata, ScannedName};

/// Produces one identified card name per physical card.
///
/// The real implementation captures a camera frame, crops the title area,
/// runs OCR, and corrects the text against the card-name dictionary. The
/// sorter only sees the end product: a [`ScannedName`].
///
/// # Examples
///
/// ```no_run
/// use cardsort_recognition::{CardIdentifier, Result};
///
/// async fn next_name<I: CardIdentifier>(identifier: &mut I) -> Result<Option<String>> {
///     let scan = identifier.identify().await?;
///     Ok(scan.corrected)
/// }
/// ```
pub trait CardIdentifier: Send + Sync {
    /// Identify the next card.
    ///
    /// Blocks asynchronously until a card has been photographed and its
    /// title processed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input source has ended
    /// - Capture or OCR fails
    async fn identify(&mut self) -> Result<ScannedName>;
}

/// Resolves a card name to price and rules metadata.
///
/// The real implementation queries a card database web API. `Ok(None)`
/// means the service answered but knows no card by that name — distinct
/// from a lookup failure.
pub trait MetadataProvider: Send + Sync {
    /// Fetch metadata for a card name.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails (network, decode);
    /// an unknown name is `Ok(None)`.
    async fn fetch(&self, name: &str) -> Result<Option<CardMetadata>>;
}
