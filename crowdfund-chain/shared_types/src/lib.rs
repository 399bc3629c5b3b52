//! Shared data types for the crowdfunding apps.
//!
//! These types define the payloads exchanged between the fundraiser factory,
//! the fundraiser instances it creates and the command-line client. They are
//! referenced by:
//! - `fundraiser_factory` (registry, pagination, creation events)
//! - `fundraiser` (donation records, donation/withdraw events, access errors)
//! - `crowdfund_client` (decoding query responses)

use std::ops::Range;

use async_graphql::{InputObject, SimpleObject};
use linera_base::identifiers::ApplicationId;
use linera_sdk::linera_base_types::{AccountOwner, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest page `fundraisers(limit, offset)` will ever return.
pub const MAX_PAGE_LIMIT: usize = 20;

/// Event stream written by every fundraiser instance.
pub const FUNDRAISER_STREAM: &str = "fundraiser";

/// Event stream written by the fundraiser factory.
pub const FACTORY_STREAM: &str = "fundraiser_factory";

/// Display metadata of a fundraiser.
///
/// Fixed at creation: it is part of the fundraiser's application parameters.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, InputObject, SimpleObject)]
#[graphql(input_name = "FundraiserMetadataInput")]
pub struct FundraiserMetadata {
    /// Display name.
    pub name: String,
    /// Homepage of the beneficiary.
    pub url: String,
    /// Image shown on listing cards.
    pub image_url: String,
    /// Free-form description.
    pub description: String,
}

impl FundraiserMetadata {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        image_url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            image_url: image_url.into(),
            description: description.into(),
        }
    }

    /// Rejects metadata that cannot be listed.
    pub fn validate(&self) -> Result<(), FundraiserError> {
        if self.name.trim().is_empty() {
            return Err(FundraiserError::EmptyName);
        }
        Ok(())
    }
}

/// A single donation as seen by its donor.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, SimpleObject)]
pub struct Donation {
    pub amount: Amount,
    /// Block time at which the donation was booked.
    pub timestamp: Timestamp,
}

/// Events emitted on [`FUNDRAISER_STREAM`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum FundraiserEvent {
    DonationReceived { donor: AccountOwner, amount: Amount },
    Withdraw { amount: Amount },
}

/// Events emitted on [`FACTORY_STREAM`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum FactoryEvent {
    FundraiserCreated {
        fundraiser: ApplicationId,
        custodian: AccountOwner,
    },
}

/// Failures of crowdfunding operations.
///
/// Contracts turn these into a panic, which rejects the whole block.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FundraiserError {
    #[error("caller {caller} is not authorized, only {custodian} may do this")]
    Unauthorized {
        caller: AccountOwner,
        custodian: AccountOwner,
    },
    #[error("operation requires an authenticated signer")]
    MissingSigner,
    #[error("donation amount must be greater than zero")]
    ZeroDonation,
    #[error("offset out of bounds")]
    OffsetOutOfBounds { offset: usize, count: usize },
    #[error("fundraiser module id not set")]
    ModuleNotSet,
    #[error("fundraiser name is empty")]
    EmptyName,
    #[error("operation must run on the fundraiser's creator chain")]
    WrongChain,
}

/// Index range of one registry page.
///
/// `offset` may equal `count` (empty page) but not exceed it. The page is
/// truncated to what is left in the registry and never longer than
/// [`MAX_PAGE_LIMIT`].
pub fn page_range(count: usize, limit: usize, offset: usize) -> Result<Range<usize>, FundraiserError> {
    if offset > count {
        return Err(FundraiserError::OffsetOutOfBounds { offset, count });
    }
    let size = limit.min(MAX_PAGE_LIMIT).min(count - offset);
    Ok(offset..offset + size)
}

/// Checks that the authenticated `caller` is `custodian`.
///
/// Used for every custodian-only fundraiser operation and for the factory
/// operator.
pub fn ensure_owner(
    caller: Option<AccountOwner>,
    custodian: AccountOwner,
) -> Result<AccountOwner, FundraiserError> {
    let caller = caller.ok_or(FundraiserError::MissingSigner)?;
    if caller != custodian {
        return Err(FundraiserError::Unauthorized { caller, custodian });
    }
    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(byte: u8) -> AccountOwner {
        AccountOwner::Address20([byte; 20])
    }

    #[test]
    fn empty_registry_returns_empty_page() {
        assert_eq!(page_range(0, 10, 0), Ok(0..0));
    }

    #[test]
    fn limit_selects_page_size() {
        assert_eq!(page_range(30, 10, 0).unwrap().len(), 10);
        assert_eq!(page_range(30, 20, 0).unwrap().len(), 20);
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(page_range(30, 30, 0).unwrap().len(), MAX_PAGE_LIMIT);
    }

    #[test]
    fn page_starts_at_offset() {
        assert_eq!(page_range(10, 1, 0), Ok(0..1));
        assert_eq!(page_range(10, 1, 7), Ok(7..8));
    }

    #[test]
    fn page_is_truncated_at_end_of_registry() {
        assert_eq!(page_range(10, 10, 5), Ok(5..10));
        assert_eq!(page_range(10, 1, 10), Ok(10..10));
    }

    #[test]
    fn offset_past_end_is_rejected() {
        let error = page_range(10, 1, 11).unwrap_err();
        assert_eq!(error, FundraiserError::OffsetOutOfBounds { offset: 11, count: 10 });
        assert_eq!(error.to_string(), "offset out of bounds");
    }

    #[test]
    fn only_the_owner_passes() {
        let custodian = owner(1);
        assert_eq!(ensure_owner(Some(custodian), custodian), Ok(custodian));
        assert_eq!(
            ensure_owner(Some(owner(2)), custodian),
            Err(FundraiserError::Unauthorized { caller: owner(2), custodian })
        );
        assert_eq!(ensure_owner(None, custodian), Err(FundraiserError::MissingSigner));
    }

    #[test]
    fn unauthorized_error_names_the_custodian() {
        let custodian = owner(1);
        let error = ensure_owner(Some(owner(2)), custodian).unwrap_err();

        assert_eq!(
            error.to_string(),
            format!("caller {} is not authorized, only {custodian} may do this", owner(2))
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        let metadata = FundraiserMetadata::new("  ", "beneficiary.org", "beneficiary.png", "");
        assert_eq!(metadata.validate(), Err(FundraiserError::EmptyName));
        let metadata = FundraiserMetadata::new("Beneficiary", "", "", "");
        assert_eq!(metadata.validate(), Ok(()));
    }
}
