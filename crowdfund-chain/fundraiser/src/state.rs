//! On-chain state for the fundraiser app.

use linera_sdk::linera_base_types::{AccountOwner, Amount, Timestamp};
use linera_sdk::views::{
    linera_views, CollectionView, LogView, RegisterView, RootView, ViewStorageContext,
};

use shared_types::{Donation, FundraiserError, FundraiserEvent};

/// Persistent donation book of one fundraiser.
#[derive(RootView)]
#[view(context = ViewStorageContext)]
pub struct FundraiserState {
    /// Receiver of withdrawals. Set at instantiation.
    pub beneficiary: RegisterView<Option<AccountOwner>>,
    /// Sum of every donation ever booked.
    pub total_donations: RegisterView<Amount>,
    /// Number of donations ever booked, all donors together.
    pub donations_count: RegisterView<u64>,
    /// Sum of every withdrawal sent to a beneficiary.
    pub total_withdrawn: RegisterView<Amount>,
    /// Donation history per donor, oldest first.
    pub donations: CollectionView<AccountOwner, LogView<Donation>>,
}

impl FundraiserState {
    pub fn beneficiary(&self) -> AccountOwner {
        (*self.beneficiary.get()).expect("Beneficiary not initialized")
    }

    /// Books a donation and returns the event to publish.
    pub async fn record_donation(
        &mut self,
        donor: AccountOwner,
        amount: Amount,
        timestamp: Timestamp,
    ) -> Result<FundraiserEvent, FundraiserError> {
        if amount == Amount::ZERO {
            return Err(FundraiserError::ZeroDonation);
        }
        self.donations
            .load_entry_mut(&donor)
            .await
            .expect("Failed to load donation history")
            .push(Donation { amount, timestamp });

        let total = self.total_donations.get().saturating_add(amount);
        self.total_donations.set(total);
        let count = *self.donations_count.get() + 1;
        self.donations_count.set(count);

        Ok(FundraiserEvent::DonationReceived { donor, amount })
    }

    /// Books a withdrawal of `amount` and returns where it goes and the event
    /// to publish. Donation history is left untouched.
    pub fn record_withdrawal(&mut self, amount: Amount) -> (AccountOwner, FundraiserEvent) {
        let withdrawn = self.total_withdrawn.get().saturating_add(amount);
        self.total_withdrawn.set(withdrawn);
        (self.beneficiary(), FundraiserEvent::Withdraw { amount })
    }

    pub async fn donations_of(&self, donor: &AccountOwner) -> Vec<Donation> {
        match self
            .donations
            .try_load_entry(donor)
            .await
            .expect("Failed to load donation history")
        {
            Some(history) => history.read(..).await.expect("Failed to read donations"),
            None => Vec::new(),
        }
    }

    pub async fn donations_count_of(&self, donor: &AccountOwner) -> u64 {
        self.donations
            .try_load_entry(donor)
            .await
            .expect("Failed to load donation history")
            .map_or(0, |history| history.count() as u64)
    }
}
