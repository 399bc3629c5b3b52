//! On-chain state for the fundraiser-factory app.

use linera_base::identifiers::{ApplicationId, ModuleId};
use linera_sdk::linera_base_types::AccountOwner;
use linera_sdk::views::{linera_views, LogView, MapView, RegisterView, RootView, ViewStorageContext};

use shared_types::{page_range, FactoryEvent, FundraiserError, FundraiserMetadata};

/// Persistent storage for fundraiser-factory app.
#[derive(RootView)]
#[view(context = ViewStorageContext)]
pub struct FundraiserFactoryState {
    /// Signer that instantiated the factory. Always set after instantiation.
    pub operator: RegisterView<Option<AccountOwner>>,
    /// Published fundraiser module id (bytecode).
    pub fundraiser_module_id: RegisterView<Option<ModuleId>>,

    /// Registry: fundraiser app ids in creation order.
    pub fundraisers: LogView<ApplicationId>,
    /// Registry: fundraiser app id -> metadata.
    pub metadata_by_fundraiser: MapView<ApplicationId, FundraiserMetadata>,
    /// Registry: fundraiser app id -> custodian.
    pub custodian_by_fundraiser: MapView<ApplicationId, AccountOwner>,
}

impl FundraiserFactoryState {
    /// Checks that `caller` is the operator and may record the module id.
    pub fn ensure_operator(&self, caller: Option<AccountOwner>) -> Result<(), FundraiserError> {
        let operator = (*self.operator.get()).expect("Operator not initialized");
        shared_types::ensure_owner(caller, operator).map(|_| ())
    }

    pub fn module_id(&self) -> Result<ModuleId, FundraiserError> {
        self.fundraiser_module_id
            .get()
            .clone()
            .ok_or(FundraiserError::ModuleNotSet)
    }

    /// Appends a freshly created fundraiser and returns the event to publish.
    pub fn register(
        &mut self,
        fundraiser: ApplicationId,
        metadata: FundraiserMetadata,
        custodian: AccountOwner,
    ) -> FactoryEvent {
        self.fundraisers.push(fundraiser);
        self.metadata_by_fundraiser
            .insert(&fundraiser, metadata)
            .expect("Failed to insert fundraiser metadata");
        self.custodian_by_fundraiser
            .insert(&fundraiser, custodian)
            .expect("Failed to insert fundraiser custodian");
        FactoryEvent::FundraiserCreated { fundraiser, custodian }
    }

    pub fn fundraisers_count(&self) -> usize {
        self.fundraisers.count()
    }

    /// One page of the registry, in creation order.
    pub async fn fundraisers(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ApplicationId>, FundraiserError> {
        let range = page_range(self.fundraisers.count(), limit, offset)?;
        Ok(self
            .fundraisers
            .read(range)
            .await
            .expect("Failed to read fundraiser registry"))
    }

    pub async fn metadata(&self, fundraiser: &ApplicationId) -> Option<FundraiserMetadata> {
        self.metadata_by_fundraiser
            .get(fundraiser)
            .await
            .expect("Failed to read fundraiser metadata")
    }
}
