#![cfg_attr(target_arch = "wasm32", no_main)]

//! GraphQL service for the fundraiser app.

use std::sync::Arc;

use async_graphql::{EmptySubscription, Object, Request, Response, Schema, SimpleObject};
use linera_sdk::{
    graphql::GraphQLMutationRoot as _,
    linera_base_types::{AccountOwner, Amount, WithServiceAbi},
    views::View,
    Service, ServiceRuntime,
};

use fundraiser::{FundraiserAbi, FundraiserParameters, Operation};
use fundraiser::state::FundraiserState;
use shared_types::{Donation, FundraiserMetadata};

#[derive(Clone)]
pub struct FundraiserService {
    state: Arc<FundraiserState>,
    runtime: Arc<ServiceRuntime<Self>>,
}

linera_sdk::service!(FundraiserService);

impl WithServiceAbi for FundraiserService {
    type Abi = FundraiserAbi;
}

impl Service for FundraiserService {
    type Parameters = FundraiserParameters;

    async fn new(runtime: ServiceRuntime<Self>) -> Self {
        let state = FundraiserState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load FundraiserState");
        FundraiserService {
            state: Arc::new(state),
            runtime: Arc::new(runtime),
        }
    }

    async fn handle_query(&self, request: Request) -> Response {
        let schema = Schema::build(
            self.clone(),
            Operation::mutation_root(self.runtime.clone()),
            EmptySubscription,
        )
        .finish();
        schema.execute(request).await
    }
}

/// Everything a listing card shows, in one query.
#[derive(SimpleObject)]
struct FundraiserSummary {
    metadata: FundraiserMetadata,
    custodian: AccountOwner,
    beneficiary: AccountOwner,
    total_donations: Amount,
    donations_count: u64,
}

#[Object]
impl FundraiserService {
    async fn name(&self) -> String {
        self.runtime.application_parameters().metadata.name
    }

    async fn url(&self) -> String {
        self.runtime.application_parameters().metadata.url
    }

    async fn image_url(&self) -> String {
        self.runtime.application_parameters().metadata.image_url
    }

    async fn description(&self) -> String {
        self.runtime.application_parameters().metadata.description
    }

    async fn custodian(&self) -> AccountOwner {
        self.runtime.application_parameters().custodian
    }

    /// Same as `custodian`.
    async fn owner(&self) -> AccountOwner {
        self.runtime.application_parameters().custodian
    }

    async fn beneficiary(&self) -> AccountOwner {
        self.state.beneficiary()
    }

    async fn total_donations(&self) -> Amount {
        *self.state.total_donations.get()
    }

    async fn donations_count(&self) -> u64 {
        *self.state.donations_count.get()
    }

    async fn total_withdrawn(&self) -> Amount {
        *self.state.total_withdrawn.get()
    }

    /// Native tokens currently held by the fundraiser.
    async fn balance(&self) -> Amount {
        let account = self.runtime.application_id().forget_abi().into();
        self.runtime.owner_balance(account)
    }

    async fn my_donations_count(&self, owner: AccountOwner) -> u64 {
        self.state.donations_count_of(&owner).await
    }

    async fn my_donations(&self, owner: AccountOwner) -> Vec<Donation> {
        self.state.donations_of(&owner).await
    }

    async fn summary(&self) -> FundraiserSummary {
        let parameters = self.runtime.application_parameters();
        FundraiserSummary {
            metadata: parameters.metadata,
            custodian: parameters.custodian,
            beneficiary: self.state.beneficiary(),
            total_donations: *self.state.total_donations.get(),
            donations_count: *self.state.donations_count.get(),
        }
    }
}
