#![cfg_attr(target_arch = "wasm32", no_main)]

//! GraphQL service for the fundraiser-factory app.

use std::sync::Arc;

use async_graphql::{EmptySubscription, Object, Request, Response, Schema};
use linera_base::identifiers::ApplicationId;
use linera_sdk::{
    graphql::GraphQLMutationRoot as _,
    linera_base_types::{AccountOwner, WithServiceAbi},
    views::View,
    Service, ServiceRuntime,
};

use fundraiser_factory::{FundraiserFactoryAbi, Operation};
use fundraiser_factory::state::FundraiserFactoryState;
use shared_types::FundraiserMetadata;

#[derive(Clone)]
pub struct FundraiserFactoryService {
    state: Arc<FundraiserFactoryState>,
    runtime: Arc<ServiceRuntime<Self>>,
}

linera_sdk::service!(FundraiserFactoryService);

impl WithServiceAbi for FundraiserFactoryService {
    type Abi = FundraiserFactoryAbi;
}

impl Service for FundraiserFactoryService {
    type Parameters = ();

    async fn new(runtime: ServiceRuntime<Self>) -> Self {
        let state = FundraiserFactoryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load FundraiserFactoryState");
        FundraiserFactoryService {
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

#[Object]
impl FundraiserFactoryService {
    /// Up to `limit` fundraiser app ids starting at `offset`, oldest first.
    /// Fails with "offset out of bounds" past the end of the registry.
    async fn fundraisers(&self, limit: u32, offset: u32) -> async_graphql::Result<Vec<String>> {
        let ids = self.state.fundraisers(limit as usize, offset as usize).await?;
        Ok(ids.iter().map(|id| id.to_string()).collect())
    }

    async fn fundraisers_count(&self) -> u64 {
        self.state.fundraisers_count() as u64
    }

    async fn fundraiser_module_id(&self) -> Option<String> {
        self.state
            .fundraiser_module_id
            .get()
            .as_ref()
            .map(|id| id.to_string())
    }

    async fn operator(&self) -> Option<AccountOwner> {
        *self.state.operator.get()
    }

    async fn fundraiser_metadata(&self, fundraiser: String) -> async_graphql::Result<Option<FundraiserMetadata>> {
        let app_id = fundraiser.parse::<ApplicationId>()?;
        Ok(self.state.metadata(&app_id).await)
    }

    async fn fundraiser_custodian(&self, fundraiser: String) -> async_graphql::Result<Option<AccountOwner>> {
        let app_id = fundraiser.parse::<ApplicationId>()?;
        Ok(self
            .state
            .custodian_by_fundraiser
            .get(&app_id)
            .await
            .expect("Failed to read fundraiser custodian"))
    }
}
