#![cfg_attr(target_arch = "wasm32", no_main)]

//! Contract logic for the fundraiser-factory app.

use linera_base::abi::WithContractAbi;
use linera_base::identifiers::{AccountOwner, ModuleId};
use linera_sdk::linera_base_types::StreamName;
use linera_sdk::{contract::ContractRuntime, Contract, views::{RootView, View}};
use log::info;

use fundraiser::{FundraiserAbi, FundraiserInstantiation, FundraiserParameters};
use fundraiser_factory::{FundraiserFactoryAbi, Operation};
use fundraiser_factory::state::FundraiserFactoryState;
use shared_types::{FactoryEvent, FundraiserError, FundraiserMetadata, FACTORY_STREAM};

pub struct FundraiserFactoryContract {
    state: FundraiserFactoryState,
    runtime: ContractRuntime<Self>,
}

linera_sdk::contract!(FundraiserFactoryContract);

impl WithContractAbi for FundraiserFactoryContract {
    type Abi = FundraiserFactoryAbi;
}

impl Contract for FundraiserFactoryContract {
    type Message = ();
    type Parameters = ();
    type InstantiationArgument = Option<String>;
    type EventValue = FactoryEvent;

    async fn load(runtime: ContractRuntime<Self>) -> Self {
        let state = FundraiserFactoryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        FundraiserFactoryContract { state, runtime }
    }

    async fn instantiate(&mut self, module_id: Self::InstantiationArgument) {
        let operator = self
            .runtime
            .authenticated_signer()
            .unwrap_or_else(|| panic!("{}", FundraiserError::MissingSigner));
        self.state.operator.set(Some(operator));
        if let Some(module_id) = module_id {
            let parsed = module_id.parse::<ModuleId>().expect("Invalid module id");
            self.state.fundraiser_module_id.set(Some(parsed));
        }
    }

    async fn execute_operation(&mut self, operation: Self::Operation) -> Self::Response {
        match operation {
            Operation::SetModule { module_id } => self.set_module(module_id),
            Operation::CreateFundraiser {
                name,
                url,
                image_url,
                description,
                beneficiary,
            } => {
                let metadata = FundraiserMetadata::new(name, url, image_url, description);
                self.create_fundraiser(metadata, beneficiary);
            }
        }
    }

    async fn execute_message(&mut self, _message: Self::Message) {}

    async fn store(mut self) {
        self.state.save().await.expect("Failed to save state");
    }
}

impl FundraiserFactoryContract {
    fn set_module(&mut self, module_id: String) {
        self.state
            .ensure_operator(self.runtime.authenticated_signer())
            .unwrap_or_else(|error| panic!("{error}"));
        let parsed = module_id.parse::<ModuleId>().expect("Invalid module id");
        self.state.fundraiser_module_id.set(Some(parsed));
    }

    fn create_fundraiser(
        &mut self,
        metadata: FundraiserMetadata,
        beneficiary: AccountOwner,
    ) -> FactoryEvent {
        let custodian = self
            .runtime
            .authenticated_signer()
            .unwrap_or_else(|| panic!("{}", FundraiserError::MissingSigner));
        metadata.validate().unwrap_or_else(|error| panic!("{error}"));
        let module_id = self
            .state
            .module_id()
            .unwrap_or_else(|error| panic!("{error}"));

        let parameters = FundraiserParameters {
            metadata: metadata.clone(),
            custodian,
        };
        let fundraiser = self
            .runtime
            .create_application::<FundraiserAbi, FundraiserParameters, FundraiserInstantiation>(
                module_id.with_abi(),
                &parameters,
                &FundraiserInstantiation { beneficiary },
                vec![],
            )
            .forget_abi();

        info!("Created fundraiser {fundraiser} ({}) for custodian {custodian}", metadata.name);
        let event = self.state.register(fundraiser, metadata, custodian);
        self.runtime.emit(StreamName::from(FACTORY_STREAM), &event);
        event
    }
}
