//! Fundraiser-factory app crate root.
//!
//! Defines the ABI and operations for creating fundraiser app instances from a
//! published fundraiser module and for enumerating them.

pub mod state;

use linera_sdk::{
    graphql::GraphQLMutationRoot,
    linera_base_types::{AccountOwner, ContractAbi, ServiceAbi},
};
use serde::{Deserialize, Serialize};

/// ABI definition for the fundraiser-factory app.
pub struct FundraiserFactoryAbi;

/// Operations executed by the fundraiser-factory app.
#[derive(Debug, Deserialize, Serialize, GraphQLMutationRoot)]
pub enum Operation {
    /// Operator records the fundraiser ModuleId.
    SetModule { module_id: String },
    /// Anyone creates a fundraiser; the signer becomes its custodian.
    CreateFundraiser {
        name: String,
        url: String,
        image_url: String,
        description: String,
        beneficiary: AccountOwner,
    },
}

impl ContractAbi for FundraiserFactoryAbi {
    type Operation = Operation;
    type Response = ();
}

impl ServiceAbi for FundraiserFactoryAbi {
    type Query = async_graphql::Request;
    type QueryResponse = async_graphql::Response;
}
