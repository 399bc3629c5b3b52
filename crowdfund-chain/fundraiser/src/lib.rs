//! Fundraiser app crate root.
//!
//! One instance per beneficiary, created by the fundraiser factory. Accepts
//! donations from anyone and lets its custodian withdraw the collected balance
//! to the beneficiary or replace the beneficiary.

pub mod state;

use linera_sdk::{
    graphql::GraphQLMutationRoot,
    linera_base_types::{AccountOwner, Amount, ContractAbi, ServiceAbi},
};
use serde::{Deserialize, Serialize};

use shared_types::FundraiserMetadata;

/// Parameters of a fundraiser instance. Immutable once created.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FundraiserParameters {
    pub metadata: FundraiserMetadata,
    /// Account allowed to withdraw and to change the beneficiary.
    pub custodian: AccountOwner,
}

/// Instantiation argument of a fundraiser instance.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FundraiserInstantiation {
    pub beneficiary: AccountOwner,
}

/// Operations executed by the fundraiser app.
#[derive(Debug, Deserialize, Serialize, GraphQLMutationRoot)]
pub enum Operation {
    /// Signer donates `amount` native tokens.
    Donate { amount: Amount },
    /// Custodian replaces the beneficiary.
    SetBeneficiary { beneficiary: AccountOwner },
    /// Custodian sends the whole balance to the beneficiary.
    Withdraw,
}

/// Cross-chain messages between instances of the fundraiser app.
#[derive(Debug, Deserialize, Serialize)]
pub enum Message {
    /// Tokens already credited to the app account on the creator chain, booked
    /// there as a donation from `donor`.
    Deposit { donor: AccountOwner, amount: Amount },
}

/// ABI for the fundraiser app.
pub struct FundraiserAbi;

impl ContractAbi for FundraiserAbi {
    type Operation = Operation;
    type Response = ();
}

impl ServiceAbi for FundraiserAbi {
    type Query = async_graphql::Request;
    type QueryResponse = async_graphql::Response;
}
