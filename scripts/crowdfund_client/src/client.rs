//! Crowdfunding reads and writes, independent of the transport.

use linera_base::data_types::Amount;
use linera_base::identifiers::{AccountOwner, ApplicationId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use shared_types::Donation;

use crate::config::Config;
use crate::provider::{ClientError, Provider};

const PAGE_QUERY: &str = "query Page($limit: Int!, $offset: Int!) { \
    fundraisersCount fundraisers(limit: $limit, offset: $offset) }";

const COUNT_QUERY: &str = "query { fundraisersCount }";

const LATEST_QUERY: &str = "query Latest($offset: Int!) { fundraisers(limit: 1, offset: $offset) }";

const CUSTODIAN_QUERY: &str = "query Custodian($fundraiser: String!) { \
    fundraiserCustodian(fundraiser: $fundraiser) }";

const SUMMARY_QUERY: &str = "query { summary { \
    metadata { name url imageUrl description } \
    custodian beneficiary totalDonations donationsCount } }";

const DETAIL_QUERY: &str = "query { summary { \
    metadata { name url imageUrl description } \
    custodian beneficiary totalDonations donationsCount } \
    balance totalWithdrawn }";

const MY_DONATIONS_QUERY: &str = "query Mine($owner: AccountOwner!) { \
    myDonations(owner: $owner) { amount timestamp } }";

const CREATE_MUTATION: &str = "mutation Create($name: String!, $url: String!, \
    $imageUrl: String!, $description: String!, $beneficiary: AccountOwner!) { \
    createFundraiser(name: $name, url: $url, imageUrl: $imageUrl, \
    description: $description, beneficiary: $beneficiary) }";

const DONATE_MUTATION: &str = "mutation Donate($amount: Amount!) { donate(amount: $amount) }";

const WITHDRAW_MUTATION: &str = "mutation { withdraw }";

const SET_BENEFICIARY_MUTATION: &str =
    "mutation SetBeneficiary($beneficiary: AccountOwner!) { setBeneficiary(beneficiary: $beneficiary) }";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub metadata: Metadata,
    pub custodian: AccountOwner,
    pub beneficiary: AccountOwner,
    pub total_donations: Amount,
    pub donations_count: u64,
}

/// One fundraiser as shown in a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listed {
    pub id: ApplicationId,
    pub summary: Summary,
}

#[derive(Debug)]
pub struct Listing {
    pub count: u64,
    pub fundraisers: Vec<Listed>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    pub summary: Summary,
    pub balance: Amount,
    pub total_withdrawn: Amount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    fundraisers_count: u64,
    fundraisers: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Count {
    fundraisers_count: u64,
}

#[derive(Deserialize)]
struct Ids {
    fundraisers: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustodianData {
    fundraiser_custodian: Option<AccountOwner>,
}

#[derive(Deserialize)]
struct SummaryData {
    summary: Summary,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyDonations {
    my_donations: Vec<Donation>,
}

/// Fundraiser form input.
#[derive(Clone, Debug)]
pub struct NewFundraiser {
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub description: String,
    pub beneficiary: AccountOwner,
}

pub struct CrowdfundClient<P> {
    config: Config,
    provider: P,
}

impl<P: Provider> CrowdfundClient<P> {
    pub fn new(config: Config, provider: P) -> Self {
        CrowdfundClient { config, provider }
    }

    /// Registry count, one page of ids, then each fundraiser's summary.
    pub async fn list(&self, limit: u32, offset: u32) -> Result<Listing, ClientError> {
        let factory = self.config.factory()?;
        let page: Page = self
            .query(&factory, PAGE_QUERY, json!({ "limit": limit, "offset": offset }))
            .await?;

        let mut fundraisers = Vec::with_capacity(page.fundraisers.len());
        for id in page.fundraisers {
            let id = parse_application_id(&id)?;
            let summary = self.summary(&id).await?;
            fundraisers.push(Listed { id, summary });
        }
        Ok(Listing {
            count: page.fundraisers_count,
            fundraisers,
        })
    }

    pub async fn summary(&self, fundraiser: &ApplicationId) -> Result<Summary, ClientError> {
        let data: SummaryData = self.query(fundraiser, SUMMARY_QUERY, json!({})).await?;
        Ok(data.summary)
    }

    pub async fn detail(&self, fundraiser: &ApplicationId) -> Result<Detail, ClientError> {
        self.query(fundraiser, DETAIL_QUERY, json!({})).await
    }

    pub async fn my_donations(&self, fundraiser: &ApplicationId) -> Result<Vec<Donation>, ClientError> {
        let owner = self.config.wallet()?;
        let data: MyDonations = self
            .query(fundraiser, MY_DONATIONS_QUERY, json!({ "owner": owner }))
            .await?;
        Ok(data.my_donations)
    }

    /// Submits the creation and returns the id of the new fundraiser, read
    /// back from the end of the registry once the block is confirmed.
    pub async fn create(&self, fundraiser: NewFundraiser) -> Result<ApplicationId, ClientError> {
        let custodian = self.config.wallet()?;
        let factory = self.config.factory()?;
        let variables = json!({
            "name": fundraiser.name,
            "url": fundraiser.url,
            "imageUrl": fundraiser.image_url,
            "description": fundraiser.description,
            "beneficiary": fundraiser.beneficiary,
        });
        self.provider.execute(&factory, CREATE_MUTATION, variables).await?;

        let created = self.latest_fundraiser(&factory).await?;
        let data: CustodianData = self
            .query(
                &factory,
                CUSTODIAN_QUERY,
                json!({ "fundraiser": created.to_string() }),
            )
            .await?;
        if data.fundraiser_custodian != Some(custodian) {
            return Err(ClientError::UnexpectedResponse(format!(
                "latest fundraiser {created} was not created by {custodian}"
            )));
        }
        info!("Fundraiser {:?} created as {created}", fundraiser.name);
        Ok(created)
    }

    async fn latest_fundraiser(&self, factory: &ApplicationId) -> Result<ApplicationId, ClientError> {
        let count: Count = self.query(factory, COUNT_QUERY, json!({})).await?;
        let offset = count
            .fundraisers_count
            .checked_sub(1)
            .ok_or_else(|| ClientError::UnexpectedResponse("factory registry is empty".to_string()))?;
        let page: Ids = self
            .query(factory, LATEST_QUERY, json!({ "offset": offset }))
            .await?;
        let id = page
            .fundraisers
            .first()
            .ok_or_else(|| ClientError::UnexpectedResponse("factory returned no fundraiser".to_string()))?;
        parse_application_id(id)
    }

    pub async fn donate(&self, fundraiser: &ApplicationId, amount: Amount) -> Result<(), ClientError> {
        self.config.wallet()?;
        self.provider
            .execute(fundraiser, DONATE_MUTATION, json!({ "amount": amount }))
            .await?;
        info!("Donation of {amount} to {fundraiser} submitted");
        Ok(())
    }

    pub async fn withdraw(&self, fundraiser: &ApplicationId) -> Result<(), ClientError> {
        self.config.wallet()?;
        self.provider
            .execute(fundraiser, WITHDRAW_MUTATION, json!({}))
            .await?;
        info!("Withdrawal from {fundraiser} submitted");
        Ok(())
    }

    pub async fn set_beneficiary(
        &self,
        fundraiser: &ApplicationId,
        beneficiary: AccountOwner,
    ) -> Result<(), ClientError> {
        self.config.wallet()?;
        self.provider
            .execute(
                fundraiser,
                SET_BENEFICIARY_MUTATION,
                json!({ "beneficiary": beneficiary }),
            )
            .await?;
        info!("Beneficiary change on {fundraiser} submitted");
        Ok(())
    }

    /// Whether the configured wallet is the fundraiser's custodian.
    pub fn can_withdraw(&self, summary: &Summary) -> bool {
        self.config.owner == Some(summary.custodian)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        application: &ApplicationId,
        query: &str,
        variables: Value,
    ) -> Result<T, ClientError> {
        let data = self.provider.execute(application, query, variables).await?;
        serde_json::from_value(data).map_err(|error| ClientError::UnexpectedResponse(error.to_string()))
    }
}

fn parse_application_id(id: &str) -> Result<ApplicationId, ClientError> {
    id.parse()
        .map_err(|_| ClientError::UnexpectedResponse(format!("invalid application id {id}")))
}
