use clap::Args;
use linera_base::identifiers::{AccountOwner, ApplicationId, ChainId};
use tracing::warn;

use crate::provider::ClientError;

/// Where the client finds the node service, the factory and the wallet.
#[derive(Clone, Debug, Args)]
pub struct Config {
    /// Base URL of `linera service`.
    #[arg(long, env = "LINERA_NODE_URL", default_value = "http://localhost:8080")]
    pub node_url: String,

    /// Chain hosting the factory and its fundraisers.
    #[arg(long, env = "LINERA_CHAIN_ID")]
    pub chain_id: ChainId,

    /// Fundraiser factory application id.
    #[arg(long, env = "FUNDRAISER_FACTORY_APP_ID")]
    pub factory: Option<ApplicationId>,

    /// Wallet owner signing through the node service. Without it the client is
    /// read-only.
    #[arg(long, env = "LINERA_OWNER")]
    pub owner: Option<AccountOwner>,
}

impl Config {
    /// GraphQL endpoint of one application on the configured chain.
    pub fn application_url(&self, application: &ApplicationId) -> String {
        format!(
            "{}/chains/{}/applications/{}",
            self.node_url.trim_end_matches('/'),
            self.chain_id,
            application
        )
    }

    pub fn factory(&self) -> Result<ApplicationId, ClientError> {
        self.factory
            .ok_or(ClientError::MissingConfig("FUNDRAISER_FACTORY_APP_ID"))
    }

    pub fn wallet(&self) -> Result<AccountOwner, ClientError> {
        self.owner.ok_or(ClientError::WalletUnavailable)
    }

    /// Logs what is missing instead of refusing to start.
    pub fn report_degraded(&self) {
        if self.owner.is_none() {
            warn!("No wallet owner configured (LINERA_OWNER); running read-only");
        }
        if self.factory.is_none() {
            warn!("No factory configured (FUNDRAISER_FACTORY_APP_ID); fundraisers cannot be listed");
        }
    }
}
