//! Command-line client for the crowdfunding apps.
//!
//! Reads go to the factory and fundraiser services of a running
//! `linera service`; writes are submitted as GraphQL mutations and signed by
//! that node service's wallet. A write shows up in reads only once its block
//! is confirmed.

mod client;
mod config;
mod provider;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use linera_base::data_types::Amount;
use linera_base::identifiers::{AccountOwner, ApplicationId};
use tracing_subscriber::EnvFilter;

use client::{CrowdfundClient, Listing, NewFundraiser};
use config::Config;
use provider::NodeServiceProvider;

#[derive(Debug, Parser)]
#[command(name = "crowdfund-client", about = "List, create, fund and withdraw fundraisers")]
struct Args {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List fundraisers in creation order.
    List {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one fundraiser in detail.
    Show { fundraiser: ApplicationId },
    /// Create a fundraiser; the wallet owner becomes its custodian.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        beneficiary: AccountOwner,
    },
    /// Donate native tokens, e.g. `donate <fundraiser> 0.0289`.
    Donate { fundraiser: ApplicationId, amount: Amount },
    /// Send the whole balance to the beneficiary (custodian only).
    Withdraw { fundraiser: ApplicationId },
    /// Replace the beneficiary (custodian only).
    SetBeneficiary {
        fundraiser: ApplicationId,
        beneficiary: AccountOwner,
    },
    /// Donations made by the wallet owner.
    MyDonations { fundraiser: ApplicationId },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    args.config.report_degraded();
    let provider = NodeServiceProvider::new(args.config.clone());
    let client = CrowdfundClient::new(args.config, provider);

    match args.command {
        Command::List { limit, offset } => {
            let listing = client.list(limit, offset).await.context("listing fundraisers")?;
            print_listing(&listing);
        }
        Command::Show { fundraiser } => {
            let detail = client
                .detail(&fundraiser)
                .await
                .with_context(|| format!("reading fundraiser {fundraiser}"))?;
            let summary = &detail.summary;
            println!("{}", summary.metadata.name);
            println!("  url:          {}", summary.metadata.url);
            println!("  image:        {}", summary.metadata.image_url);
            println!("  description:  {}", summary.metadata.description);
            println!("  custodian:    {}", summary.custodian);
            println!("  beneficiary:  {}", summary.beneficiary);
            println!(
                "  donations:    {} totalling {}",
                summary.donations_count, summary.total_donations
            );
            println!("  balance:      {}", detail.balance);
            println!("  withdrawn:    {}", detail.total_withdrawn);
            if client.can_withdraw(summary) {
                println!("  you are the custodian and may withdraw");
            }
        }
        Command::Create {
            name,
            url,
            image_url,
            description,
            beneficiary,
        } => {
            let created = client
                .create(NewFundraiser {
                    name,
                    url,
                    image_url,
                    description,
                    beneficiary,
                })
                .await
                .context("creating fundraiser")?;
            println!("Created fundraiser {created}");
        }
        Command::Donate { fundraiser, amount } => {
            client
                .donate(&fundraiser, amount)
                .await
                .with_context(|| format!("donating to {fundraiser}"))?;
        }
        Command::Withdraw { fundraiser } => {
            client
                .withdraw(&fundraiser)
                .await
                .with_context(|| format!("withdrawing from {fundraiser}"))?;
        }
        Command::SetBeneficiary {
            fundraiser,
            beneficiary,
        } => {
            client
                .set_beneficiary(&fundraiser, beneficiary)
                .await
                .with_context(|| format!("setting beneficiary of {fundraiser}"))?;
        }
        Command::MyDonations { fundraiser } => {
            let donations = client
                .my_donations(&fundraiser)
                .await
                .with_context(|| format!("reading donations to {fundraiser}"))?;
            for donation in donations {
                println!("{}  {}", donation.timestamp, donation.amount);
            }
        }
    }

    Ok(())
}

fn print_listing(listing: &Listing) {
    println!("Fundraisers List ({})", listing.count);
    for listed in &listing.fundraisers {
        let summary = &listed.summary;
        println!(
            "{}  {}  {}  beneficiary {}  {} donations, total amount: {}",
            listed.id,
            summary.metadata.name,
            summary.metadata.url,
            summary.beneficiary,
            summary.donations_count,
            summary.total_donations
        );
    }
}
