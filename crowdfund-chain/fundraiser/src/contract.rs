#![cfg_attr(target_arch = "wasm32", no_main)]

//! Contract logic for the fundraiser app.

use linera_base::abi::WithContractAbi;
use linera_sdk::linera_base_types::{Account, AccountOwner, Amount, StreamName};
use linera_sdk::{contract::ContractRuntime, Contract, views::{RootView, View}};
use log::{info, warn};

use fundraiser::{FundraiserAbi, FundraiserInstantiation, FundraiserParameters, Message, Operation};
use fundraiser::state::FundraiserState;
use shared_types::{ensure_owner, FundraiserError, FundraiserEvent, FUNDRAISER_STREAM};

pub struct FundraiserContract {
    state: FundraiserState,
    runtime: ContractRuntime<Self>,
}

linera_sdk::contract!(FundraiserContract);

impl WithContractAbi for FundraiserContract {
    type Abi = FundraiserAbi;
}

impl Contract for FundraiserContract {
    type Message = Message;
    type Parameters = FundraiserParameters;
    type InstantiationArgument = FundraiserInstantiation;
    type EventValue = FundraiserEvent;

    async fn load(runtime: ContractRuntime<Self>) -> Self {
        let state = FundraiserState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        FundraiserContract { state, runtime }
    }

    async fn instantiate(&mut self, argument: Self::InstantiationArgument) {
        let parameters = self.runtime.application_parameters();
        parameters.metadata.validate().unwrap_or_else(|error| panic!("{error}"));
        self.state.beneficiary.set(Some(argument.beneficiary));
    }

    async fn execute_operation(&mut self, operation: Self::Operation) -> Self::Response {
        match operation {
            Operation::Donate { amount } => {
                self.donate(amount).await;
            }
            Operation::SetBeneficiary { beneficiary } => self.set_beneficiary(beneficiary),
            Operation::Withdraw => {
                self.withdraw();
            }
        }
    }

    async fn execute_message(&mut self, message: Self::Message) {
        match message {
            Message::Deposit { donor, amount } => {
                self.book_donation(donor, amount).await;
            }
        }
    }

    async fn store(mut self) {
        self.state.save().await.expect("Failed to save state");
    }
}

impl FundraiserContract {
    /// Returns the event emitted here, or `None` when booking was forwarded
    /// to the creator chain.
    async fn donate(&mut self, amount: Amount) -> Option<FundraiserEvent> {
        if amount == Amount::ZERO {
            panic!("{}", FundraiserError::ZeroDonation);
        }
        let donor = self
            .runtime
            .authenticated_signer()
            .unwrap_or_else(|| panic!("{}", FundraiserError::MissingSigner));

        // Funds always live in the app account on the creator chain.
        let home_chain = self.runtime.application_creator_chain_id();
        let destination = Account {
            chain_id: home_chain,
            owner: self.application_owner(),
        };
        self.runtime.transfer(donor, destination, amount);

        if self.runtime.chain_id() == home_chain {
            Some(self.book_donation(donor, amount).await)
        } else {
            self.runtime
                .prepare_message(Message::Deposit { donor, amount })
                .with_authentication()
                .send_to(home_chain);
            None
        }
    }

    async fn book_donation(&mut self, donor: AccountOwner, amount: Amount) -> FundraiserEvent {
        let timestamp = self.runtime.system_time();
        let event = self
            .state
            .record_donation(donor, amount, timestamp)
            .await
            .unwrap_or_else(|error| panic!("{error}"));
        info!("Donation of {amount} received from {donor}");
        self.runtime.emit(StreamName::from(FUNDRAISER_STREAM), &event);
        event
    }

    fn set_beneficiary(&mut self, beneficiary: AccountOwner) {
        self.ensure_custodian();
        self.state.beneficiary.set(Some(beneficiary));
        info!("Beneficiary set to {beneficiary}");
    }

    fn withdraw(&mut self) -> FundraiserEvent {
        self.ensure_custodian();
        if self.runtime.chain_id() != self.runtime.application_creator_chain_id() {
            panic!("{}", FundraiserError::WrongChain);
        }

        let source = self.application_owner();
        let balance = self.runtime.owner_balance(source);
        let (beneficiary, event) = self.state.record_withdrawal(balance);
        if balance == Amount::ZERO {
            warn!("Withdraw called with an empty balance");
        } else {
            let destination = Account {
                chain_id: self.runtime.chain_id(),
                owner: beneficiary,
            };
            self.runtime.transfer(source, destination, balance);
            info!("Withdrew {balance} to {beneficiary}");
        }
        self.runtime.emit(StreamName::from(FUNDRAISER_STREAM), &event);
        event
    }

    fn ensure_custodian(&mut self) {
        let custodian = self.runtime.application_parameters().custodian;
        ensure_owner(self.runtime.authenticated_signer(), custodian)
            .unwrap_or_else(|error| panic!("{error}"));
    }

    fn application_owner(&mut self) -> AccountOwner {
        self.runtime.application_id().forget_abi().into()
    }
}

#[cfg(test)]
mod tests {
    use linera_sdk::linera_base_types::{
        Account, AccountOwner, Amount, ApplicationId, ChainId, CryptoHash, StreamName, Timestamp,
    };
    use linera_sdk::{util::BlockingWait, views::View, Contract, ContractRuntime};

    use fundraiser::{FundraiserAbi, FundraiserInstantiation, FundraiserParameters, Message, Operation};
    use fundraiser::state::FundraiserState;
    use shared_types::{Donation, FundraiserError, FundraiserEvent, FundraiserMetadata, FUNDRAISER_STREAM};

    use super::FundraiserContract;

    const CUSTODIAN: AccountOwner = AccountOwner::Address20([1; 20]);
    const BENEFICIARY: AccountOwner = AccountOwner::Address20([2; 20]);
    const DONOR: AccountOwner = AccountOwner::Address20([3; 20]);
    const NOW: u64 = 1_000;

    fn home_chain() -> ChainId {
        ChainId(CryptoHash::from([1u64; 4]))
    }

    fn remote_chain() -> ChainId {
        ChainId(CryptoHash::from([2u64; 4]))
    }

    fn fundraiser_app() -> ApplicationId<FundraiserAbi> {
        ApplicationId::new(CryptoHash::from([7u64; 4])).with_abi()
    }

    fn fundraiser_account() -> AccountOwner {
        fundraiser_app().forget_abi().into()
    }

    fn parameters() -> FundraiserParameters {
        FundraiserParameters {
            metadata: FundraiserMetadata::new(
                "Beneficiary Name",
                "beneficiaryname.org",
                "https://placekitten.com/600/350",
                "Beneficiary description",
            ),
            custodian: CUSTODIAN,
        }
    }

    fn create_fundraiser(signer: AccountOwner) -> FundraiserContract {
        create_fundraiser_on(home_chain(), signer)
    }

    fn create_fundraiser_on(chain_id: ChainId, signer: AccountOwner) -> FundraiserContract {
        let runtime = ContractRuntime::new()
            .with_application_parameters(parameters())
            .with_application_id(fundraiser_app())
            .with_chain_id(chain_id)
            .with_application_creator_chain_id(home_chain())
            .with_system_time(Timestamp::from(NOW))
            .with_owner_balances([
                (DONOR, Amount::from_tokens(5)),
                (CUSTODIAN, Amount::ZERO),
                (BENEFICIARY, Amount::ZERO),
                (fundraiser_account(), Amount::ZERO),
            ])
            .with_authenticated_signer(signer);
        let mut contract = FundraiserContract {
            state: FundraiserState::load(runtime.root_view_storage_context())
                .blocking_wait()
                .expect("Failed to read from mock key value store"),
            runtime,
        };
        contract
            .instantiate(FundraiserInstantiation { beneficiary: BENEFICIARY })
            .blocking_wait();
        contract
    }

    /// Index the next event on the fundraiser stream gets, i.e. how many were
    /// emitted before.
    fn emitted_events(fundraiser: &mut FundraiserContract) -> u32 {
        fundraiser.runtime.emit(
            StreamName::from(FUNDRAISER_STREAM),
            &FundraiserEvent::Withdraw { amount: Amount::ZERO },
        )
    }

    #[test]
    fn instantiation_stores_beneficiary() {
        let fundraiser = create_fundraiser(CUSTODIAN);

        assert_eq!(fundraiser.state.beneficiary(), BENEFICIARY);
        assert_eq!(*fundraiser.state.total_donations.get(), Amount::ZERO);
        assert_eq!(*fundraiser.state.donations_count.get(), 0);
    }

    #[test]
    fn donate_moves_tokens_and_books_donation() {
        let mut fundraiser = create_fundraiser(DONOR);
        let value = Amount::from_tokens(2);

        fundraiser
            .execute_operation(Operation::Donate { amount: value })
            .blocking_wait();

        assert_eq!(fundraiser.runtime.owner_balance(DONOR), Amount::from_tokens(3));
        assert_eq!(fundraiser.runtime.owner_balance(fundraiser_account()), value);
        assert_eq!(*fundraiser.state.total_donations.get(), value);
        assert_eq!(*fundraiser.state.donations_count.get(), 1);
        assert_eq!(
            fundraiser.state.donations_of(&DONOR).blocking_wait(),
            vec![Donation { amount: value, timestamp: Timestamp::from(NOW) }]
        );
        assert_eq!(fundraiser.state.donations_count_of(&DONOR).blocking_wait(), 1);
        assert_eq!(emitted_events(&mut fundraiser), 1);
    }

    #[test]
    fn donate_returns_the_emitted_event() {
        let mut fundraiser = create_fundraiser(DONOR);
        let value = Amount::from_millis(28);

        let event = fundraiser.donate(value).blocking_wait();

        assert_eq!(event, Some(FundraiserEvent::DonationReceived { donor: DONOR, amount: value }));
    }

    #[test]
    fn deposit_message_books_like_donate() {
        let value = Amount::from_tokens(2);
        let mut donated = create_fundraiser(DONOR);
        donated
            .execute_operation(Operation::Donate { amount: value })
            .blocking_wait();
        let mut deposited = create_fundraiser(DONOR);

        deposited
            .execute_message(Message::Deposit { donor: DONOR, amount: value })
            .blocking_wait();

        assert_eq!(deposited.state.total_donations.get(), donated.state.total_donations.get());
        assert_eq!(deposited.state.donations_count.get(), donated.state.donations_count.get());
        assert_eq!(
            deposited.state.donations_of(&DONOR).blocking_wait(),
            donated.state.donations_of(&DONOR).blocking_wait()
        );
        assert_eq!(emitted_events(&mut deposited), 1);
    }

    #[test]
    fn donation_from_another_chain_is_forwarded_home() {
        let mut fundraiser = create_fundraiser_on(remote_chain(), DONOR);
        let value = Amount::from_tokens(2);

        let event = fundraiser.donate(value).blocking_wait();

        assert_eq!(event, None);
        assert_eq!(*fundraiser.state.donations_count.get(), 0);
        assert_eq!(fundraiser.runtime.owner_balance(DONOR), Amount::from_tokens(3));
        let home_account = Account {
            chain_id: home_chain(),
            owner: fundraiser_account(),
        };
        assert_eq!(fundraiser.runtime.outgoing_transfers().get(&home_account), Some(&value));
        let requests = fundraiser.runtime.created_send_message_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].destination, home_chain());
        assert!(requests[0].authenticated);
        assert!(matches!(
            requests[0].message,
            Message::Deposit { donor, amount } if donor == DONOR && amount == value
        ));
    }

    #[test]
    fn donations_are_scoped_to_their_donor() {
        let mut fundraiser = create_fundraiser(DONOR);

        for (index, millis) in [10, 20, 30].into_iter().enumerate() {
            fundraiser
                .state
                .record_donation(DONOR, Amount::from_millis(millis), Timestamp::from(index as u64))
                .blocking_wait()
                .expect("Donation should be booked");
        }
        fundraiser
            .state
            .record_donation(CUSTODIAN, Amount::from_millis(5), Timestamp::from(9))
            .blocking_wait()
            .expect("Donation should be booked");

        let mine: Vec<Amount> = fundraiser
            .state
            .donations_of(&DONOR)
            .blocking_wait()
            .into_iter()
            .map(|donation| donation.amount)
            .collect();
        assert_eq!(mine, vec![Amount::from_millis(10), Amount::from_millis(20), Amount::from_millis(30)]);
        assert!(fundraiser.state.donations_of(&BENEFICIARY).blocking_wait().is_empty());
        assert_eq!(fundraiser.state.donations_count_of(&BENEFICIARY).blocking_wait(), 0);
        assert_eq!(*fundraiser.state.donations_count.get(), 4);
        assert_eq!(*fundraiser.state.total_donations.get(), Amount::from_millis(65));
    }

    #[test]
    fn zero_donation_is_rejected() {
        let mut fundraiser = create_fundraiser(DONOR);

        let result = fundraiser
            .state
            .record_donation(DONOR, Amount::ZERO, Timestamp::from(1))
            .blocking_wait();

        assert_eq!(result, Err(FundraiserError::ZeroDonation));
        assert_eq!(*fundraiser.state.donations_count.get(), 0);
    }

    #[test]
    #[should_panic(expected = "donation amount must be greater than zero")]
    fn zero_donate_operation_panics() {
        let mut fundraiser = create_fundraiser(DONOR);
        fundraiser
            .execute_operation(Operation::Donate { amount: Amount::ZERO })
            .blocking_wait();
    }

    #[test]
    fn withdraw_sends_whole_balance_to_beneficiary() {
        let mut fundraiser = create_fundraiser(DONOR);
        let value = Amount::from_tokens(3);
        fundraiser
            .execute_operation(Operation::Donate { amount: value })
            .blocking_wait();
        fundraiser.runtime.set_authenticated_signer(CUSTODIAN);

        let event = fundraiser.withdraw();

        assert_eq!(event, FundraiserEvent::Withdraw { amount: value });
        assert_eq!(fundraiser.runtime.owner_balance(fundraiser_account()), Amount::ZERO);
        assert_eq!(fundraiser.runtime.owner_balance(BENEFICIARY), value);
        assert_eq!(*fundraiser.state.total_withdrawn.get(), value);
        assert_eq!(*fundraiser.state.total_donations.get(), value);
        assert_eq!(fundraiser.state.donations_of(&DONOR).blocking_wait().len(), 1);
        // One donation and one withdrawal.
        assert_eq!(emitted_events(&mut fundraiser), 2);
    }

    #[test]
    fn withdraw_operation_empties_the_account() {
        let mut fundraiser = create_fundraiser(CUSTODIAN);
        fundraiser
            .runtime
            .set_owner_balance(fundraiser_account(), Amount::from_tokens(3));

        fundraiser.execute_operation(Operation::Withdraw).blocking_wait();

        assert_eq!(fundraiser.runtime.owner_balance(fundraiser_account()), Amount::ZERO);
        assert_eq!(fundraiser.runtime.owner_balance(BENEFICIARY), Amount::from_tokens(3));
        assert_eq!(emitted_events(&mut fundraiser), 1);
    }

    #[test]
    fn withdraw_with_empty_balance_still_emits() {
        let mut fundraiser = create_fundraiser(CUSTODIAN);

        let event = fundraiser.withdraw();

        assert_eq!(event, FundraiserEvent::Withdraw { amount: Amount::ZERO });
        assert_eq!(fundraiser.runtime.owner_balance(BENEFICIARY), Amount::ZERO);
        assert_eq!(*fundraiser.state.total_withdrawn.get(), Amount::ZERO);
        assert_eq!(emitted_events(&mut fundraiser), 1);
    }

    #[test]
    #[should_panic(expected = "creator chain")]
    fn withdraw_off_the_creator_chain_panics() {
        let mut fundraiser = create_fundraiser_on(remote_chain(), CUSTODIAN);
        fundraiser.execute_operation(Operation::Withdraw).blocking_wait();
    }

    #[test]
    fn custodian_sets_beneficiary() {
        let mut fundraiser = create_fundraiser(CUSTODIAN);

        fundraiser
            .execute_operation(Operation::SetBeneficiary { beneficiary: DONOR })
            .blocking_wait();

        assert_eq!(fundraiser.state.beneficiary(), DONOR);
    }

    #[test]
    #[should_panic(expected = "is not authorized")]
    fn non_custodian_cannot_set_beneficiary() {
        let mut fundraiser = create_fundraiser(BENEFICIARY);
        fundraiser
            .execute_operation(Operation::SetBeneficiary { beneficiary: DONOR })
            .blocking_wait();
    }

    #[test]
    #[should_panic(expected = "is not authorized")]
    fn non_custodian_cannot_withdraw() {
        let mut fundraiser = create_fundraiser(DONOR);
        fundraiser.execute_operation(Operation::Withdraw).blocking_wait();
    }
}
