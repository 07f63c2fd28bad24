//! Shared application state: the repositories, use cases, signers, and
//! outbound adapters every handler pulls from. Built once in the server
//! binary and handed to the router behind an `Arc`.

use std::sync::Arc;

use ticketledger_adapters::{PaymentAdapter, TicketService};
use ticketledger_bus::EventBus;
use ticketledger_crypto::{HmacSigner, WebhookVerifier};
use ticketledger_db::{ChargeScheduleRepository, Database, TransactionRepository, WalletRepository};
use ticketledger_usecases::{
    CompleteWithdrawal, EngineConfig, SubmitWithdrawal, UpdateTransactionStatus, VerifyTicketPurchase,
};

pub struct AppState {
    pub db: Arc<Database>,
    pub transactions: Arc<TransactionRepository>,
    pub wallets: Arc<WalletRepository>,
    pub charges: Arc<ChargeScheduleRepository>,
    pub payments: Arc<dyn PaymentAdapter>,
    pub tickets: Arc<dyn TicketService>,
    pub bus: EventBus,

    pub verify_ticket_purchase: Arc<VerifyTicketPurchase>,
    pub submit_withdrawal: Arc<SubmitWithdrawal>,
    pub complete_withdrawal: Arc<CompleteWithdrawal>,
    pub update_transaction_status: Arc<UpdateTransactionStatus>,

    /// Signs/verifies the charge tokens `GET /v1/charges/*` issues and the
    /// checkout/withdrawal endpoints re-verify.
    pub charge_signer: HmacSigner,
    /// Signs/verifies the `resolve-personal-account` response token.
    pub account_signer: HmacSigner,
    pub webhook_verifier: WebhookVerifier,

    pub config: EngineConfig,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<Database>,
        transactions: Arc<TransactionRepository>,
        wallets: Arc<WalletRepository>,
        charges: Arc<ChargeScheduleRepository>,
        payments: Arc<dyn PaymentAdapter>,
        tickets: Arc<dyn TicketService>,
        bus: EventBus,
        verify_ticket_purchase: Arc<VerifyTicketPurchase>,
        submit_withdrawal: Arc<SubmitWithdrawal>,
        complete_withdrawal: Arc<CompleteWithdrawal>,
        update_transaction_status: Arc<UpdateTransactionStatus>,
        webhook_secret: impl Into<Vec<u8>>,
        config: EngineConfig,
    ) -> Self {
        let charge_signer = HmacSigner::new(config.charge_req_key.clone().into_bytes());
        let account_signer = HmacSigner::new(config.account_validation_key.clone().into_bytes());
        Self {
            db,
            transactions,
            wallets,
            charges,
            payments,
            tickets,
            bus,
            verify_ticket_purchase,
            submit_withdrawal,
            complete_withdrawal,
            update_transaction_status,
            charge_signer,
            account_signer,
            webhook_verifier: WebhookVerifier::new(webhook_secret),
            config,
        }
    }
}
