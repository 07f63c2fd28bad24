//! The bus-facing event handler: routes
//! `transaction.created` and `transaction.withdraw_successful` to the
//! matching use case. One instance is subscribed to both event types so
//! every inbound event flows through a single dispatch point, each within
//! its own transactional session per use case invocation.

use async_trait::async_trait;
use std::sync::Arc;

use ticketledger_bus::{BusError, EventHandler};
use ticketledger_types::{DomainEvent, EventPayload, TransactionType};

use crate::complete_withdrawal::{CompleteWithdrawal, CompleteWithdrawalInput};
use crate::fund_account::FundAccountFromTxn;
use crate::settle_ticket_purchase::SettleTicketPurchase;
use crate::withdrawal_dispatch::WithdrawalDispatch;

pub struct SettlementEventRouter {
    settle: Arc<SettleTicketPurchase>,
    withdrawal_dispatch: Arc<WithdrawalDispatch>,
    fund_account: Arc<FundAccountFromTxn>,
    complete_withdrawal: Arc<CompleteWithdrawal>,
}

impl SettlementEventRouter {
    pub fn new(
        settle: Arc<SettleTicketPurchase>,
        withdrawal_dispatch: Arc<WithdrawalDispatch>,
        fund_account: Arc<FundAccountFromTxn>,
        complete_withdrawal: Arc<CompleteWithdrawal>,
    ) -> Self {
        Self { settle, withdrawal_dispatch, fund_account, complete_withdrawal }
    }
}

#[async_trait]
impl EventHandler for SettlementEventRouter {
    async fn handle(&self, event: &DomainEvent) -> std::result::Result<(), BusError> {
        let result = match &event.payload {
            EventPayload::TransactionCreated { transaction_type: TransactionType::Purchase, reference, .. } => {
                self.settle.execute(reference).await
            }
            EventPayload::TransactionCreated { transaction_type: TransactionType::Withdrawal, reference, .. } => {
                self.withdrawal_dispatch.execute(reference).await
            }
            EventPayload::TransactionCreated { reference, .. } => {
                // Sale / Commission / WalletFunding settlement children.
                self.fund_account.execute(reference).await
            }
            EventPayload::WithdrawalCompleted { reference, amount, dest, .. } => {
                self.complete_withdrawal
                    .execute(CompleteWithdrawalInput { reference: reference.clone(), amount: *amount, dest: dest.clone() })
                    .await
            }
            _ => Ok(()),
        };
        result.map_err(|e| BusError::Handler(e.to_string()))
    }

    fn name(&self) -> &str {
        "settlement-event-router"
    }
}
