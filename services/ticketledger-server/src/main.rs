//! Ticketledger settlement engine server.
//!
//! Boots Postgres, the in-process event bus, the Paystack adapter, the
//! ticket/user RPC stub clients, wires every use case, then spawns the
//! event-consumer task and the scheduled-settlement worker alongside the
//! axum app.
//!
//! # Usage
//!
//! ```bash
//! ticketledger-server
//! TICKETLEDGER__SERVER__PORT=9000 ticketledger-server
//! ```

mod config;

use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticketledger_adapters::{HttpTicketService, HttpUserService, PaymentAdapter, PaymentConfig, PaystackAdapter, RpcConfig, TicketService, UserService};
use ticketledger_api::state::AppState;
use ticketledger_bus::{BusConfig, EventBus};
use ticketledger_db::{Database, DatabaseConfig};
use ticketledger_usecases::{
    CompleteWithdrawal, EngineConfig, FundAccountFromTxn, SchedulerConfig, ScheduledSettlementWorker, SettleTicketPurchase,
    SettlementEventRouter, SubmitWithdrawal, UpdateTransactionStatus, VerifyTicketPurchase, WithdrawalDispatch,
};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_logging();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting ticketledger-server");

    let server_config = ServerConfig::load();
    let engine_config = EngineConfig::from_env();
    let scheduler_config = SchedulerConfig::from_env();

    let db = init_database(&server_config.database).await?;
    db.migrate().await?;

    let transactions = Arc::new(db.transaction_repo());
    let wallets = Arc::new(db.wallet_repo());
    let charges = Arc::new(db.charge_schedule_repo());

    let (bus, receivers) = EventBus::new(&BusConfig::from_env());

    let payment_config = PaymentConfig::from_env();
    let webhook_secret = payment_config.secret_key.clone();
    let payments: Arc<dyn PaymentAdapter> = Arc::new(PaystackAdapter::new(payment_config));

    let rpc_config = RpcConfig::from_env();
    let tickets: Arc<dyn TicketService> = Arc::new(HttpTicketService::new(&rpc_config));
    let users: Arc<dyn UserService> = Arc::new(HttpUserService::new(&rpc_config));

    let settle_ticket_purchase = Arc::new(SettleTicketPurchase::new(
        transactions.clone(),
        tickets.clone(),
        users,
        bus.clone(),
        engine_config.clone(),
    ));
    let withdrawal_dispatch = Arc::new(WithdrawalDispatch::new(
        transactions.clone(),
        wallets.clone(),
        payments.clone(),
        bus.clone(),
        engine_config.auto_withdrawal_enabled,
    ));
    let fund_account = Arc::new(FundAccountFromTxn::new(transactions.clone(), wallets.clone(), bus.clone(), engine_config.max_wallet_balance));
    let complete_withdrawal = Arc::new(CompleteWithdrawal::new(transactions.clone(), bus.clone()));

    // One router instance, subscribed under both event-type names it
    // matches on internally - `transaction.created` covers purchases,
    // withdrawals, and settlement children, `transaction.withdraw_successful`
    // covers the payout-provider callback.
    let event_router: Arc<dyn ticketledger_bus::EventHandler> =
        Arc::new(SettlementEventRouter::new(settle_ticket_purchase.clone(), withdrawal_dispatch, fund_account, complete_withdrawal.clone()));
    bus.subscribe("transaction.created", event_router.clone());
    bus.subscribe("transaction.withdraw_successful", event_router);
    bus.spawn_consumers(receivers);

    let scheduler_worker = ScheduledSettlementWorker::new(transactions.clone(), settle_ticket_purchase, scheduler_config);
    tokio::spawn(async move { scheduler_worker.run().await });

    let charge_signer = ticketledger_crypto::HmacSigner::new(engine_config.charge_req_key.clone().into_bytes());
    let verify_ticket_purchase = Arc::new(VerifyTicketPurchase::new(transactions.clone(), payments.clone(), charge_signer.clone(), bus.clone()));
    let submit_withdrawal = Arc::new(SubmitWithdrawal::new(transactions.clone(), wallets.clone(), charge_signer, bus.clone()));
    let update_transaction_status = Arc::new(UpdateTransactionStatus::new(transactions.clone(), wallets.clone(), bus.clone()));

    let state = Arc::new(AppState::new(
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
        webhook_secret,
        engine_config,
    ));

    let app = ticketledger_api::create_router(state);

    let addr = server_config.server.socket_addr();
    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(env_filter).with(fmt::layer().with_target(true)).init();
}

async fn init_database(overrides: &config::DatabaseOverrides) -> anyhow::Result<Arc<Database>> {
    let mut db_config = DatabaseConfig::from_env();
    if let Some(max) = overrides.max_connections {
        db_config.pg_max_connections = max;
    }
    if let Some(min) = overrides.min_connections {
        db_config.pg_min_connections = min;
    }

    tracing::info!(url = %db_config.postgres_url_masked(), "connecting to postgres");
    let db = Database::connect(&db_config).await?;

    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("database health check failed");
    }

    Ok(Arc::new(db))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl+c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received sigterm, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_defaults_to_port_8080() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
    }
}
