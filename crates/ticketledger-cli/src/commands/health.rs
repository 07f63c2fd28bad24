//! `healthz` - a quick check that the ticketledger API is up and can
//! reach Postgres.

use anyhow::Result;

use crate::client::ApiClient;
use crate::display;

pub async fn check(client: &ApiClient) -> Result<()> {
    display::section("Service health");

    match client.healthz().await {
        Ok(health) if health.status == "healthy" => {
            display::success("ticketledger API is healthy");
            display::kv("postgres", if health.postgres { "reachable" } else { "unreachable" });
        }
        Ok(health) => {
            display::error("ticketledger API reports an unhealthy dependency");
            display::kv("postgres", if health.postgres { "reachable" } else { "unreachable" });
        }
        Err(err) => {
            display::error(&format!("could not reach the ticketledger API: {err}"));
            return Err(err);
        }
    }

    Ok(())
}
