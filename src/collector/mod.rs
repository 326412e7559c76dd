// Snapshot assembly: accounts in configuration order, zones within an
// account collected concurrently.

mod zone;

pub use zone::{COUNTRY_LIMIT, ZoneWindows, aggregate_countries, collect_zone};

use futures_util::future::join_all;

use crate::client::{CfClient, ClientError};
use crate::config::{Account, CollectorConfig};
use crate::models::{AccountResult, Snapshot};
use crate::query;

pub struct Collector {
    client: CfClient,
    accounts: Vec<Account>,
    daily_window_days: i64,
    hourly_window_days: i64,
}

impl Collector {
    pub fn new(client: CfClient, accounts: Vec<Account>, config: &CollectorConfig) -> Self {
        Self {
            client,
            accounts,
            daily_window_days: config.daily_window_days,
            hourly_window_days: config.hourly_window_days,
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// One full collection cycle. Accounts run sequentially (bounds the
    /// concurrent calls per token to the account's zone count); zones
    /// within an account run concurrently with their output order fixed
    /// by configuration. Windows are computed once per cycle.
    pub async fn collect_snapshot(&self) -> Snapshot {
        let windows = ZoneWindows {
            daily: query::daily_window(self.daily_window_days),
            hourly: query::hourly_window(self.hourly_window_days),
            geography: query::today_window(),
        };

        let mut accounts = Vec::with_capacity(self.accounts.len());
        for (index, account) in self.accounts.iter().enumerate() {
            tracing::info!(
                account = %account.name,
                index = index + 1,
                total = self.accounts.len(),
                zones = account.zones.len(),
                "collecting account"
            );
            accounts.push(self.collect_account(account, &windows).await);
        }
        Snapshot { accounts }
    }

    async fn collect_account(&self, account: &Account, windows: &ZoneWindows) -> AccountResult {
        let zones = join_all(
            account
                .zones
                .iter()
                .map(|zone| collect_zone(&self.client, &account.token, zone, windows)),
        )
        .await;
        AccountResult {
            name: account.name.clone(),
            zones,
        }
    }

    /// Startup validation: probe every account token once and check each
    /// configured zone id is visible to it. Runs before the scheduler
    /// loop; failures are logged and never block collection.
    pub async fn validate_accounts(&self) {
        for account in &self.accounts {
            match self.client.list_accessible_zones(&account.token).await {
                Ok(tags) => {
                    tracing::info!(
                        account = %account.name,
                        accessible_zones = tags.len(),
                        operation = "validate_token",
                        "token validated"
                    );
                    for zone in &account.zones {
                        if !tags.iter().any(|tag| tag == &zone.zone_id) {
                            tracing::warn!(
                                account = %account.name,
                                zone = %zone.domain,
                                zone_id = %zone.zone_id,
                                "configured zone not visible to token"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        account = %account.name,
                        error = %e,
                        operation = "validate_token",
                        "token validation failed"
                    );
                    if matches!(e, ClientError::Unauthorized) {
                        tracing::warn!(
                            account = %account.name,
                            "check the token value, its expiry, and its Analytics:Read scope"
                        );
                    }
                }
            }
        }
    }
}
