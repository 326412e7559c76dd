use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4/graphql";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collector: CollectorConfig,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            host: "0.0.0.0".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Seconds between collection cycles (first cycle runs immediately).
    pub interval_secs: u64,
    /// Per-request timeout against the remote endpoint. The remote enforces
    /// its own limits; anything outside 15-30s is rejected at load time.
    pub request_timeout_secs: u64,
    pub daily_window_days: i64,
    pub hourly_window_days: i64,
    pub api_url: String,
    /// Fallback account/zone file consulted when no CF_* variables are set.
    pub zones_file: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 7200,
            request_timeout_secs: 30,
            daily_window_days: 45,
            hourly_window_days: 3,
            api_url: DEFAULT_API_URL.into(),
            zones_file: "zones.toml".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    pub output_path: String,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            output_path: "data/analytics.json".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// How often to log collection stats (cycles completed, last duration) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: 600,
        }
    }
}

impl AppConfig {
    /// Load from CONFIG_FILE (default config.toml). A missing file yields
    /// the defaults: deployments driven purely by CF_* variables carry no
    /// config file at all.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(anyhow::anyhow!("cannot read {}: {}", path, e)),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.collector.interval_secs > 0,
            "collector.interval_secs must be > 0, got {}",
            self.collector.interval_secs
        );
        anyhow::ensure!(
            (15..=30).contains(&self.collector.request_timeout_secs),
            "collector.request_timeout_secs must be between 15 and 30, got {}",
            self.collector.request_timeout_secs
        );
        anyhow::ensure!(
            self.collector.daily_window_days > 0,
            "collector.daily_window_days must be > 0, got {}",
            self.collector.daily_window_days
        );
        anyhow::ensure!(
            self.collector.hourly_window_days > 0,
            "collector.hourly_window_days must be > 0, got {}",
            self.collector.hourly_window_days
        );
        anyhow::ensure!(
            !self.collector.api_url.is_empty(),
            "collector.api_url must be non-empty"
        );
        anyhow::ensure!(
            !self.collector.zones_file.is_empty(),
            "collector.zones_file must be non-empty"
        );
        anyhow::ensure!(
            !self.publishing.output_path.is_empty(),
            "publishing.output_path must be non-empty"
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}

/// One zone to collect: `zone_id` is the remote lookup key, `domain` the
/// display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub zone_id: String,
    pub domain: String,
}

/// A token scope grouping one or more zones. Loaded once at startup and
/// immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub token: String,
    pub zones: Vec<Zone>,
}

/// Where the working account list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// CF_CONFIG structured JSON blob.
    EnvJson,
    /// CF_TOKENS/CF_ZONES/CF_DOMAINS shorthand, primary plus indexed.
    EnvShorthand,
    /// Static zones file.
    File,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::EnvJson => write!(f, "CF_CONFIG"),
            ConfigSource::EnvShorthand => write!(f, "CF_* shorthand variables"),
            ConfigSource::File => write!(f, "zones file"),
        }
    }
}

/// Why a configuration source yielded no accounts.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("CF_CONFIG is not set")]
    BlobUnset,
    #[error("CF_CONFIG is not valid JSON: {0}")]
    BlobParse(String),
    #[error("CF_CONFIG contains no accounts")]
    BlobEmpty,
    #[error("no complete shorthand account (CF_TOKENS + CF_ZONES) found")]
    ShorthandAbsent,
    #[error("cannot read {path}: {reason}")]
    FileRead { path: String, reason: String },
    #[error("cannot parse {path}: {reason}")]
    FileParse { path: String, reason: String },
    #[error("{path} contains no accounts")]
    FileEmpty { path: String },
}

impl SourceError {
    /// True for a source that was simply not provided, as opposed to one
    /// that was provided but rejected.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            SourceError::BlobUnset | SourceError::ShorthandAbsent | SourceError::FileRead { .. }
        )
    }
}

#[derive(Debug)]
pub struct SourceFailure {
    pub source: ConfigSource,
    pub error: SourceError,
}

/// Outcome of account resolution: the winning source (if any), the account
/// list it produced, and the failure recorded for every source tried
/// before it. The caller decides what to log; resolution itself is never
/// fatal and an empty account list is valid.
#[derive(Debug)]
pub struct ResolvedAccounts {
    pub accounts: Vec<Account>,
    pub source: Option<ConfigSource>,
    pub skipped: Vec<SourceFailure>,
}

// Wire shape shared by the CF_CONFIG blob (JSON) and the zones file (TOML).
#[derive(Debug, Deserialize)]
struct AccountsDoc {
    #[serde(default)]
    accounts: Vec<RawAccount>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    name: String,
    token: String,
    #[serde(default)]
    zones: Vec<RawZone>,
}

#[derive(Debug, Deserialize)]
struct RawZone {
    zone_id: String,
    domain: Option<String>,
}

impl From<RawAccount> for Account {
    fn from(raw: RawAccount) -> Self {
        Account {
            name: raw.name,
            token: raw.token,
            zones: raw
                .zones
                .into_iter()
                .map(|z| {
                    let domain = match z.domain {
                        Some(d) if !d.is_empty() => d,
                        _ => z.zone_id.clone(),
                    };
                    Zone {
                        zone_id: z.zone_id,
                        domain,
                    }
                })
                .collect(),
        }
    }
}

/// Resolve the working account list from the process environment and the
/// configured zones file.
pub fn resolve_accounts(zones_file: &str) -> ResolvedAccounts {
    let env: HashMap<String, String> = std::env::vars().collect();
    resolve_accounts_from(&env, zones_file)
}

/// Pure resolution over an environment snapshot. Sources in priority
/// order: CF_CONFIG blob, shorthand variables, zones file. The first
/// source yielding at least one account wins; later sources are not
/// consulted.
pub fn resolve_accounts_from(env: &HashMap<String, String>, zones_file: &str) -> ResolvedAccounts {
    let mut skipped = Vec::new();

    match try_env_json(env) {
        Ok(accounts) => {
            return ResolvedAccounts {
                accounts,
                source: Some(ConfigSource::EnvJson),
                skipped,
            };
        }
        Err(error) => skipped.push(SourceFailure {
            source: ConfigSource::EnvJson,
            error,
        }),
    }

    match try_env_shorthand(env) {
        Ok(accounts) => {
            return ResolvedAccounts {
                accounts,
                source: Some(ConfigSource::EnvShorthand),
                skipped,
            };
        }
        Err(error) => skipped.push(SourceFailure {
            source: ConfigSource::EnvShorthand,
            error,
        }),
    }

    match try_file(zones_file) {
        Ok(accounts) => ResolvedAccounts {
            accounts,
            source: Some(ConfigSource::File),
            skipped,
        },
        Err(error) => {
            skipped.push(SourceFailure {
                source: ConfigSource::File,
                error,
            });
            ResolvedAccounts {
                accounts: Vec::new(),
                source: None,
                skipped,
            }
        }
    }
}

fn try_env_json(env: &HashMap<String, String>) -> Result<Vec<Account>, SourceError> {
    let blob = env.get("CF_CONFIG").ok_or(SourceError::BlobUnset)?;
    let doc: AccountsDoc =
        serde_json::from_str(blob).map_err(|e| SourceError::BlobParse(e.to_string()))?;
    if doc.accounts.is_empty() {
        return Err(SourceError::BlobEmpty);
    }
    Ok(doc.accounts.into_iter().map(Account::from).collect())
}

fn try_env_shorthand(env: &HashMap<String, String>) -> Result<Vec<Account>, SourceError> {
    let mut accounts = Vec::new();

    if let Some(account) = shorthand_account(env, "", "Default Account".into()) {
        accounts.push(account);
    }

    // Indexed accounts terminate at the first missing CF_TOKENS_<n>.
    let mut index = 1u32;
    while env.contains_key(&format!("CF_TOKENS_{index}")) {
        let suffix = format!("_{index}");
        if let Some(account) = shorthand_account(env, &suffix, format!("Account{index}")) {
            accounts.push(account);
        }
        index += 1;
    }

    if accounts.is_empty() {
        return Err(SourceError::ShorthandAbsent);
    }
    Ok(accounts)
}

/// One shorthand account from `CF_TOKENS<suffix>` + `CF_ZONES<suffix>`:
/// parallel comma-separated lists, domains defaulting to zone ids, the
/// first token of the token list as the account token.
fn shorthand_account(
    env: &HashMap<String, String>,
    suffix: &str,
    default_name: String,
) -> Option<Account> {
    let tokens = split_list(env.get(&format!("CF_TOKENS{suffix}"))?);
    let zone_ids = split_list(env.get(&format!("CF_ZONES{suffix}"))?);
    if tokens.is_empty() || zone_ids.is_empty() {
        return None;
    }

    let domains = env
        .get(&format!("CF_DOMAINS{suffix}"))
        .map(|s| split_list(s))
        .unwrap_or_default();
    let name = env
        .get(&format!("CF_ACCOUNT_NAME{suffix}"))
        .cloned()
        .unwrap_or(default_name);

    let zones = zone_ids
        .into_iter()
        .enumerate()
        .map(|(i, zone_id)| {
            let domain = domains
                .get(i)
                .filter(|d| !d.is_empty())
                .cloned()
                .unwrap_or_else(|| zone_id.clone());
            Zone { zone_id, domain }
        })
        .collect();

    Some(Account {
        name,
        token: tokens[0].clone(),
        zones,
    })
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn try_file(path: &str) -> Result<Vec<Account>, SourceError> {
    let s = std::fs::read_to_string(path).map_err(|e| SourceError::FileRead {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    let doc: AccountsDoc = toml::from_str(&s).map_err(|e| SourceError::FileParse {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    if doc.accounts.is_empty() {
        return Err(SourceError::FileEmpty {
            path: path.to_string(),
        });
    }
    Ok(doc.accounts.into_iter().map(Account::from).collect())
}
