use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use zkcall_client::{HarnessConfig, OnchainDeployer, ScenarioHarness};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Load environment variables from the `.env` file
    dotenv().ok();
    let config_path = env::var("HARNESS_CONFIG").unwrap_or_else(|_| "harness.json".to_string());
    let config = HarnessConfig::from_file(&config_path)?;

    // setup tracing for harness execution
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(config.log_level()?)
        .init();

    let rpc_url = config.rpc_url()?;
    let priv_key = &env::var("PRIVATE_KEY")?; // deployer key, any funded dev account

    // build signer
    let signer = PrivateKeySigner::from_str(priv_key)?;
    // build wallet for sending txs
    let wallet = EthereumWallet::new(signer);
    // build provider
    let rpc_provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_http(rpc_url);

    let harness = ScenarioHarness::new(
        config.producer_manager(),
        Arc::new(OnchainDeployer::new(rpc_provider)),
    )
    .with_timeout(config.scenario_timeout());

    let scenarios = config.scenarios();
    tracing::info!("running {} scenarios from {config_path}", scenarios.len());
    let results = harness.run_all(&scenarios).await;

    let failed: Vec<&str> = results
        .iter()
        .filter(|(_, result)| result.is_err())
        .map(|(name, _)| name.as_str())
        .collect();
    if !failed.is_empty() {
        return Err(eyre!(
            "{} of {} scenarios failed: {}",
            failed.len(),
            results.len(),
            failed.join(", ")
        ));
    }

    tracing::info!("all {} scenarios passed", results.len());
    Ok(())
}
