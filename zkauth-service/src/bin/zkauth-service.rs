use clap::Parser as _;
use zkauth_service::config::ZkAuthServiceConfig;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    zkauth_service::telemetry::initialize_tracing()?;
    zkauth_service::metrics::describe_metrics();
    tracing::info!("{}", zkauth_service::version_info());

    let result = zkauth_service::start(
        ZkAuthServiceConfig::parse(),
        zkauth_service::default_shutdown_signal(),
    )
    .await;
    match result {
        Ok(()) => {
            tracing::info!("good night!");
            Ok(())
        }
        Err(err) => {
            tracing::error!("{err:?}");
            Err(err)
        }
    }
}
