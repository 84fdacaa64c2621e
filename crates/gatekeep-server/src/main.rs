use gatekeep_server::{GatekeepServer, ServerConfig, ServerError, cli};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let matches = cli::new().get_matches();
    let args = cli::Args::from_matches(&matches);

    let mut config = ServerConfig::load(&args.config)?;
    args.apply(&mut config);
    gatekeep_server::init_tracing(&config.log);

    let server = GatekeepServer::bind(config).await?;
    let host = server.handle();

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
            host.shutdown().await
        }
    }
}
