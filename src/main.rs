use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use line_relay::api::ApiServer;
use line_relay::{Config, LineClient, OpenAiClient, Relay, Scenario, SupabaseStore};

/// LINE relay - answers LINE chats with a generative AI API
#[derive(Parser)]
#[command(name = "line-relay", version, about)]
struct Cli {
    /// Port to listen on (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate configuration and templates, then exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging based on verbosity; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info,line_relay=info",
        1 => "info,line_relay=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    let templates = config.load_templates()?;

    tracing::debug!(?config, "loaded configuration");

    if cli.check_config {
        println!("configuration ok");
        println!("  port:          {}", config.port);
        println!("  model:         {}", config.llm.model);
        println!("  bucket:        {}/{}", config.store.bucket, config.store.prefix);
        println!("  records table: {}", config.store.records_table);
        println!("  record policy: {:?}", config.record_policy);
        println!(
            "  templates:     {}",
            config
                .templates_path
                .as_ref()
                .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
        );
        println!("  greeting:      {}", templates.get(Scenario::Greeting));
        return Ok(());
    }

    let messenger = LineClient::new(config.line.channel_access_token.clone(), config.http_timeout)?;
    let completion = OpenAiClient::new(
        config.llm.api_key.clone(),
        config.llm.model.clone(),
        config.llm.max_tokens,
        config.http_timeout,
    )?;
    let store = SupabaseStore::new(&config.store, config.http_timeout)?;

    let relay = Relay::new(
        Arc::new(messenger),
        Arc::new(completion),
        Arc::new(store),
        templates,
    )
    .with_storage_prefix(config.store.prefix.clone())
    .with_record_policy(config.record_policy);

    tracing::info!(
        port = config.port,
        model = %config.llm.model,
        record_policy = ?config.record_policy,
        "starting LINE relay"
    );

    ApiServer::new(relay, config.line.channel_secret, config.port)
        .run()
        .await?;

    Ok(())
}
