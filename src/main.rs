use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use dexcom::{ApiResponse, Client, ClientConfig, DateWindow, Mode, TokenSet};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dexcomctl")]
#[command(about = "Talk to the Dexcom API from the command line", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Bearer token sent with API requests
    #[arg(long, env = "DEXCOM_ACCESS_TOKEN", default_value = "", hide_env_values = true)]
    access_token: String,

    /// "sandbox" or "production"; anything else means production
    #[arg(long, env = "DEXCOM_MODE", default_value = "production")]
    mode: String,

    #[arg(long, env = "DEXCOM_API_VERSION", default_value = dexcom::api::DEFAULT_API_VERSION)]
    api_version: String,

    /// Use the outside-US (EU) domain
    #[arg(long, env = "DEXCOM_OUS")]
    ous: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Registered application credentials shared by the OAuth2 subcommands.
#[derive(clap::Args)]
struct AppCredentials {
    #[arg(long, env = "DEXCOM_CLIENT_ID")]
    client_id: String,

    #[arg(long, env = "DEXCOM_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    #[arg(long, env = "DEXCOM_REDIRECT_URI")]
    redirect_uri: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the login URL that starts the authorization-code flow
    AuthUrl {
        #[arg(long, env = "DEXCOM_CLIENT_ID")]
        client_id: String,

        #[arg(long, env = "DEXCOM_REDIRECT_URI")]
        redirect_uri: String,
    },

    /// Exchange an authorization code for tokens
    ExchangeCode {
        code: String,

        #[command(flatten)]
        credentials: AppCredentials,
    },

    /// Exchange a refresh token for new tokens
    RefreshToken {
        refresh_token: String,

        #[command(flatten)]
        credentials: AppCredentials,
    },

    /// Check that the configured token and environment work
    Test,

    /// GET an arbitrary path under the base URL
    Get {
        /// Path below the versioned base URL, e.g. /users/self/devices
        path: String,

        /// Query parameters (repeatable: -p key=value)
        #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// DELETE an arbitrary path under the base URL
    Delete { path: String },

    /// Estimated glucose values for the last few days
    Egvs {
        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(i64).range(0..=MAX_EGV_DAYS)
        )]
        days: i64,
    },

    /// The range of data available for the user
    DataRange,
}

/// The longest history `egvs` will ask for in one request.
const MAX_EGV_DAYS: i64 = 90;

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn init_tracing(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,dexcom=info".to_string(),
            _ => "info,dexcom=debug".to_string(),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

/// Prints the response envelope and maps its outcome onto the exit code.
fn report(response: &ApiResponse) -> anyhow::Result<ExitCode> {
    let rendered = serde_json::to_string_pretty(response).context("rendering response")?;
    println!("{rendered}");

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ClientConfig::new(
        &cli.access_token,
        Mode::parse_lossy(&cli.mode),
        &cli.api_version,
        cli.ous,
    );
    let client = Client::new(config).context("creating HTTP client")?;

    match cli.command {
        Commands::AuthUrl {
            client_id,
            redirect_uri,
        } => {
            let url = client.auth_url(&redirect_uri, &client_id)?;
            println!("{url}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::ExchangeCode { code, credentials } => {
            let response = client
                .exchange_code(
                    &code,
                    &credentials.redirect_uri,
                    &credentials.client_id,
                    &credentials.client_secret,
                )
                .await;
            report(&response)
        }
        Commands::RefreshToken {
            refresh_token,
            credentials,
        } => {
            let response = client
                .exchange_refresh_token(
                    &refresh_token,
                    &credentials.redirect_uri,
                    &credentials.client_id,
                    &credentials.client_secret,
                )
                .await;
            let code = report(&response)?;
            if response.is_success() {
                let tokens = TokenSet::from_response(response)?;
                if tokens.refresh_token.is_none() {
                    tracing::warn!("no refresh token issued; offline_access may not be granted");
                }
            }
            Ok(code)
        }
        Commands::Test => {
            if client.test_endpoint().await {
                println!("ok: {}", client.base_url());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("failed: {}", client.base_url());
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Get { path, params } => report(&client.get(&path, &params).await),
        Commands::Delete { path } => report(&client.delete(&path).await),
        Commands::Egvs { days } => {
            let window = DateWindow::last_days(Local::now().naive_local(), days)
                .with_context(|| format!("cannot build a {days}-day window ending now"))?;
            report(&client.egvs(&window).await)
        }
        Commands::DataRange => report(&client.data_range().await),
    }
}
