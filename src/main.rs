use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use slr_assistant::anthropic_client::AnthropicClient;
use slr_assistant::app::create_app;
use slr_assistant::config::{self, Config};
use slr_assistant::consts;
use slr_assistant::errors::AssistantError;
use slr_assistant::llm_client::LLMClient;
use slr_assistant::pmc::PmcClient;
use slr_assistant::pubmed::{self, EutilsClient};
use slr_assistant::screening;
use slr_assistant::service::AssistantService;
use slr_assistant::session::SessionStore;
use slr_assistant::tools;

#[derive(Parser)]
#[command(name = "slr-assistant", version, about = "Systematic literature review assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the chat server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Do not open the chat page in a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Search PubMed and export every matching record to CSV
    Pubmed {
        #[arg(long = "query", num_args = 1.., required_unless_present = "queries_file")]
        queries: Vec<String>,
        /// One query per line
        #[arg(long, conflicts_with = "queries")]
        queries_file: Option<PathBuf>,
        #[arg(long, default_value = "result.csv")]
        output: PathBuf,
    },
    /// Download article PDFs from PubMed Central
    PmcPdfs {
        #[arg(long, num_args = 1.., required_unless_present = "ids_file")]
        ids: Vec<String>,
        /// One PMC id per line
        #[arg(long, conflicts_with = "ids")]
        ids_file: Option<PathBuf>,
        #[arg(long, default_value = "pmc_pdfs")]
        output_dir: PathBuf,
    },
    /// Download the PMC open-access PDF list
    PmcList {
        #[arg(long, default_value = "pmc_csv")]
        output_dir: PathBuf,
    },
    /// Screen exported records against eligibility criteria
    Screen {
        #[arg(long)]
        input: PathBuf,
        /// Text file with the eligibility criteria
        #[arg(long)]
        criteria: PathBuf,
        #[arg(long, default_value = "screened.csv")]
        output: PathBuf,
    },
}

fn read_lines(path: &Path) -> Result<Vec<String>, AssistantError> {
    Ok(std::fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn lines_or(values: Vec<String>, file: Option<PathBuf>) -> Result<Vec<String>, AssistantError> {
    match file {
        Some(path) => read_lines(&path),
        None => Ok(values),
    }
}

async fn serve(
    config: Config,
    http_client: reqwest::Client,
    host: Option<String>,
    port: Option<u16>,
    no_browser: bool,
) -> Result<(), AssistantError> {
    config.require_chat_keys()?;

    let backend = Arc::new(LLMClient::new(
        http_client.clone(),
        &config.openai.api_url,
        &config.openai.api_key,
    ));
    let registry = tools::default_registry(&http_client, &config);
    log::info!("tools: {}", registry.names().join(", "));

    let assistant_service = Arc::new(
        AssistantService::new(
            backend,
            registry,
            Arc::new(SessionStore::new()),
            &config.openai.model,
        )
        .with_max_tool_rounds(config.assistant.max_tool_rounds),
    );

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let config = Arc::new(config);

    let app_factory = move || create_app(assistant_service.clone(), config.clone());
    let server = actix_web::HttpServer::new(app_factory).bind((host.as_str(), port))?;

    let url = format!("http://{}:{}/", host, port);
    log::info!("SLR assistant listening on {}", url);
    if !no_browser {
        if let Err(e) = webbrowser::open(&url) {
            log::warn!("could not open a browser: {}", e);
        }
    }

    server.run().await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AssistantError> {
    let config = config::load_config()?;

    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(consts::CONNECT_TIMEOUT_SECS))
        .read_timeout(Duration::from_secs(consts::READ_TIMEOUT_SECS))
        .build()?;

    match cli.command {
        Command::Serve {
            host,
            port,
            no_browser,
        } => serve(config, http_client, host, port, no_browser).await,
        Command::Pubmed {
            queries,
            queries_file,
            output,
        } => {
            let queries = lines_or(queries, queries_file)?;
            if config.pubmed.api_key.is_empty() {
                log::warn!("PUBMED_API_KEY is not set, E-utilities will apply the lower rate limit");
            }
            let client = EutilsClient::new(http_client, config.pubmed.clone());
            let summary = pubmed::run_pipeline(&client, &queries, &output).await?;
            let elapsed = chrono::Utc::now() - summary.started_at;
            log::info!(
                "run started {} took {}s: {} PMIDs, {} records extracted, {} still missing, saved to {}",
                summary.started_at.to_rfc3339(),
                elapsed.num_seconds(),
                summary.total_pmids,
                summary.extracted,
                summary.still_missing.len(),
                summary.output.display()
            );
            Ok(())
        }
        Command::PmcPdfs {
            ids,
            ids_file,
            output_dir,
        } => {
            let ids = lines_or(ids, ids_file)?;
            let api_key = config.require_pubmed_key()?;
            let client = PmcClient::new(http_client, config.pmc.clone(), api_key);
            let report = client.download_pdfs(&ids, &output_dir).await?;
            log::info!(
                "{} downloaded, {} failed, {} invalid",
                report.downloaded.len(),
                report.failed.len(),
                report.invalid.len()
            );
            Ok(())
        }
        Command::PmcList { output_dir } => {
            let client = PmcClient::new(http_client, config.pmc.clone(), &config.pubmed.api_key);
            client.download_oa_list(&output_dir).await?;
            Ok(())
        }
        Command::Screen {
            input,
            criteria,
            output,
        } => {
            if config.anthropic.api_key.is_empty() {
                return Err(AssistantError::ConfigError(
                    "ANTHROPIC_API_KEY not found in environment variables".to_string(),
                ));
            }
            let records = pubmed::export::load_csv(&input)?;
            let criteria = std::fs::read_to_string(&criteria)?;
            let completer = AnthropicClient::new(http_client, config.anthropic.clone());

            let screened = screening::screen_records(&completer, &records, &criteria).await?;
            screening::save_screened(&output, &screened)
        }
    }
}

#[actix_web::main]
async fn main() -> Result<(), AssistantError> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let result = run(cli).await;
    if let Err(e) = &result {
        log::error!("{}", e);
    }
    result
}
