use anyhow::Result;
use eodms_cli::catalog::Catalog;
use eodms_cli::cli::Cli;
use eodms_cli::collector::{Credentials, InputCollector};
use eodms_cli::config::Config;
use eodms_cli::dispatch::{dispatch, PlanDispatcher, RunPlan};
use eodms_cli::error::{support_message, SessionError};
use eodms_cli::geo::AoiValidator;
use eodms_cli::logging;
use eodms_cli::params::{Param, ParamValue, ParameterStore};
use eodms_cli::prompt::Prompter;
use eodms_cli::rapi::RapiClient;
use eodms_cli::syntax::CommandSerializer;
use eodms_cli::workflow::WorkflowTable;
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

const PROGRAM: &str = "eodms-cli";

fn stdio_prompter() -> Prompter<io::StdinLock<'static>, io::Stdout> {
    Prompter::new(io::stdin().lock(), io::stdout())
}

fn interrupted() -> ! {
    let msg = "Process ended by user.";
    println!("\n{}", msg);
    println!("{}", support_message(None));
    error!("{}", msg);
    std::process::exit(1)
}

/// Runs a prompting step on the blocking pool so the runtime stays free to notice Ctrl-C.
async fn prompting<T, F>(step: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SessionError> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(step).await??)
}

async fn load_catalog(cli: &Cli, config: &Config) -> Result<Catalog> {
    if let Some(path) = &config.catalog.file {
        info!("Reading the collection catalog from {}", path.display());
        return Catalog::read(path);
    }

    let session_cli = cli.clone();
    let silent = cli.silent;
    let stored_username = config.credentials.username.clone();
    let credentials: Credentials = prompting(move || {
        let empty = Catalog::default();
        let mut collector = InputCollector::new(
            &empty,
            WorkflowTable::standard(),
            &AoiValidator,
            silent,
            stdio_prompter(),
        );
        let env_password = std::env::var("EODMS_PASSWORD").ok();
        collector.credentials(&session_cli, stored_username.as_deref(), env_password.as_deref())
    })
    .await?;

    println!();
    RapiClient::new(&config.rapi, credentials)?.fetch_catalog().await
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(&cli.config)?
        .with_overrides(cli.downloads.as_deref(), cli.catalog.as_deref());
    logging::init(&config.paths.log)?;

    println!(
        "\nCSV Results will be placed in '{}'.",
        config.paths.results.display()
    );

    let catalog = load_catalog(&cli, &config).await?;
    if !cli.silent {
        println!(
            "\n(For more information on the following prompts, please refer to the README file.)"
        );
    }

    let session_cli = cli.clone();
    let store: ParameterStore = prompting(move || {
        let mut collector = InputCollector::new(
            &catalog,
            WorkflowTable::standard(),
            &AoiValidator,
            session_cli.silent,
            stdio_prompter(),
        );
        collector.collect(&session_cli)
    })
    .await?;

    let serializer = CommandSerializer::default();
    let command = serializer.render(PROGRAM, &store);
    println!("{}", serializer.syntax_block(PROGRAM, &store));
    info!("Command-line Syntax: {}", command);

    let downloads = match store.get(Param::Downloads) {
        Some(ParamValue::Downloads(path)) => path.clone(),
        _ => config.paths.downloads.clone(),
    };
    let plan = RunPlan::new(store, command, downloads)?;
    dispatch(&PlanDispatcher::new(config.paths.results.clone()), &plan).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    if cli.version {
        println!("EODMS-CLI: Version {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    // Covers the whole run, including catalog fetches and dispatch.
    let outcome = tokio::select! {
        outcome = run(cli) => outcome,
        Ok(()) = tokio::signal::ctrl_c() => interrupted(),
    };
    match outcome {
        Ok(()) => {
            println!("\nProcess complete.");
            println!("{}", support_message(None));
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{:#}", err);
            println!("{}", support_message(Some(&format!("{:#}", err))));
            ExitCode::FAILURE
        }
    }
}
