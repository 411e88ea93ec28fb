//! Pacu Console CLI
//!
//! Read-only AWS enumeration through Pacu, with optional AI reports

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use pacu_console::orchestration::{ProgressEvent, ProgressObserver};
use pacu_console::reporting::{load_custom_prompt, prompt_has_placeholder, summary};
use pacu_console::security::generate_session_name;
use pacu_console::{
    ConfigLoadOptions, ConfigLoader, ConsoleConfig, ConsoleError, DataQueryClient,
    EnumerationOrchestrator, EnumerationRequest, ModuleCatalog, ProcessRunner, QueryService,
    ReportGenerator, SessionExecutor, SessionFailurePolicy, Settings, SummaryReport,
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Read-only AWS enumeration console driving Pacu
#[derive(Parser)]
#[command(name = "pacu-console")]
#[command(version)]
#[command(about = "Read-only AWS enumeration console driving Pacu", long_about = None)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReportArgs {
    /// Generate an AI report with Ollama afterwards
    #[arg(long)]
    report: bool,

    /// Ollama model for the report
    #[arg(long)]
    model: Option<String>,

    /// Custom prompt; {pacu_data} is replaced with the enumeration data
    #[arg(long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Read the custom prompt from a file
    #[arg(long, value_name = "PATH")]
    prompt_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run enumeration modules against a Pacu session
    Run {
        /// Pacu session name (generated if omitted)
        #[arg(long)]
        session_name: Option<String>,

        /// AWS access key ID
        #[arg(long)]
        access_key: Option<String>,

        /// AWS secret access key
        #[arg(long)]
        secret_key: Option<String>,

        /// AWS session token (temporary credentials)
        #[arg(long)]
        session_token: Option<String>,

        /// AWS region, e.g. us-east-1
        #[arg(short, long)]
        region: Option<String>,

        /// Module to run (repeatable or comma-separated)
        #[arg(short, long = "module", value_delimiter = ',')]
        modules: Vec<String>,

        /// Scan profile (basic, iam, network)
        #[arg(short, long)]
        profile: Option<String>,

        /// Create a new session with the given keys
        #[arg(long)]
        create_new: bool,

        /// Per-module timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// AWS account ID recorded in the summary
        #[arg(long)]
        account_id: Option<String>,

        /// Skip the JSON summary
        #[arg(long)]
        no_summary: bool,

        /// Stop if the session cannot be created
        #[arg(long)]
        abort_on_session_failure: bool,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Query data stored in a Pacu session
    Query {
        /// Pacu session name
        #[arg(long)]
        session_name: String,

        /// Service category to query
        #[arg(long, value_enum, default_value_t = QueryService::All)]
        service: QueryService,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// List available modules and scan profiles
    Modules,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            session_name,
            access_key,
            secret_key,
            session_token,
            region,
            modules,
            profile,
            create_new,
            timeout,
            account_id,
            no_summary,
            abort_on_session_failure,
            report,
        } => {
            let overrides = ConsoleConfig {
                module_timeout_secs: timeout,
                session_failure_policy: abort_on_session_failure
                    .then_some(SessionFailurePolicy::Abort),
                ..Default::default()
            };
            let settings = load_settings(cli.config, Some(overrides)).await?;

            let options = RunOptions {
                session_name,
                access_key,
                secret_key,
                session_token,
                region,
                modules,
                profile,
                create_new,
                account_id,
                no_summary,
                verbose: cli.verbose > 0,
            };
            run_command(&settings, options, report).await
        }
        Commands::Query {
            session_name,
            service,
            report,
        } => {
            let settings = load_settings(cli.config, None).await?;
            query_command(&settings, &session_name, service, report).await
        }
        Commands::Modules => modules_command(),
    }
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbosity >= 3)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}

async fn load_settings(
    config_file: Option<PathBuf>,
    cli_args: Option<ConsoleConfig>,
) -> Result<Settings> {
    let options = ConfigLoadOptions {
        project_path: PathBuf::from("."),
        config_file,
        cli_args,
        env: ConfigLoader::process_env(),
    };

    ConfigLoader::load(options)
        .await
        .context("Failed to load configuration")
}

struct RunOptions {
    session_name: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    session_token: Option<String>,
    region: Option<String>,
    modules: Vec<String>,
    profile: Option<String>,
    create_new: bool,
    account_id: Option<String>,
    no_summary: bool,
    verbose: bool,
}

/// Prints progress lines while modules run
struct ConsoleObserver {
    verbose: bool,
}

impl ProgressObserver for ConsoleObserver {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::SessionCreation {
                session,
                succeeded,
                return_code,
            } => {
                if *succeeded {
                    println!("✅ Session created: {}", session);
                } else {
                    println!(
                        "⚠️  Session creation failed for {} (exit code {})",
                        session, return_code
                    );
                }
            }
            ProgressEvent::ModuleStarted {
                module,
                index,
                total,
            } => {
                println!("\n▶️  [{}/{}] Running module: {}", index + 1, total, module);
            }
            ProgressEvent::ModuleFinished { result, .. } => {
                if self.verbose && !result.stdout.trim().is_empty() {
                    println!("{}", result.stdout.trim_end());
                }
                if self.verbose && !result.stderr.trim().is_empty() {
                    eprintln!("{}", result.stderr.trim_end());
                }

                match &result.error {
                    None => println!(
                        "  ✅ {} completed (return code {})",
                        result.module_name, result.return_code
                    ),
                    Some(error) => println!(
                        "  ❌ {} failed: {} (return code {})",
                        result.module_name, error, result.return_code
                    ),
                }
            }
        }
    }
}

async fn run_command(settings: &Settings, options: RunOptions, report: ReportArgs) -> Result<i32> {
    println!("\n🛰️  pacu-console (read-only enumeration)\n");

    let catalog = ModuleCatalog::builtin();

    let (modules, profile_name) = if !options.modules.is_empty() {
        (Some(options.modules), "custom".to_string())
    } else if let Some(name) = options.profile {
        match catalog.profile(&name) {
            Some(profile) => (Some(profile.modules.clone()), name),
            None => return Ok(preflight_failure(ConsoleError::UnknownProfile { name })),
        }
    } else {
        (None, "default".to_string())
    };

    let custom_prompt = match resolve_prompt(&report).await {
        Ok(prompt) => prompt,
        Err(e) => return Ok(preflight_failure(e)),
    };

    let session_name = options
        .session_name
        .unwrap_or_else(|| generate_session_name(&settings.session_name_prefix));
    println!("Session: {}", session_name);
    if let Some(region) = &options.region {
        println!("Region:  {}", region);
    }
    println!("Profile: {}", profile_name);

    let request = EnumerationRequest {
        session_name: session_name.clone(),
        modules,
        region: options.region.clone(),
        access_key: options.access_key.map(|key| SecretString::new(key.into())),
        secret_key: options.secret_key.map(|key| SecretString::new(key.into())),
        session_token: options
            .session_token
            .map(|token| SecretString::new(token.into())),
        create_new: options.create_new,
    };

    let runner = ProcessRunner::new(settings.pacu_binary.clone());
    let orchestrator = EnumerationOrchestrator::new(runner, &catalog, settings);
    let mut observer = ConsoleObserver {
        verbose: options.verbose,
    };

    let outcome = match orchestrator.run(&request, &mut observer).await {
        Ok(outcome) => outcome,
        Err(e) => return Ok(preflight_failure(e)),
    };

    println!(
        "\n📊 {} module(s): {} succeeded, {} failed",
        outcome.results.len(),
        outcome.succeeded_count(),
        outcome.failed_count()
    );

    if !options.no_summary {
        let summary_report = SummaryReport::build(
            options.region.as_deref().unwrap_or("global"),
            &profile_name,
            &session_name,
            outcome.results.clone(),
            options.account_id,
        );
        match summary::save(&summary_report, &settings.reports_dir).await {
            Ok(path) => println!("📝 Summary saved to {}", path.display()),
            Err(e) => eprintln!("⚠️  Failed to save summary: {}", e),
        }
    }

    if report.report {
        let executor = orchestrator.executor();
        let generated = generate_report(
            settings,
            executor,
            &session_name,
            QueryService::All,
            &report,
            custom_prompt.as_deref(),
        )
        .await?;
        if !generated {
            eprintln!("⚠️  Enumeration finished but no report was generated");
        }
    }

    Ok(outcome.status)
}

async fn query_command(
    settings: &Settings,
    session_name: &str,
    service: QueryService,
    report: ReportArgs,
) -> Result<i32> {
    println!("\n🔍 Querying Pacu data for session {} ({})\n", session_name, service);

    let custom_prompt = match resolve_prompt(&report).await {
        Ok(prompt) => prompt,
        Err(e) => return Ok(preflight_failure(e)),
    };

    let catalog = ModuleCatalog::builtin();
    let executor = SessionExecutor::new(ProcessRunner::new(settings.pacu_binary.clone()), &catalog);

    if report.report {
        let generated = generate_report(
            settings,
            &executor,
            session_name,
            service,
            &report,
            custom_prompt.as_deref(),
        )
        .await?;
        return Ok(if generated { 0 } else { 1 });
    }

    let result = DataQueryClient::new(&executor).query(session_name, service).await;
    if !result.stdout.is_empty() {
        println!("{}", result.stdout.trim_end());
    }
    if !result.stderr.trim().is_empty() {
        eprintln!("{}", result.stderr.trim_end());
    }

    if result.is_success() {
        println!("\n✅ Query completed");
        Ok(0)
    } else {
        println!("\n❌ Query failed with return code {}", result.return_code);
        Ok(1)
    }
}

/// Read the custom prompt before any Pacu work starts; only needed with --report
async fn resolve_prompt(args: &ReportArgs) -> Result<Option<String>, ConsoleError> {
    if !args.report {
        return Ok(None);
    }

    let prompt = load_custom_prompt(args.prompt.as_deref(), args.prompt_file.as_deref()).await?;
    if let Some(prompt) = &prompt
        && !prompt_has_placeholder(prompt)
    {
        eprintln!("⚠️  Custom prompt has no {{pacu_data}} placeholder; the data will not be included");
    }

    Ok(prompt)
}

/// Query `service`, send the output to the model and save the report.
///
/// Returns whether a report file was written.
async fn generate_report(
    settings: &Settings,
    executor: &SessionExecutor<'_, ProcessRunner>,
    session_name: &str,
    service: QueryService,
    args: &ReportArgs,
    custom_prompt: Option<&str>,
) -> Result<bool> {
    let result = DataQueryClient::new(executor).query(session_name, service).await;
    if !result.is_success() {
        eprintln!(
            "⚠️  Data query returned code {}: {}",
            result.return_code,
            result.stderr.trim()
        );
    }

    let model = args.model.as_deref().unwrap_or(&settings.default_model);
    println!("\n🤖 Generating report using {}...", model);

    let generator = ReportGenerator::from_settings(settings)?;
    match generator
        .generate(&result.stdout, session_name, model, custom_prompt)
        .await
    {
        Ok(path) => {
            println!("✅ Report saved to {}", path.display());
            Ok(true)
        }
        Err(e) => {
            eprintln!("❌ Report generation failed: {}", e);
            eprintln!("   💡 {}", e.hint());
            Ok(false)
        }
    }
}

fn modules_command() -> Result<i32> {
    let catalog = ModuleCatalog::builtin();
    let defaults = catalog.default_set();

    println!("\n📚 Available modules\n");
    for module in catalog.modules() {
        let region = if module.requires_region { "region" } else { "global" };
        let marker = if defaults.contains(&module.name) { "*" } else { " " };
        println!("  {} {:<40} {}", marker, module.name, region);
    }
    println!("\n  * run by default when no modules or profile are given");

    println!("\n🎯 Scan profiles\n");
    for profile in catalog.profiles() {
        println!("  {:<10} {}", profile.name, profile.description);
        println!("             {}", profile.modules.join(", "));
    }
    println!();

    Ok(0)
}

fn preflight_failure(error: ConsoleError) -> i32 {
    eprintln!("\n❌ [{}] {}", error.code(), error);
    for action in error.suggested_actions() {
        eprintln!("   💡 {}", action);
    }
    1
}
