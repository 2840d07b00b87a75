//! Mobile Lane CLI
//!
//! Entry point for the `mobile-lane` command-line tool.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use serde_json::{json, Map, Value};

use mobile_lane::command::SystemCommandRunner;
use mobile_lane::config::{
    default_user_config_path, ConfigError, CrittercismSettings, DeviceFarmSettings,
    EffectiveConfig, TranslationsSettings, REPO_CONFIG_FILE,
};
use mobile_lane::crittercism::{
    resolve_dsym_path, HttpSymbolApi, SymbolUploadConfig, SymbolUploader,
};
use mobile_lane::devicefarm::{
    DeviceFarmError, DeviceFarmUploader, HttpArtifactTransfer, HttpDeviceFarm, UploadConfig,
};
use mobile_lane::logging;
use mobile_lane::poll::PollPolicy;
use mobile_lane::translations::{
    TranslationsConfig, TranslationsSummary, TranslationsUpdater, DEFAULT_COMMIT_MESSAGE,
};

#[derive(Parser)]
#[command(name = "mobile-lane")]
#[command(about = "Release-lane actions for mobile apps", version)]
struct Cli {
    /// Path to config file (default: ./.mobile-lane.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Output the summary as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (overridden by MOBILE_LANE_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload binaries to AWS Device Farm and schedule a test run
    DeviceFarm {
        /// Device Farm project name
        #[arg(long, env = "FL_AWS_DEVICE_FARM_NAME")]
        name: String,

        /// Application binary (.apk or .ipa)
        #[arg(long, env = "FL_AWS_DEVICE_FARM_PATH")]
        binary_path: PathBuf,

        /// Instrumentation test package
        #[arg(long, env = "FL_AWS_DEVICE_FARM_TEST_PATH")]
        test_binary_path: Option<PathBuf>,

        /// Device pool name
        #[arg(long, env = "FL_AWS_DEVICE_FARM_POOL")]
        device_pool: String,

        /// Wait for the run to complete and check its result
        #[arg(
            long,
            env = "FL_AWS_DEVICE_FARM_WAIT_FOR_COMPLETION",
            default_value_t = true,
            action = ArgAction::Set
        )]
        wait_for_completion: bool,

        /// AWS region
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,

        /// Seconds between status polls
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Give up waiting after this many seconds (0 = never)
        #[arg(long)]
        max_wait: Option<u64>,
    },

    /// Upload a dSYM file to Crittercism
    Crittercism {
        /// dSYM bundle or zip (default: DSYM_OUTPUT_PATH, then DSYM_ZIP_PATH)
        #[arg(long, env = "FL_CRITTERCISM_FILE")]
        dsym: Option<PathBuf>,

        #[arg(long, env = "FL_CRITTERCISM_OAUTH_TOKEN", hide_env_values = true)]
        oauth_token: Option<String>,

        #[arg(long, env = "FL_CRITTERCISM_APP_ID")]
        app_id: Option<String>,

        /// Log every HTTP exchange
        #[arg(long, env = "FL_CRITTERCISM_VERBOSE")]
        verbose_upload: bool,
    },

    /// Import translations and commit the changed .strings files
    UpdateTranslations {
        /// Project root (default: current directory)
        #[arg(long, env = "FL_TRANSLATIONS_PROJECT_ROOT")]
        project_root: Option<PathBuf>,

        #[arg(long, env = "FL_TRANSLATIONS_COMMIT_MESSAGE", default_value = DEFAULT_COMMIT_MESSAGE)]
        commit_message: String,
    },

    /// Print the effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match cli.command {
        Commands::DeviceFarm {
            name,
            binary_path,
            test_binary_path,
            device_pool,
            wait_for_completion,
            region,
            poll_interval,
            max_wait,
        } => {
            let mut overrides = Map::new();
            if let Some(region) = region {
                overrides.insert("region".to_string(), json!(region));
            }
            if let Some(seconds) = poll_interval {
                overrides.insert("poll_interval_seconds".to_string(), json!(seconds));
            }
            if let Some(seconds) = max_wait {
                overrides.insert("max_wait_seconds".to_string(), json!(seconds));
            }
            let upload = UploadConfig {
                project_name: name,
                device_pool_name: device_pool,
                binary_path,
                test_binary_path,
                wait_for_completion,
            };
            run_device_farm(
                cli.config.as_deref(),
                json!({"device_farm": Value::Object(overrides)}),
                &upload,
                cli.json,
            )
        }
        Commands::Crittercism {
            dsym,
            oauth_token,
            app_id,
            verbose_upload,
        } => run_crittercism(
            cli.config.as_deref(),
            dsym,
            oauth_token,
            app_id,
            verbose_upload,
            cli.json,
        ),
        Commands::UpdateTranslations {
            project_root,
            commit_message,
        } => run_update_translations(cli.config.as_deref(), project_root, commit_message, cli.json),
        Commands::Config => run_config(cli.config.as_deref()),
    };

    process::exit(code);
}

fn load_config(config_path: Option<&Path>, overrides: Option<Value>) -> Result<EffectiveConfig, ConfigError> {
    let user = default_user_config_path();
    let repo = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(REPO_CONFIG_FILE));

    if config_path.is_some() && !repo.exists() {
        return Err(ConfigError::IoError(format!(
            "{}: config file not found",
            repo.display()
        )));
    }

    EffectiveConfig::build(user.as_deref(), Some(&repo), overrides)
}

/// Print the summary and return exit code 0.
fn emit(json: bool, human: String, to_json: impl FnOnce() -> Result<String, serde_json::Error>) -> i32 {
    if !json {
        println!("{}", human);
        return 0;
    }
    match to_json() {
        Ok(out) => {
            println!("{}", out);
            0
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            1
        }
    }
}

fn fail(message: impl std::fmt::Display, code: i32) -> i32 {
    eprintln!("Error: {}", message);
    code
}

fn fail_device_farm(error: &DeviceFarmError) -> i32 {
    let code = fail(error, error.exit_code());
    if let Some(hint) = error.hint() {
        eprintln!("Hint: {}", hint);
    }
    code
}

fn run_device_farm(config_path: Option<&Path>, overrides: Value, upload: &UploadConfig, json: bool) -> i32 {
    let config = match load_config(config_path, Some(overrides)) {
        Ok(c) => c,
        Err(e) => return fail(&e, e.exit_code()),
    };
    let settings = DeviceFarmSettings::from_config(&config);

    if let Err(e) = upload.validate() {
        return fail_device_farm(&e);
    }

    let clients = HttpDeviceFarm::from_env(&settings)
        .and_then(|api| Ok((api, HttpArtifactTransfer::new(&settings)?)));
    let (api, transfer) = match clients {
        Ok(c) => c,
        Err(e) => return fail_device_farm(&DeviceFarmError::from(e)),
    };

    let uploader = DeviceFarmUploader::with_policy(
        Arc::new(api),
        Arc::new(transfer),
        PollPolicy::from_settings(&settings),
    );

    match uploader.run(upload) {
        Ok(outcome) => emit(json, outcome.to_human(), || outcome.to_json()),
        Err(e) => fail_device_farm(&e),
    }
}

fn run_crittercism(
    config_path: Option<&Path>,
    dsym: Option<PathBuf>,
    oauth_token: Option<String>,
    app_id: Option<String>,
    verbose_upload: bool,
    json: bool,
) -> i32 {
    let config = match load_config(config_path, None) {
        Ok(c) => c,
        Err(e) => return fail(&e, e.exit_code()),
    };
    let settings = CrittercismSettings::from_config(&config);

    let Some(oauth_token) = oauth_token.or_else(|| settings.oauth_token.clone()) else {
        return fail("missing --oauth-token (or FL_CRITTERCISM_OAUTH_TOKEN)", 1);
    };
    let Some(app_id) = app_id.or_else(|| settings.app_id.clone()) else {
        return fail("missing --app-id (or FL_CRITTERCISM_APP_ID)", 1);
    };

    let dsym_path = match resolve_dsym_path(dsym.as_deref(), |name| std::env::var(name).ok()) {
        Ok(p) => p,
        Err(e) => return fail(&e, e.exit_code()),
    };

    let api = match HttpSymbolApi::new(&settings, &oauth_token, verbose_upload) {
        Ok(api) => api,
        Err(e) => return fail(&e, e.exit_code()),
    };
    let uploader = SymbolUploader::new(Arc::new(api), Arc::new(SystemCommandRunner));

    match uploader.run(&SymbolUploadConfig { dsym_path, app_id }) {
        Ok(outcome) => emit(json, outcome.to_human(), || outcome.to_json()),
        Err(e) => fail(&e, e.exit_code()),
    }
}

fn run_update_translations(
    config_path: Option<&Path>,
    project_root: Option<PathBuf>,
    commit_message: String,
    json: bool,
) -> i32 {
    let config = match load_config(config_path, None) {
        Ok(c) => c,
        Err(e) => return fail(&e, e.exit_code()),
    };
    let settings = TranslationsSettings::from_config(&config);

    let project_root = match project_root {
        Some(root) => root,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => return fail(format!("cannot determine current directory: {}", e), 1),
        },
    };
    let translations = TranslationsConfig {
        project_root,
        commit_message,
    };

    let updater = TranslationsUpdater::new(Arc::new(SystemCommandRunner), settings.tool);
    match updater.run(&translations) {
        Ok(outcome) => {
            let summary = TranslationsSummary::new(&translations, outcome);
            emit(json, summary.to_human(), || summary.to_json())
        }
        Err(e) => fail(&e, e.exit_code()),
    }
}

fn run_config(config_path: Option<&Path>) -> i32 {
    match load_config(config_path, None) {
        Ok(config) => emit(true, String::new(), || config.to_json()),
        Err(e) => fail(&e, e.exit_code()),
    }
}
