//! jb-account - Session and profile management for the job board

use std::io::{self, BufRead};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use libjobboard::logging::LoggingConfig;
use libjobboard::types::{form_from_pairs, Credentials};
use libjobboard::{ActionError, Config, JobBoard, JobBoardError};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "jb-account")]
#[command(about = "Log in, register and manage your job board profile", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account
    Register {
        /// Registration field as key=value (repeatable)
        #[arg(short = 'F', long = "field", required = true)]
        fields: Vec<String>,
    },

    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// Update your profile
    Edit {
        /// Profile to edit (e.g. programador, empleador); the base user if omitted
        #[arg(long)]
        profile: Option<String>,

        /// Profile field as key=value (repeatable)
        #[arg(short = 'F', long = "field", required = true)]
        fields: Vec<String>,
    },

    /// Add a project to your programmer profile
    AddProject {
        /// Project field as key=value (repeatable)
        #[arg(short = 'F', long = "field", required = true)]
        fields: Vec<String>,
    },

    /// Set a new password using the token from a reset email
    ResetPassword {
        /// Reset token
        #[arg(long, env = "JOBBOARD_RESET_TOKEN")]
        token: String,

        /// Read both passwords from stdin, one per line
        #[arg(long)]
        stdin: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env().verbose(cli.verbose).init();

    let format = cli.format;
    if let Err(e) = run(cli).await {
        report_error(&e, format);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    tracing::debug!("Job board backend: {}", config.api.base_url);
    let board = JobBoard::from_config(&config)?;
    let format = cli.format;

    match cli.command {
        Commands::Register { fields } => {
            let form = form_from_pairs(&fields)?;
            let response = board.register(form).await?;
            print(format, &response, || {
                response
                    .msg
                    .clone()
                    .unwrap_or_else(|| "Account created".to_string())
            })?;
            board.reset_status();
        }
        Commands::Login { email, stdin } => {
            let password = read_secret("Password: ", stdin)?;
            let credentials = Credentials { email, password };
            let response = board.login(&credentials).await?;
            let applications = board.snapshot().user_applications.len();
            print(
                format,
                &json!({ "user": response.user, "applications": applications }),
                || {
                    format!(
                        "Logged in as user {} ({} applications)",
                        response.user.id, applications
                    )
                },
            )?;
        }
        Commands::Logout => {
            board.log_out()?;
            print(format, &json!({ "logged_out": true }), || {
                "Logged out".to_string()
            })?;
        }
        Commands::Whoami => {
            board.hydrate()?;
            let state = board.snapshot();
            if !state.is_authenticated() {
                return Err(ActionError::Unauthenticated.into());
            }
            let user_id = state.user.as_ref().map(|user| user.id);
            print(format, &json!({ "user": state.user }), || match user_id {
                Some(id) => format!("Logged in as user {}", id),
                None => "Logged in (user unknown, log in again to refresh)".to_string(),
            })?;
        }
        Commands::Edit { profile, fields } => {
            let form = form_from_pairs(&fields)?;
            let suffix = profile_suffix(profile.as_deref());
            let response = board.edit_user(form, &suffix).await?;
            print(format, &response, || {
                response
                    .msg
                    .clone()
                    .unwrap_or_else(|| "Profile updated".to_string())
            })?;
            board.reset_status();
        }
        Commands::AddProject { fields } => {
            let form = form_from_pairs(&fields)?;
            let response = board.add_projects(form).await?;
            print(format, &response, || {
                response
                    .msg
                    .clone()
                    .unwrap_or_else(|| "Project added".to_string())
            })?;
        }
        Commands::ResetPassword { token, stdin } => {
            let password = read_secret("New password: ", stdin)?;
            let confirmation = read_secret("Repeat password: ", stdin)?;
            board
                .reset_password(&token, &password, &confirmation)
                .await?;
            print(format, &json!({ "reset": true }), || {
                "Password changed".to_string()
            })?;
        }
    }

    Ok(())
}

/// `/programador` for `Some("programador")`, empty for the base user
fn profile_suffix(profile: Option<&str>) -> String {
    match profile.map(|p| p.trim().trim_matches('/')) {
        Some(p) if !p.is_empty() => format!("/{}", p),
        _ => String::new(),
    }
}

/// Prompt on a terminal, or read one line from stdin
fn read_secret(prompt: &str, from_stdin: bool) -> anyhow::Result<String> {
    if from_stdin || !atty::is(atty::Stream::Stdin) {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    rpassword::prompt_password(prompt).context("Failed to read password")
}

fn print<T: serde::Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}

fn report_error(err: &anyhow::Error, format: OutputFormat) {
    match (format, err.downcast_ref::<ActionError>()) {
        (OutputFormat::Json, Some(action)) => {
            if let Ok(json) = serde_json::to_string(&action.feedback()) {
                println!("{}", json);
            }
        }
        (_, Some(action)) => eprintln!("Error: {}", action),
        _ => eprintln!("Error: {:#}", err),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<ActionError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<JobBoardError>() {
        return e.exit_code();
    }
    1
}
