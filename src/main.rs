//! MedTrack command-line client entry point.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use medtrack_client::api::{chat, medications, prescriptions, upload};
use medtrack_client::config::{Config, VERBOSE_LOG_FILTER};
use medtrack_client::dashboard::load_dashboard;
use medtrack_client::metrics;
use medtrack_client::session::{Credentials, Identity, Registration};
use medtrack_client::{api, MedTrack};

const RULE: &str = "======================================================================";

/// MedTrack health-management client.
#[derive(Parser, Debug)]
#[command(name = "medtrack")]
#[command(about = "Command-line client for the MedTrack health-management API")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check configuration validity.
    CheckConfig,

    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEDTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in with a username or email.
    Login {
        /// Username or email address.
        user: String,
        #[arg(long, env = "MEDTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored identity.
    Logout,

    /// Show the signed-in identity as stored and as the backend sees it.
    Whoami,

    /// Chat with the medical assistant.
    #[command(subcommand)]
    Chat(ChatCommand),

    /// Manage prescriptions.
    #[command(subcommand)]
    Prescriptions(PrescriptionCommand),

    /// Medication adherence and reminders.
    #[command(subcommand)]
    Medications(MedicationCommand),

    /// Upload an arbitrary file.
    Upload {
        file: PathBuf,
        /// Process the file as a prescription for the signed-in user.
        #[arg(long)]
        prescription: bool,
    },

    /// Load every dashboard widget at once.
    Dashboard {
        /// Patient name; defaults to the signed-in username.
        #[arg(long)]
        patient: Option<String>,
        #[arg(long, default_value = "7")]
        days: u32,
    },
}

#[derive(Subcommand, Debug)]
enum ChatCommand {
    /// Start a new session.
    Start,
    /// Send a message to a session.
    Send { session_id: String, message: String },
    /// Print a session's history.
    History { session_id: String },
    /// List your sessions.
    Sessions,
}

#[derive(Subcommand, Debug)]
enum PrescriptionCommand {
    /// List prescriptions.
    List {
        #[arg(long)]
        patient: Option<String>,
    },
    /// List medicines still within their course.
    Active {
        #[arg(long)]
        patient: Option<String>,
    },
    /// Upload a prescription image or PDF.
    Upload { file: PathBuf },
    /// Delete a prescription.
    Delete { prescription_id: String },
}

#[derive(Subcommand, Debug)]
enum MedicationCommand {
    /// Adherence over the last N days.
    Adherence {
        #[arg(long)]
        patient: Option<String>,
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Recent reminder confirmations.
    Confirmations {
        #[arg(long)]
        patient: Option<String>,
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Today's dose status.
    Status {
        #[arg(long)]
        patient: Option<String>,
    },
    /// Reply to the latest reminder as the patient would.
    Respond { contact_number: String, message: String },
    /// Seed demonstration logs.
    TestLogs {
        #[arg(long)]
        patient: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration; logging reads RUST_LOG and VERBOSE from it
    let loaded = Config::load();

    // Initialize logging
    let filter = match &loaded {
        Ok(config) => EnvFilter::new(config.log_filter(args.verbose)),
        Err(_) if args.verbose => EnvFilter::new(VERBOSE_LOG_FILTER),
        Err(_) => EnvFilter::new("info"),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    // Initialize metrics
    metrics::init_metrics();

    if let Command::CheckConfig = args.command {
        return cmd_check_config();
    }

    let config = validated(loaded)?;
    let app = MedTrack::from_config(&config).context("Failed to initialize client")?;

    match args.command {
        Command::CheckConfig => Ok(()),
        Command::Signup {
            username,
            email,
            password,
        } => cmd_signup(&app, username, email, password).await,
        Command::Login { user, password } => cmd_login(&app, user, password).await,
        Command::Logout => cmd_logout(&app),
        Command::Whoami => cmd_whoami(&app).await,
        Command::Chat(command) => cmd_chat(&app, command).await,
        Command::Prescriptions(command) => cmd_prescriptions(&app, command).await,
        Command::Medications(command) => cmd_medications(&app, command).await,
        Command::Upload { file, prescription } => cmd_upload(&app, &file, prescription).await,
        Command::Dashboard { patient, days } => cmd_dashboard(&app, patient, days).await,
    }
}

fn validated(loaded: Result<Config, envy::Error>) -> anyhow::Result<Config> {
    let config = loaded.context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    debug!(api_url = %config.medtrack_api_url, "configuration loaded");
    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("{RULE}");
    println!("MEDTRACK - CONFIGURATION CHECK");
    println!("{RULE}");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("\nConfiguration:");
    println!("  API URL: {}", config.medtrack_api_url);
    println!(
        "  Bypass header: {}: {}",
        config.medtrack_bypass_header, config.medtrack_bypass_value
    );
    println!("  Identity header: {}", config.medtrack_identity_header);
    println!(
        "  Identity record: {}",
        config
            .session_dir()
            .join(format!("{}.json", config.medtrack_storage_key))
            .display()
    );

    println!("\n{RULE}");
    println!("CONFIGURATION CHECK PASSED");
    println!("{RULE}");

    Ok(())
}

async fn cmd_signup(
    app: &MedTrack,
    username: String,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    let identity = app
        .session()
        .signup(&Registration {
            username,
            email,
            password,
        })
        .await?;
    println!("Signed up as {} ({})", identity.username, identity.user_id);
    Ok(())
}

async fn cmd_login(app: &MedTrack, user: String, password: String) -> anyhow::Result<()> {
    let identity = app
        .session()
        .login(&Credentials {
            username_or_email: user,
            password,
        })
        .await?;
    println!("Signed in as {} ({})", identity.username, identity.user_id);
    Ok(())
}

fn cmd_logout(app: &MedTrack) -> anyhow::Result<()> {
    app.session().logout();
    println!("Signed out");
    Ok(())
}

async fn cmd_whoami(app: &MedTrack) -> anyhow::Result<()> {
    let stored = signed_in(app)?;
    println!("Stored identity: {} ({})", stored.username, stored.user_id);

    let remote = api::auth::current_user(app.gateway()).await?;
    println!("Backend identity: {} ({})", remote.username, remote.user_id);
    if let Some(email) = remote.email {
        println!("  Email: {}", email);
    }
    Ok(())
}

async fn cmd_chat(app: &MedTrack, command: ChatCommand) -> anyhow::Result<()> {
    let identity = signed_in(app)?;
    let gateway = app.gateway();

    match command {
        ChatCommand::Start => {
            let started = chat::start_session(gateway, &identity).await?;
            println!("Session: {}", started.session_id);
            if !started.message.is_empty() {
                println!("{}", started.message);
            }
        }
        ChatCommand::Send { session_id, message } => {
            let reply = chat::send_message(gateway, &identity, &session_id, &message).await?;
            println!("{}", reply.answer);
        }
        ChatCommand::History { session_id } => {
            let history = chat::history(gateway, &identity, &session_id).await?;
            for turn in &history.chat_history {
                println!("[{}] {}", turn.speaker, turn.content);
            }
        }
        ChatCommand::Sessions => {
            let sessions = chat::list_sessions(gateway, &identity).await?;
            println!("{} session(s)", sessions.len());
            for session in sessions {
                println!(
                    "  {}  {}  {}",
                    session.session_id,
                    session.created_at.as_deref().unwrap_or("-"),
                    session.session_name.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

async fn cmd_prescriptions(app: &MedTrack, command: PrescriptionCommand) -> anyhow::Result<()> {
    let gateway = app.gateway();

    match command {
        PrescriptionCommand::List { patient } => {
            let patient = patient_or_self(app, patient)?;
            print_json(&prescriptions::list(gateway, &patient).await?)
        }
        PrescriptionCommand::Active { patient } => {
            let patient = patient_or_self(app, patient)?;
            print_json(&prescriptions::active_medications(gateway, &patient).await?)
        }
        PrescriptionCommand::Upload { file } => {
            signed_in(app)?;
            let (name, bytes) = read_upload(&file).await?;
            print_json(&prescriptions::upload(gateway, &name, bytes).await?)
        }
        PrescriptionCommand::Delete { prescription_id } => {
            signed_in(app)?;
            let ack = prescriptions::delete(gateway, &prescription_id).await?;
            println!("{}", ack.message);
            Ok(())
        }
    }
}

async fn cmd_medications(app: &MedTrack, command: MedicationCommand) -> anyhow::Result<()> {
    let gateway = app.gateway();

    match command {
        MedicationCommand::Adherence { patient, days } => {
            let patient = patient_or_self(app, patient)?;
            let report = medications::adherence(gateway, &patient, days).await?;
            println!(
                "Adherence for {} over {} day(s): {:.1}%",
                patient, days, report.adherence_rate
            );
            println!(
                "  Taken: {}  Missed: {}  Pending: {}",
                report.taken, report.missed, report.pending
            );
            Ok(())
        }
        MedicationCommand::Confirmations { patient, limit } => {
            let patient = patient_or_self(app, patient)?;
            print_json(&medications::confirmations(gateway, &patient, limit).await?)
        }
        MedicationCommand::Status { patient } => {
            let patient = patient_or_self(app, patient)?;
            let status = medications::daily_status(gateway, &patient).await?;
            let summary = status.today_summary;
            println!(
                "{}: {} dose(s), {} taken, {} missed, {} pending",
                status.date, summary.total, summary.taken, summary.missed, summary.pending
            );
            for log in &status.today_logs {
                println!(
                    "  {}  {:<8} {}",
                    log.scheduled_time,
                    log.status,
                    log.medication_name.as_deref().unwrap_or(&log.medication_id)
                );
            }
            Ok(())
        }
        MedicationCommand::Respond {
            contact_number,
            message,
        } => {
            let outcome = medications::respond(gateway, &contact_number, &message).await?;
            println!("{}: {}", outcome.status, outcome.message);
            Ok(())
        }
        MedicationCommand::TestLogs { patient } => {
            let patient = patient_or_self(app, patient)?;
            let ack = medications::create_test_logs(gateway, &patient).await?;
            println!("{}", ack.message);
            Ok(())
        }
    }
}

async fn cmd_upload(app: &MedTrack, file: &Path, prescription: bool) -> anyhow::Result<()> {
    let (name, bytes) = read_upload(file).await?;
    let response = if prescription {
        let identity = signed_in(app)?;
        upload::upload_prescription(app.gateway(), &identity, &name, bytes).await?
    } else {
        upload::upload_file(app.gateway(), &name, bytes).await?
    };
    print_json(&response)
}

async fn cmd_dashboard(app: &MedTrack, patient: Option<String>, days: u32) -> anyhow::Result<()> {
    let patient = patient_or_self(app, patient)?;
    let snapshot = load_dashboard(app.gateway(), &patient, days).await;

    println!("{RULE}");
    println!("MEDTRACK DASHBOARD - {}", patient);
    println!("{RULE}");
    println!(
        "\nAdherence ({} day(s)): {:.1}%",
        days, snapshot.adherence.adherence_rate
    );
    let today = snapshot.daily_status.today_summary;
    println!(
        "Today: {} taken, {} missed, {} pending of {}",
        today.taken, today.missed, today.pending, today.total
    );
    println!("Recent confirmations: {}", snapshot.confirmations.len());
    println!("Prescriptions: {}", snapshot.prescriptions.len());

    if !snapshot.is_complete() {
        println!("\nUnavailable: {}", snapshot.degraded.join(", "));
    }
    println!("{RULE}");
    Ok(())
}

fn signed_in(app: &MedTrack) -> anyhow::Result<Identity> {
    app.session()
        .current()
        .ok_or_else(|| anyhow::anyhow!("Not signed in; run `medtrack login` first"))
}

fn patient_or_self(app: &MedTrack, patient: Option<String>) -> anyhow::Result<String> {
    match patient {
        Some(patient) => Ok(patient),
        None => Ok(signed_in(app)?.username),
    }
}

async fn read_upload(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("Not a file: {}", path.display()))?;
    Ok((name, bytes))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
