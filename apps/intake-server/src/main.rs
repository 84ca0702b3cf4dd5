mod admin_edit;
mod config;
mod documents;
mod email;
mod error;
mod handlers;
mod invitations;
mod lifecycle;
mod metrics;
mod prefill;
mod reminders;
mod server;
mod token;
mod transitions;
mod validation;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use intake_reminders::ReminderScheduler;
use intake_storage::{InvitationFilter, InvitationId, InvitationStatus, Store};
use intake_store_sqlite::SqliteStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::documents::LocalDocumentStorage;
use crate::email::NotificationDispatcher;
use crate::invitations::ResendTarget;
use crate::reminders::EmailReminderSink;
use crate::server::IntakeServer;

#[derive(Parser)]
#[command(name = "intake-server")]
#[command(about = "Invitation-driven patent intake service")]
struct Cli {
    /// Database URL (sqlite://path/to/intake.db?mode=rwc)
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "sqlite://intake.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Server address
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
    /// Invitation management commands
    Invite {
        #[command(subcommand)]
        invite_cmd: InviteCommand,
    },
    /// Delete never-completed invitations that expired before the grace period
    PurgeExpired {
        /// Days past expiry to keep records around
        #[arg(long, default_value = "30")]
        grace_days: i64,
    },
}

#[derive(Subcommand)]
enum InviteCommand {
    /// Create an invitation and email the link
    Send {
        email: String,
        /// Recipient display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Rotate the token of an invitation and email the new link
    Resend {
        /// Invitation id
        id: String,
    },
    /// List invitations, newest first
    List {
        /// Only this status (pending, draft, completed)
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value = "50")]
        limit: u32,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Wire up the store and collaborators from configuration.
async fn build_server(
    database_url: &str,
    config: ServerConfig,
) -> Result<IntakeServer, Box<dyn std::error::Error>> {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(database_url).await?);
    let dispatcher = NotificationDispatcher::from_config(&config.email)?;
    let documents = Arc::new(LocalDocumentStorage::new(
        config.uploads.dir.clone(),
        config.uploads.base_url.clone(),
    ));
    let sink = Arc::new(EmailReminderSink::new(
        dispatcher.clone(),
        config.reminders.recipients.clone(),
    ));
    let reminders = Arc::new(ReminderScheduler::new(
        config.reminders.schedule.clone(),
        sink,
    ));

    Ok(IntakeServer::new(
        store, dispatcher, documents, config, reminders,
    ))
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        _ => {
            tracing::error!("Failed to install signal handlers, falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully..."),
    }
}

async fn cmd_serve(database_url: &str, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let addr: std::net::SocketAddr = addr.parse()?;
    let config = ServerConfig::from_env()?;
    if config.admin_token.is_none() {
        tracing::warn!("INTAKE_ADMIN_TOKEN is not set; admin routes will reject every request");
    }
    tokio::fs::create_dir_all(&config.uploads.dir).await?;

    let handle = metrics::init_metrics()?;
    let server = build_server(database_url, config).await?.with_metrics(handle);
    server.reminders.start();

    let app = handlers::router(server.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Intake server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    server.reminders.shutdown();
    Ok(())
}

async fn cmd_invite_send(
    database_url: &str,
    email: &str,
    name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let server = build_server(database_url, ServerConfig::from_env()?).await?;
    let record = invitations::send(&server, email, name).await?;

    println!("✓ Invitation sent to {}", record.email);
    println!("ID:      {}", record.id);
    println!("Link:    {}", server.config.invitation_link(&record.token));
    println!("Expires: {}", record.expires_at);
    if record.auto_prefill.enabled {
        println!("Company details prefilled from a previous invitation and locked.");
    }
    Ok(())
}

async fn cmd_invite_resend(database_url: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id: InvitationId = id.parse()?;
    let server = build_server(database_url, ServerConfig::from_env()?).await?;
    let record = invitations::resend(&server, ResendTarget::Id(id)).await?;

    println!("✓ Invitation resent to {}", record.email);
    println!("Link:    {}", server.config.invitation_link(&record.token));
    println!("Expires: {}", record.expires_at);
    Ok(())
}

async fn cmd_invite_list(
    database_url: &str,
    status: Option<String>,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = status
        .map(|s| s.parse::<InvitationStatus>())
        .transpose()?;
    let store = SqliteStore::open(database_url).await?;
    let invitations = store
        .list_invitations(&InvitationFilter {
            status,
            email: None,
            limit: Some(limit),
        })
        .await?;

    if invitations.is_empty() {
        println!("No invitations found.");
        return Ok(());
    }
    let now = Utc::now();
    for invitation in invitations {
        let expired = if invitation.is_expired(now) {
            " (expired)"
        } else {
            ""
        };
        println!("ID:      {}", invitation.id);
        println!("Email:   {}", invitation.email);
        println!("Status:  {}{}", invitation.status, expired);
        println!("Expires: {}", invitation.expires_at);
        println!();
    }
    Ok(())
}

async fn cmd_purge_expired(
    database_url: &str,
    grace_days: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open(database_url).await?;
    let cutoff = Utc::now() - Duration::days(grace_days.max(0));
    let purged = store.purge_expired(cutoff).await?;
    println!("✓ Purged {} expired invitation(s)", purged);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { addr } => cmd_serve(&cli.database_url, &addr).await?,
        Command::Invite { invite_cmd } => match invite_cmd {
            InviteCommand::Send { email, name } => {
                cmd_invite_send(&cli.database_url, &email, name.as_deref()).await?
            }
            InviteCommand::Resend { id } => cmd_invite_resend(&cli.database_url, &id).await?,
            InviteCommand::List { status, limit } => {
                cmd_invite_list(&cli.database_url, status, limit).await?
            }
        },
        Command::PurgeExpired { grace_days } => {
            cmd_purge_expired(&cli.database_url, grace_days).await?
        }
    }

    Ok(())
}
