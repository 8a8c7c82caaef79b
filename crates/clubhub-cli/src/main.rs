mod output;

use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubhub_client::{
    services::MemberApi, ClientConfig, FileStore, IdentityPatch, RequestDescriptor, Role,
    RouteGuard, SessionContext,
};

#[derive(Parser)]
#[command(name = "clubhub")]
#[command(version, about = "ClubHub Command Line Client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides CLUBHUB_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file (overrides CLUBHUB_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Role you intend to act as (member, coach, admin, superadmin)
        #[arg(short, long, value_parser = parse_role)]
        role: Option<Role>,
    },
    /// Forget the stored session
    Logout,
    /// Show the current identity
    Whoami {
        /// Emit only the JSON identity
        #[arg(short, long)]
        json: bool,
    },
    /// Switch the active role to one you hold
    SwitchRole {
        #[arg(value_parser = parse_role)]
        role: Role,
    },
    /// Update stored profile fields
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        avatar: Option<String>,
    },
    /// Exchange a refresh token for a new credential
    Refresh {
        #[arg(long)]
        refresh_token: String,
    },
    /// List club branches
    Branches,
    /// Register an account
    /// Examples:
    ///     clubhub register --payload '{"email":"a@b.com","password":"pw","name":"Alex"}'
    #[command(verbatim_doc_comment)]
    Register {
        /// Registration payload as JSON
        #[arg(long, value_name = "JSON")]
        payload: String,
    },
    /// Authenticated GET against any endpoint
    /// Examples:
    ///     clubhub get /member/schedule --query week=2026-W42
    #[command(verbatim_doc_comment)]
    Get {
        endpoint: String,

        /// Query parameters (format: key=value), can be repeated
        #[arg(long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },
    /// Member dashboard calls
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },
    /// Check whether the current session may open a surface
    /// Examples:
    ///     clubhub guard --require admin --require superadmin
    #[command(verbatim_doc_comment)]
    Guard {
        /// Roles the surface requires; none means any logged-in user
        #[arg(long = "require", value_parser = parse_role)]
        require: Vec<Role>,
    },
}

#[derive(Subcommand)]
enum MemberCommand {
    Dashboard,
    Schedule {
        #[arg(long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },
    Progress,
    Clubs,
    /// Request to join a club
    Join {
        club_id: String,
    },
    Payments,
    Messages,
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse::<Role>().map_err(|_| {
        let known: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
        format!("unknown role '{}', expected one of {}", value, known.join(", "))
    })
}

fn parse_query(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("Invalid query parameter '{}', expected key=value", pair))?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,clubhub_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url).context("Invalid --api-url")?;
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = Some(session_file);
    }

    let session_path = config.session_path()?;
    tracing::debug!(
        api_url = %config.api_url,
        session_file = %session_path.display(),
        "Configuration loaded"
    );

    let session = SessionContext::from_config(&config, FileStore::new(session_path))?;

    match cli.command {
        Commands::Login {
            email,
            password,
            role,
        } => {
            let identity = session.login(&email, &password, role).await?;
            println!("Logged in as {} ({})", identity.name, identity.role);
        }
        Commands::Logout => {
            session.logout();
            println!("Logged out");
        }
        Commands::Whoami { json } => match session.identity() {
            Some(identity) if json => output::print_json(&identity)?,
            Some(identity) => output::print_identity(&identity),
            None => println!("Not logged in"),
        },
        Commands::SwitchRole { role } => {
            if !session.is_authenticated() {
                anyhow::bail!("Not logged in");
            }
            if session.switch_active_role(role)? {
                println!("Active role is now {}", role);
            } else {
                println!("You do not hold the {} role; nothing changed", role);
            }
        }
        Commands::UpdateProfile {
            name,
            phone,
            avatar,
        } => {
            let patch = IdentityPatch {
                name,
                phone,
                avatar,
                ..IdentityPatch::default()
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update; pass --name, --phone or --avatar");
            }
            match session.update_identity(patch)? {
                Some(identity) => output::print_identity(&identity),
                None => anyhow::bail!("Not logged in"),
            }
        }
        Commands::Refresh { refresh_token } => {
            session.refresh_credential(&refresh_token).await?;
            println!("Credential refreshed");
        }
        Commands::Branches => {
            let branches = session.auth().branches().await?;
            output::print_json(&branches)?;
        }
        Commands::Register { payload } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("Registration payload is not valid JSON")?;
            let response = session.auth().register(payload).await?;
            output::print_json(&response)?;
        }
        Commands::Get { endpoint, query } => {
            let descriptor = parse_query(&query)?
                .into_iter()
                .fold(RequestDescriptor::get(endpoint), |d, (k, v)| d.query(k, v));
            let response = session.api().request(descriptor).await?;
            output::print_json(&response)?;
        }
        Commands::Member { command } => {
            let member = MemberApi::new(session.api().clone());
            let response = match command {
                MemberCommand::Dashboard => member.dashboard().await?,
                MemberCommand::Schedule { query } => member.schedule(&parse_query(&query)?).await?,
                MemberCommand::Progress => member.progress().await?,
                MemberCommand::Clubs => member.clubs().await?,
                MemberCommand::Join { club_id } => member.join_club(&club_id).await?,
                MemberCommand::Payments => member.payments().await?,
                MemberCommand::Messages => member.messages().await?,
            };
            output::print_json(&response)?;
        }
        Commands::Guard { require } => {
            let decision = RouteGuard::new(require).evaluate(session.identity().as_ref());
            match decision.redirect_path() {
                None => println!("allowed"),
                Some(path) => println!("redirect {}", path),
            }
        }
    }

    Ok(())
}
