use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use student_registry::auth::TokenValidator;
use student_registry::types::Subject;
use student_registry::{AppConfig, JwtProvider, PasswordEncoder, create_app, load_config};

#[derive(Parser)]
#[command(name = "student-registry")]
#[command(about = "Student record service with bearer-token authentication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address, e.g. 0.0.0.0:8080
        #[arg(long, env = "STUDENT_REGISTRY_BIND")]
        bind: Option<String>,
        #[arg(long, env = "SURREALDB_URL")]
        db_url: Option<String>,
        /// HMAC secret used to sign and verify bearer tokens
        #[arg(long, env = "STUDENT_REGISTRY_JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,
        /// Reject requests when the authentication gate itself fails
        #[arg(long, default_value_t = false)]
        fail_closed: bool,
    },
    /// Initialize the database schema
    Init {
        #[arg(long, env = "SURREALDB_URL")]
        db_url: Option<String>,
    },
    /// Print the bcrypt hash of a password
    HashPassword {
        password: String,
        #[arg(long)]
        cost: Option<u32>,
    },
    /// Issue a bearer token for a subject (development helper)
    IssueToken {
        subject: String,
        #[arg(long, env = "STUDENT_REGISTRY_JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,
        #[arg(long)]
        ttl_seconds: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("student_registry=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    let mut config = load_config()?;

    match cli.command {
        Commands::Serve {
            bind,
            db_url,
            jwt_secret,
            fail_closed,
        } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(url) = db_url {
                config.database.url = url;
            }
            if let Some(secret) = jwt_secret {
                config.auth.jwt_secret = secret;
            }
            if fail_closed {
                config.auth.fail_open = false;
            }

            info!("Using database url: {}", config.database.url);
            info!(
                "Authentication gate failure policy: {:?}",
                config.auth.failure_policy()
            );

            let app = create_app(&config).await?;
            let listener = tokio::net::TcpListener::bind(&config.bind).await?;
            info!("Student registry listening on http://{}", config.bind);

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            if let Some(url) = db_url {
                config.database.url = url;
            }
            info!("Using database url for initialization: {}", config.database.url);

            info!("Initializing database...");
            let db = student_registry::create_connection(config.database).await?;
            student_registry::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::HashPassword { password, cost } => {
            let encoder = PasswordEncoder::new(cost.unwrap_or(config.auth.bcrypt_cost));
            println!("{}", encoder.encode(&password)?);
        }
        Commands::IssueToken {
            subject,
            jwt_secret,
            ttl_seconds,
        } => {
            if let Some(secret) = jwt_secret {
                config.auth.jwt_secret = secret;
            }
            if let Some(ttl) = ttl_seconds {
                config.auth.token_ttl_seconds = ttl;
            }
            issue_token(&config, subject)?;
        }
    }

    Ok(())
}

/// Sign a token with the configured secret and echo how to use it.
fn issue_token(config: &AppConfig, subject: String) -> Result<()> {
    config.validate()?;

    let provider = JwtProvider::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.clone(),
        config.auth.token_ttl_seconds,
    );
    let subject = Subject::new(subject);
    let issued = provider.issue(&subject)?;
    // Round-trip through the validator so a misconfigured issuer shows up here.
    provider.validate(&issued.access_token)?;

    println!("Token issued for subject '{}'", subject);
    println!("  Expires in: {}s", issued.expires_in);
    println!();
    println!("Use with: -H 'Authorization: Bearer {}'", issued.access_token);
    Ok(())
}
