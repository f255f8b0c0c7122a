use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input};
use dotenvy::dotenv;
use sqlx::PgPool;

use warden_auth::JwtCodec;
use warden_cli::{federation, seeder};
use warden_config::{DatabaseConfig, JwtConfig};
use warden_db::{api_keys, init_db_pool, rbac, run_migrations, users};
use warden_models::{CreateUserDto, FederatedUser};

#[derive(Parser)]
#[command(name = "warden-cli")]
#[command(about = "Warden CLI - Administrative tools for Warden", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create or refresh the system roles and the permission catalogue
    SeedRbac,
    /// Seed admin@test.com, user@test.com and fake users, each with an API key
    SeedUsers {
        /// Number of fake users to create
        #[arg(short = 'c', long, default_value = "10")]
        count: usize,
    },
    /// Create a user
    CreateUser {
        #[arg(short = 'e', long)]
        email: Option<String>,

        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Role to assign, e.g. admin or user
        #[arg(short = 'r', long)]
        role: Option<String>,
    },
    /// Generate an API key for an existing user
    CreateApiKey {
        #[arg(short = 'e', long)]
        email: String,

        /// Label stored with the key
        #[arg(short = 'n', long)]
        name: Option<String>,
    },
    /// Store a federated profile and print a bearer token for it
    ImportProfile {
        /// Identity provider, e.g. google
        #[arg(short = 'p', long)]
        provider: String,

        /// User id at the provider
        #[arg(short = 'i', long)]
        external_user_id: String,

        #[arg(short = 'e', long)]
        email: String,

        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// Delete every user together with profiles, keys and grants
    ClearUsers {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let database = DatabaseConfig::from_env();
    let pool = init_db_pool(&database)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::SeedRbac => handle_seed_rbac(&pool).await,
        Commands::SeedUsers { count } => handle_seed_users(&pool, count).await,
        Commands::CreateUser {
            email,
            first_name,
            last_name,
            role,
        } => handle_create_user(&pool, email, first_name, last_name, role).await,
        Commands::CreateApiKey { email, name } => handle_create_api_key(&pool, &email, name).await,
        Commands::ImportProfile {
            provider,
            external_user_id,
            email,
            first_name,
            last_name,
            avatar_url,
        } => {
            let federated = FederatedUser {
                provider,
                external_user_id,
                email,
                first_name,
                last_name,
                avatar_url,
                description: None,
            };
            handle_import_profile(&pool, federated).await
        }
        Commands::ClearUsers { yes } => handle_clear_users(&pool, yes).await,
    }
}

async fn handle_migrate(pool: &PgPool) -> anyhow::Result<()> {
    run_migrations(pool)
        .await
        .context("Failed to run migrations")?;
    println!("✅ Migrations applied");
    Ok(())
}

async fn handle_seed_rbac(pool: &PgPool) -> anyhow::Result<()> {
    let summary = rbac::seed_rbac(pool)
        .await
        .context("Failed to seed roles and permissions")?;
    println!(
        "✅ Seeded {} roles and {} permissions",
        summary.roles, summary.permissions
    );
    Ok(())
}

async fn handle_seed_users(pool: &PgPool, count: usize) -> anyhow::Result<()> {
    let report = seeder::seed_users(pool, count)
        .await
        .context("Failed to seed users")?;

    for user in &report.created {
        println!("   {} ({}) api key: {}", user.email, user.role, user.api_key);
    }
    for email in &report.skipped {
        println!("   {} already exists, skipped", email);
    }
    println!("✅ Created {} users", report.created.len());
    Ok(())
}

async fn handle_create_user(
    pool: &PgPool,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<String>,
) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };
    let first_name = match first_name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("First name")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read first name")?,
    };
    let last_name = match last_name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Last name")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read last name")?,
    };
    let role = match role {
        Some(role) => role,
        None => Input::new()
            .with_prompt("Role")
            .default("user".to_string())
            .interact_text()
            .context("Failed to read role")?,
    };

    let dto = CreateUserDto {
        email,
        first_name: Some(first_name).filter(|s| !s.trim().is_empty()),
        last_name: Some(last_name).filter(|s| !s.trim().is_empty()),
        role: Some(role).filter(|s| !s.trim().is_empty()),
    };

    let user = users::create_user(pool, &dto)
        .await
        .context("Failed to create user")?;

    println!("\n✅ User created successfully!");
    println!("   Id: {}", user.id);
    println!("   Email: {}", user.email);
    Ok(())
}

async fn handle_create_api_key(
    pool: &PgPool,
    email: &str,
    name: Option<String>,
) -> anyhow::Result<()> {
    let Some(user) = users::find_user_by_email(pool, email).await? else {
        bail!("No user with email {}", email);
    };

    let key = api_keys::create_api_key(pool, user.id, name.as_deref())
        .await
        .context("Failed to create API key")?;

    println!("✅ API key created for {}", user.email);
    println!("   {}", key.api_key);
    Ok(())
}

async fn handle_import_profile(pool: &PgPool, federated: FederatedUser) -> anyhow::Result<()> {
    let jwt = JwtConfig::from_env();
    let codec = JwtCodec::new(&jwt).context("Invalid JWT configuration")?;

    let login = federation::import_profile(pool, &codec, federated, jwt.access_token_expiry)
        .await
        .context("Failed to import profile")?;

    let verb = if login.imported.created {
        "Created"
    } else {
        "Updated"
    };
    println!(
        "✅ {} user {} ({})",
        verb, login.imported.user.email, login.imported.user.id
    );
    println!("   Provider: {}", login.imported.profile.provider);
    println!("   Expires: {}", login.token.expires_at);
    println!("   Authorization: {} {}", login.token.token_type, login.token.token);
    Ok(())
}

async fn handle_clear_users(pool: &PgPool, yes: bool) -> anyhow::Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt("Delete ALL users, profiles and API keys?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

    if !confirmed {
        println!("Aborted");
        return Ok(());
    }

    let deleted = users::clear_users(pool)
        .await
        .context("Failed to clear users")?;
    println!("✅ Deleted {} users", deleted);
    Ok(())
}
