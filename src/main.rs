use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docaccess::{
    Accessor, Claims, Config, Loader, Permission, Principal, ResourceStatus, StaticDirectory,
    Store,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "docaccess",
    about = "Resolve document permissions for a principal"
)]
struct Cli {
    /// Config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database URL (overrides config and DATABASE_URL).
    #[arg(long)]
    database: Option<String>,

    /// Log filter (overrides config and DOCACCESS_LOG).
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the document and grant tables if missing.
    Init,

    /// List the documents a principal can see, one JSON object per line.
    List {
        /// JSON file with the principal's verified claims.
        #[arg(long)]
        claims: PathBuf,

        /// Organization the principal administers (repeatable).
        #[arg(long = "admin-org")]
        admin_orgs: Vec<i64>,

        /// Only documents in this status (exists or archived).
        #[arg(long)]
        status: Option<ResourceStatus>,

        #[arg(long)]
        limit: Option<u64>,

        #[arg(long)]
        offset: Option<u64>,
    },

    /// Resolve the principal's permission on one document.
    Check {
        /// JSON file with the principal's verified claims.
        #[arg(long)]
        claims: PathBuf,

        /// Document id.
        #[arg(long)]
        document: i64,

        /// Organization the principal administers (repeatable).
        #[arg(long = "admin-org")]
        admin_orgs: Vec<i64>,

        /// Status to resolve under (exists or archived).
        #[arg(long, default_value = "exists")]
        status: ResourceStatus,

        /// Answer yes/no for this level instead of printing the level.
        #[arg(long)]
        require: Option<Permission>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Loader::default().load(
        cli.config.as_deref(),
        cli.database.as_deref(),
        cli.log.as_deref(),
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.public_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &Config) -> docaccess::Result<()> {
    let db = docaccess::db::connect(&config.database.url).await?;
    let store = Store::new(docaccess::db::connection(&db)?);

    match command {
        Command::Init => {
            docaccess::db::apply_schema(store.connection()).await?;
            info!(url = %config.database.url, "schema ready");
        }
        Command::List {
            claims,
            admin_orgs,
            status,
            limit,
            offset,
        } => {
            let principal = principal(&claims, admin_orgs).await?;
            let mut query = principal.accessor().query();
            if let Some(status) = status {
                query = query.with_status(status);
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            if let Some(offset) = offset {
                query = query.offset(offset);
            }

            let mut rows = query.fetch(&store).await?;
            while let Some(resource) = rows.next().await? {
                println!("{}", serde_json::to_string(&resource)?);
            }
        }
        Command::Check {
            claims,
            document,
            admin_orgs,
            status,
            require,
        } => {
            let principal = principal(&claims, admin_orgs).await?;
            let accessor = principal.accessor();
            match require {
                Some(level) => {
                    let allowed = accessor
                        .has_permission(&store, document, level, status)
                        .await?;
                    println!("{allowed}");
                }
                None => {
                    let level = accessor.permission_of(&store, document, status).await?;
                    println!("{level}");
                }
            }
        }
    }

    Ok(())
}

async fn principal(claims_path: &Path, admin_orgs: Vec<i64>) -> docaccess::Result<Principal> {
    let content = std::fs::read_to_string(claims_path)?;
    let claims: Claims = serde_json::from_str(&content)?;
    let directory = StaticDirectory::new().with(claims.sub, admin_orgs);
    docaccess::create_principal(&claims, &directory).await
}
