//! Server configuration, read from the command line or `SYLMS_*` variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SYLMS_PORT` | required |
//! | `SYLMS_POSTGRES_DB` | required |
//! | `SYLMS_POSTGRES_USER` | required |
//! | `SYLMS_POSTGRES_PASSWORD` | required |
//! | `SYLMS_POSTGRES_HOST` | required |
//! | `SYLMS_POSTGRES_PORT` | required |
//! | `SYLMS_POSTGRES_MAX_CONNECTIONS` | 10 |
//! | `SYLMS_INIT_SCHEMA` | false |

use clap::{Args, Parser};

/// Connection settings for the course database
#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    #[arg(long = "postgres-db", env = "SYLMS_POSTGRES_DB")]
    pub dbname: String,

    #[arg(long = "postgres-user", env = "SYLMS_POSTGRES_USER")]
    pub user: String,

    #[arg(
        long = "postgres-password",
        env = "SYLMS_POSTGRES_PASSWORD",
        hide_env_values = true
    )]
    pub password: String,

    #[arg(long = "postgres-host", env = "SYLMS_POSTGRES_HOST")]
    pub host: String,

    #[arg(id = "postgres_port", long = "postgres-port", env = "SYLMS_POSTGRES_PORT")]
    pub port: u16,

    /// Upper bound on pooled connections.
    #[arg(
        long = "postgres-max-connections",
        env = "SYLMS_POSTGRES_MAX_CONNECTIONS",
        default_value = "10"
    )]
    pub max_connections: usize,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "azuki")]
#[command(about = "Course catalog search API")]
pub struct AppConfig {
    /// Port the HTTP server listens on.
    #[arg(long, env = "SYLMS_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Create the `courses` table at startup if it is missing.
    #[arg(long, env = "SYLMS_INIT_SCHEMA")]
    pub init_schema: bool,
}
