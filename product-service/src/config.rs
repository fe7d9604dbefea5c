use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "product-service")]
pub struct Args {
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, env = "DB_NAME", default_value = "postgres")]
    pub db_name: String,

    #[arg(long, env = "PORT", default_value_t = 80)]
    pub port: u16,

    /// Directory served for every non-API path.
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,
}

impl Args {
    /// Key/value connection string understood by both libpq and tokio-postgres.
    pub fn connection_string(&self) -> String {
        let mut parts = vec![
            format!("host={}", quote(&self.db_host)),
            format!("port={}", self.db_port),
            format!("user={}", quote(&self.db_user)),
        ];
        if !self.db_password.is_empty() {
            parts.push(format!("password={}", quote(&self.db_password)));
        }
        parts.push(format!("dbname={}", quote(&self.db_name)));
        parts.join(" ")
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
