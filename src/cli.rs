use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "tarmac",
    about = "Menu-driven airline reservation console for PostgreSQL"
)]
pub struct Cli {
    /// Database name
    pub dbname: String,

    /// Server port
    pub port: u16,

    /// Login role
    pub user: String,

    /// Server host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Login password
    #[arg(long, env = "TARMAC_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// External tool used to copy reservation documents
    #[arg(long, env = "TARMAC_TRANSFER_TOOL", default_value = "hdfs")]
    pub transfer_tool: String,

    /// Remote root directory for reservation documents
    #[arg(long, default_value = "tarmac")]
    pub document_root: String,
}
