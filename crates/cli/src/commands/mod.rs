pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Database URL for CLI commands, same lookup order as the server.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    ["HELPDESK_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .map(SecretString::from)
}
