use dotenvy::dotenv;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub paystack_secret_key: String,
    pub paystack_base_url: String,
    pub paystack_timeout_secs: u64,
    /// Bearer token -> user email, resolved on authenticated routes.
    pub api_keys: HashMap<String, String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            paystack_secret_key: env::var("PAYSTACK_SECRET_KEY")?,
            paystack_base_url: env::var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|_| "https://api.paystack.co".to_string()),
            paystack_timeout_secs: env::var("PAYSTACK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            api_keys: parse_api_keys(&env::var("API_KEYS").unwrap_or_default())?,
        })
    }
}

fn parse_api_keys(raw: &str) -> anyhow::Result<HashMap<String, String>> {
    let mut keys = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (token, email) = entry
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("API_KEYS entries must be 'token:email' pairs"))?;
        keys.insert(token.trim().to_string(), email.trim().to_string());
    }
    Ok(keys)
}
