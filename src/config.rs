use std::env;

/// URL scheme that selects the in-process document store instead of MongoDB.
pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_name: String,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "inventory".to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with(MEMORY_URL_SCHEME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> Config {
        Config {
            database_url: url.to_string(),
            database_name: "inventory".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
        }
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(config("memory://").server_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn test_memory_store_selection() {
        assert!(config("memory://").uses_memory_store());
        assert!(!config("mongodb://localhost:27017").uses_memory_store());
    }
}
