/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: String,
    pub duckdb_memory_limit: String,
    /// Fixed page size shared by all paginated reports.
    pub page_size: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            data_dir: std::env::var("PAGESIGHT_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("PAGESIGHT_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            page_size: std::env::var("PAGESIGHT_PAGE_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|e| format!("invalid PAGESIGHT_PAGE_SIZE: {e}"))?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            duckdb_memory_limit: "1GB".to_string(),
            page_size: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_falls_back_to_defaults() {
        // None of the PAGESIGHT_* variables are set under `cargo test`.
        let config = Config::from_env().unwrap();
        assert_eq!(config.data_dir, "./data");
        assert_eq!(config.duckdb_memory_limit, "1GB");
        assert_eq!(config.page_size, 10);
    }
}
