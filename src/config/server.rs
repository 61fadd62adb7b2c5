use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Names the database file inside `data_dir`.
    pub keyspace: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.db", self.keyspace))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            keyspace: "rotafacil".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
        assert_eq!(config.db_path(), PathBuf::from("./data/rotafacil.db"));
    }

    #[test]
    fn test_db_path_uses_keyspace() {
        let config = ServerConfig {
            data_dir: PathBuf::from("/var/lib/rotafacil"),
            keyspace: "staging".into(),
            ..Default::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/var/lib/rotafacil/staging.db"));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = ServerConfig {
            host: "not a host".into(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
