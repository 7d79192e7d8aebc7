use std::{env, fmt, num::ParseIntError};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

impl WebConfig {
    /// Reads `HOST` and `PORT`, falling back to the defaults when unset.
    pub fn from_env() -> Result<Self, ParseIntError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ParseIntError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST")
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(port) => port.trim().parse()?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for WebConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = WebConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, WebConfig::default());
        assert_eq!(config.socket_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn host_and_port_are_read() {
        let config = WebConfig::from_lookup(|key| match key {
            "HOST" => Some("127.0.0.1".to_owned()),
            "PORT" => Some("9090".to_owned()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.socket_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn invalid_port_is_an_error() {
        let result = WebConfig::from_lookup(|key| (key == "PORT").then(|| "http".to_owned()));
        assert!(result.is_err());
    }
}
