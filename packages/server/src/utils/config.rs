use once_cell::sync::Lazy;
use std::env;
use std::net::SocketAddr;

use crate::models::game::GameType;

pub static CONFIG: Lazy<Config> = Lazy::new(Config::new);

pub struct Config {
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
    pub admin_usernames: Vec<String>,
    pub default_game_type: GameType,
}

impl Config {
    fn new() -> Self {
        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|v| match v.parse() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    log::warn!("BIND_ADDR {} is invalid ({}), using the default", v, e);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        Self {
            bind_addr,
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            admin_usernames: env::var("ADMIN_USERNAMES")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            default_game_type: env::var("DEFAULT_GAME_TYPE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(GameType::Classic),
        }
    }

    pub fn is_admin(&self, username: &str) -> bool {
        self.admin_usernames
            .iter()
            .any(|a| a.eq_ignore_ascii_case(username))
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_list() {
        assert_eq!(parse_list(" alice, bob ,,"), vec!["alice", "bob"]);
        assert!(parse_list("").is_empty());
    }
}
