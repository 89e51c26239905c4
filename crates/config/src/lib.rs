//! Configuration for the accounts backend, loaded from an embedded JSON
//! document with environment-variable overrides for the deployment-specific
//! values (listen port, token secret, store endpoint).

mod config_loader;
pub use config_loader::*;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Vec<u8>,
    pub expiry_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: &[u8], expiry_hours: u64) -> Self {
        Self {
            secret: secret.to_vec(),
            expiry_hours,
        }
    }
}

impl From<&AppConfig> for JwtConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            secret: config.security.jwt.secret.clone().into_bytes(),
            expiry_hours: config.security.jwt.expiry_hours,
        }
    }
}
