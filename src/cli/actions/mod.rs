pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        jwt_secret: SecretString,
        bcrypt_cost: u32,
        access_token_ttl: String,
        refresh_token_days: i64,
    },
}
