//! Auth-related CLI arguments: signing secret, hash cost, and token lifetimes.

use clap::{builder::ValueParser, Arg, Command};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";
pub const ARG_ACCESS_TOKEN_TTL: &str = "access-token-ttl";
pub const ARG_REFRESH_TOKEN_DAYS: &str = "refresh-token-days";

/// bcrypt rejects costs outside 4..=31, fail at parse time instead.
#[must_use]
pub fn validator_bcrypt_cost() -> ValueParser {
    ValueParser::from(|cost: &str| -> std::result::Result<u32, String> {
        let cost: u32 = cost
            .parse()
            .map_err(|_| "cost must be a number".to_string())?;
        if (4..=31).contains(&cost) {
            Ok(cost)
        } else {
            Err("cost must be between 4 and 31".to_string())
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret key used to sign access tokens")
                .env("TESSERA_JWT_SECRET")
                .hide_env_values(true)
                .default_value("dev-secret"),
        )
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long(ARG_BCRYPT_COST)
                .help("bcrypt cost factor for password and refresh-token hashes")
                .env("TESSERA_BCRYPT_COST")
                .default_value("10")
                .value_parser(validator_bcrypt_cost()),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL)
                .long(ARG_ACCESS_TOKEN_TTL)
                .help("Access token lifetime, e.g. 15m, 1h (suffix: s, m, h, d)")
                .env("TESSERA_ACCESS_TOKEN_TTL")
                .default_value("15m"),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_DAYS)
                .long(ARG_REFRESH_TOKEN_DAYS)
                .help("Refresh token lifetime in days")
                .env("TESSERA_REFRESH_TOKEN_DAYS")
                .default_value("30")
                .value_parser(clap::value_parser!(i64)),
        )
}

#[cfg(test)]
mod tests {
    use super::validator_bcrypt_cost;

    #[test]
    fn bcrypt_cost_bounds() {
        let parser = validator_bcrypt_cost();
        let cmd = clap::Command::new("test");
        let arg = clap::Arg::new("cost");
        assert!(parser.parse_ref(&cmd, Some(&arg), "4".as_ref()).is_ok());
        assert!(parser.parse_ref(&cmd, Some(&arg), "31".as_ref()).is_ok());
        assert!(parser.parse_ref(&cmd, Some(&arg), "3".as_ref()).is_err());
        assert!(parser.parse_ref(&cmd, Some(&arg), "32".as_ref()).is_err());
        assert!(parser.parse_ref(&cmd, Some(&arg), "ten".as_ref()).is_err());
    }
}
