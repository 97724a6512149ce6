use crate::cli::{actions::Action, commands::auth};
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
        jwt_secret: matches
            .get_one::<String>(auth::ARG_JWT_SECRET)
            .map(|s| SecretString::from(s.clone()))
            .ok_or_else(|| anyhow::anyhow!("missing argument: --jwt-secret"))?,
        bcrypt_cost: matches
            .get_one::<u32>(auth::ARG_BCRYPT_COST)
            .copied()
            .unwrap_or(10),
        access_token_ttl: matches
            .get_one::<String>(auth::ARG_ACCESS_TOKEN_TTL)
            .cloned()
            .unwrap_or_else(|| "15m".to_string()),
        refresh_token_days: matches
            .get_one::<i64>(auth::ARG_REFRESH_TOKEN_DAYS)
            .copied()
            .unwrap_or(30),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_action() -> Result<()> {
        temp_env::with_vars(
            [
                ("TESSERA_JWT_SECRET", None::<&str>),
                ("TESSERA_BCRYPT_COST", None),
                ("TESSERA_ACCESS_TOKEN_TTL", None),
                ("TESSERA_REFRESH_TOKEN_DAYS", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "tessera",
                    "--dsn",
                    "postgres://localhost:5432/tessera",
                    "--port",
                    "9000",
                    "--jwt-secret",
                    "s3cret",
                ]);

                let Action::Server {
                    port,
                    dsn,
                    jwt_secret,
                    bcrypt_cost,
                    access_token_ttl,
                    refresh_token_days,
                } = handler(&matches)?;

                assert_eq!(port, 9000);
                assert_eq!(dsn, "postgres://localhost:5432/tessera");
                assert_eq!(jwt_secret.expose_secret(), "s3cret");
                assert_eq!(bcrypt_cost, 10);
                assert_eq!(access_token_ttl, "15m");
                assert_eq!(refresh_token_days, 30);
                Ok(())
            },
        )
    }
}
