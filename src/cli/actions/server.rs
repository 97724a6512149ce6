use crate::api;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::actions::Action;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            jwt_secret,
            bcrypt_cost,
            access_token_ttl,
            refresh_token_days,
        } => {
            let auth_config = AuthConfig::new(jwt_secret)
                .with_bcrypt_cost(bcrypt_cost)
                .with_access_token_ttl(access_token_ttl)?
                .with_refresh_token_days(refresh_token_days);

            api::new(port, dsn, auth_config).await?;
        }
    }

    Ok(())
}
