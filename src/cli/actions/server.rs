use crate::cli::actions::Action;
use crate::gatehouse::new;
use anyhow::{anyhow, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            // Fail early on a malformed DSN instead of at pool creation
            let dsn = Url::parse(&dsn)?;

            match dsn.scheme() {
                "postgres" | "postgresql" => (),
                scheme => return Err(anyhow!("unsupported database scheme: {scheme}")),
            }

            new(port, dsn.to_string()).await?;
        }
    }

    Ok(())
}
