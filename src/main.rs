use anyhow::Context;
use storefront_e2e::replica::{self, DEFAULT_PORT};

/// Port variable for the standalone replica server.
const PORT_VAR: &str = "REPLICA_PORT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_e2e::init_tracing();

    let port = match std::env::var(PORT_VAR) {
        Ok(v) if !v.is_empty() => v
            .parse::<u16>()
            .with_context(|| format!("{} must be a port number, got {:?}", PORT_VAR, v))?,
        _ => DEFAULT_PORT,
    };

    replica::serve(port)
        .await
        .with_context(|| format!("replica storefront on port {}", port))?;
    Ok(())
}
