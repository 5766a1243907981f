use anyhow::Result;
use linkfeed::cli::{start, telemetry};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    let result = action.execute().await;

    telemetry::shutdown_tracer();

    result
}
