#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use attendance_tool::{UserDirectory, http_api};

    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let addr: SocketAddr = std::env::var("ATTENDANCE_TOOL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
        .parse()?;

    println!("attendance-tool HTTP API listening on http://{addr}");
    let directory = UserDirectory::new();
    http_api::serve(addr, directory).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
