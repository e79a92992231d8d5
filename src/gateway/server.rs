//! Newline-delimited JSON gateway over stdio
//!
//! One request per line on stdin; one response line on stdout when the
//! request was handled. Unhandled requests produce no output, matching the
//! gateway contract.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::error::Result;
use crate::gateway::CommandGateway;

/// Serves a [`CommandGateway`] over stdin/stdout.
pub struct GatewayServer {
    gateway: CommandGateway,
}

impl GatewayServer {
    /// Create a server around the given gateway.
    pub fn new(gateway: CommandGateway) -> Self {
        Self { gateway }
    }

    /// Read requests until stdin closes.
    pub async fn run(&self) -> Result<()> {
        info!("command gateway listening on stdio");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!(request = line, "received");

            match self.gateway.handle_line(line) {
                Some(response) => {
                    let json = response.to_string();
                    debug!(response = %json, "sending");
                    stdout.write_all(json.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
                None => debug!("request not handled"),
            }
        }

        info!("gateway input closed, shutting down");
        Ok(())
    }
}
