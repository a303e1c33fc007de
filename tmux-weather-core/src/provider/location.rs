use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::{cache::Producer, model::LatLon};

use super::truncate_body;

/// Runs an external command that prints `{"latitude": .., "longitude": ..}`.
#[derive(Debug, Clone)]
pub struct LocationCommand {
    program: String,
    args: Vec<String>,
}

impl LocationCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Producer for LocationCommand {
    type Args = ();
    type Output = LatLon;

    async fn produce(&self, _args: &()) -> Result<LatLon> {
        tracing::debug!(program = %self.program, "fetching lat/lon");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run location command '{}'", self.program))?;

        if !output.status.success() {
            return Err(anyhow!(
                "Location command '{}' failed with {}: {}",
                self.program,
                output.status,
                truncate_body(String::from_utf8_lossy(&output.stderr).trim()),
            ));
        }

        let latlon: LatLon = serde_json::from_slice(&output.stdout).with_context(|| {
            format!(
                "Failed to parse output of location command '{}': {}",
                self.program,
                truncate_body(String::from_utf8_lossy(&output.stdout).trim()),
            )
        })?;

        tracing::debug!(latitude = latlon.latitude, longitude = latlon.longitude, "resolved location");
        Ok(latlon)
    }
}
