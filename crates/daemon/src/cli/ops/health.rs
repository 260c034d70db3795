use clap::Args;

use nouns_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // 1. Check config directory
        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.nouns_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push("  db/:          OK".to_string());
                lines.push(format!("  port:         {}", state.config.port));
                lines.push(format!("  log_level:    {}", state.config.log_level));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        // 2. Probe the daemon
        lines.push(String::new());
        lines.push(format!("Daemon ({}):", ctx.remote));

        for (label, path) in [("livez: ", "/_status/livez"), ("readyz:", "/_status/readyz")] {
            let line = match ctx.client.get(ctx.url(path)).send().await {
                Ok(resp) if resp.status().is_success() => format!("  {} OK", label),
                Ok(resp) => format!("  {} UNHEALTHY ({})", label, resp.status()),
                Err(_) => format!("  {} NOT REACHABLE", label),
            };
            lines.push(line);
        }

        Ok(lines.join("\n"))
    }
}
