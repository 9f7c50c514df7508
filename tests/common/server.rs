//! Test server management.
//!
//! Spawns and manages relayd instances for integration testing.

use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    // Held so the directory lives as long as the server.
    data_dir: TempDir,
}

impl TestServer {
    /// Spawn a new test server listening on `port`.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, "").await
    }

    /// Spawn a test server, appending `extra` to the generated config.
    pub async fn spawn_with(port: u16, extra: &str) -> anyhow::Result<Self> {
        let data_dir = tempfile::Builder::new()
            .prefix(&format!("relayd-test-{port}-"))
            .tempdir()?;

        let config_path = data_dir.path().join("relayd.toml");
        let config_content = format!(
            r#"
[server]
name = "test.relay"
metrics_port = 0

[listen]
address = "127.0.0.1:{port}"

[database]
path = "{db}"

[limits]
max_line_length = 256
sendq = 64
{extra}
"#,
            db = data_dir.path().join("chat.db").display(),
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_relayd"))
            .arg(&config_path)
            .env("RUST_LOG", "relayd=debug")
            .spawn()?;

        let server = Self {
            child,
            port,
            data_dir,
        };

        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Open a new client connection to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }

    #[allow(dead_code)]
    fn db_path(&self) -> PathBuf {
        self.data_dir.path().join("chat.db")
    }

    /// Read the persisted transcript as `(sender, message)` pairs, oldest first.
    #[allow(dead_code)]
    pub async fn transcript(&self) -> anyhow::Result<Vec<(String, String)>> {
        let options = SqliteConnectOptions::new().filename(self.db_path());
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let rows = sqlx::query("SELECT sender_username, message FROM chat_logs ORDER BY id")
            .fetch_all(&pool)
            .await?;
        pool.close().await;

        Ok(rows
            .iter()
            .map(|row| (row.get("sender_username"), row.get("message")))
            .collect())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
