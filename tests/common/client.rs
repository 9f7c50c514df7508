//! Test chat client.
//!
//! A line client that can walk the login/register handshake and assert on
//! received lines.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send one line.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.send_raw(line.as_bytes()).await
    }

    /// Send one line of arbitrary bytes.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one line, without its terminator.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(RECV_TIMEOUT).await
    }

    /// Receive one line with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Receive one line and assert its exact text.
    pub async fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        let line = self.recv().await?;
        if line != expected {
            anyhow::bail!("expected {expected:?}, got {line:?}");
        }
        Ok(())
    }

    /// Wait for the server to close the connection.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
        if n != 0 {
            anyhow::bail!("expected close, got {:?}", line.trim_end());
        }
        Ok(())
    }

    /// Run the handshake up to (and including) the password line.
    pub async fn authenticate(
        &mut self,
        action: &str,
        username: &str,
        password: &str,
    ) -> anyhow::Result<()> {
        self.expect("Enter 'login' or 'register':").await?;
        self.send(action).await?;
        self.expect("Enter username:").await?;
        self.send(username).await?;
        self.expect("Enter password:").await?;
        self.send(password).await?;
        Ok(())
    }

    /// Register a new account and wait until admitted.
    pub async fn register(&mut self, username: &str, password: &str) -> anyhow::Result<()> {
        self.authenticate("register", username, password).await?;
        self.expect("Registration successful! You can now chat.").await?;
        self.expect("Type your messages below. Type 'exit' to quit.").await
    }

    /// Log in to an existing account and wait until admitted.
    #[allow(dead_code)]
    pub async fn login(&mut self, username: &str, password: &str) -> anyhow::Result<()> {
        self.authenticate("login", username, password).await?;
        self.expect(&format!("Login successful! Welcome back, {username}."))
            .await?;
        self.expect("Type your messages below. Type 'exit' to quit.").await
    }
}
