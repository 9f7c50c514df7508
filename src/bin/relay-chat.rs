//! relay-chat - terminal client for relayd.
//!
//! Usage: `relay-chat [address]` (default `127.0.0.1:12345`). Every server
//! line is printed as received; every stdin line is sent as-is.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

const DEFAULT_ADDRESS: &str = "127.0.0.1:12345";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    let stream = match TcpStream::connect(&address).await {
        Ok(stream) => stream,
        Err(e) => {
            println!("Error connecting to server: {e}");
            println!("Disconnected.");
            return Ok(());
        }
    };
    println!("Connected to chat server.");

    let (read, write) = stream.into_split();
    let mut server = FramedRead::new(read, LinesCodec::new());
    let mut outgoing = FramedWrite::new(write, LinesCodec::new());

    let mut incoming = tokio::spawn(async move {
        while let Some(line) = server.next().await {
            match line {
                Ok(line) => println!("{line}"),
                Err(e) => {
                    println!("Connection lost: {e}");
                    break;
                }
            }
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = stdin.next_line() => match line? {
                Some(line) => {
                    if let Err(e) = outgoing.send(line).await {
                        println!("Connection lost: {e}");
                        break;
                    }
                }
                None => break,
            },
            _ = &mut incoming => break,
        }
    }

    // Dropping the write half shuts down our side of the socket.
    drop(outgoing);
    incoming.abort();
    println!("Disconnected.");
    Ok(())
}
