//! Integration tests for the login/register handshake.

mod common;

use common::TestServer;

#[tokio::test]
async fn test_register_then_login() {
    let server = TestServer::spawn(17101)
        .await
        .expect("Failed to spawn test server");

    let mut first = server.connect().await.expect("Failed to connect");
    first.register("alice", "pw1").await.expect("Registration failed");
    first.send("exit").await.unwrap();
    first.expect_closed().await.unwrap();

    let mut second = server.connect().await.expect("Failed to connect");
    second.login("alice", "pw1").await.expect("Login failed");
}

#[tokio::test]
async fn test_action_keyword_is_case_insensitive() {
    let server = TestServer::spawn(17102)
        .await
        .expect("Failed to spawn test server");

    let mut client = server.connect().await.unwrap();
    client.authenticate("REGISTER", "carol", "pw").await.unwrap();
    client
        .expect("Registration successful! You can now chat.")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let server = TestServer::spawn(17103)
        .await
        .expect("Failed to spawn test server");

    let mut first = server.connect().await.unwrap();
    first.register("alice", "pw1").await.unwrap();

    let mut second = server.connect().await.unwrap();
    second.authenticate("register", "alice", "other").await.unwrap();
    second
        .expect("Registration failed: Username may already exist.")
        .await
        .unwrap();
    second.expect_closed().await.unwrap();

    // The original password still works.
    let mut third = server.connect().await.unwrap();
    third.login("alice", "pw1").await.unwrap();
}

#[tokio::test]
async fn test_wrong_password_never_joins() {
    let server = TestServer::spawn(17104)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect().await.unwrap();
    alice.register("alice", "pw1").await.unwrap();
    let mut bob = server.connect().await.unwrap();
    bob.register("bob", "pw2").await.unwrap();

    let mut intruder = server.connect().await.unwrap();
    intruder.authenticate("login", "alice", "wrong").await.unwrap();
    intruder
        .expect("Login failed: Invalid username or password.")
        .await
        .unwrap();
    intruder.expect_closed().await.unwrap();

    bob.send("still private").await.unwrap();
    alice.expect("bob: still private").await.unwrap();
}

#[tokio::test]
async fn test_unknown_user_login_fails() {
    let server = TestServer::spawn(17105)
        .await
        .expect("Failed to spawn test server");

    let mut client = server.connect().await.unwrap();
    client.authenticate("login", "nobody", "pw").await.unwrap();
    client
        .expect("Login failed: Invalid username or password.")
        .await
        .unwrap();
    client.expect_closed().await.unwrap();
}

#[tokio::test]
async fn test_invalid_action_disconnects() {
    let server = TestServer::spawn(17106)
        .await
        .expect("Failed to spawn test server");

    let mut client = server.connect().await.unwrap();
    client.expect("Enter 'login' or 'register':").await.unwrap();
    client.send("hello").await.unwrap();
    client.expect("Invalid action. Disconnecting.").await.unwrap();
    client.expect_closed().await.unwrap();
}

#[tokio::test]
async fn test_empty_username_disconnects() {
    let server = TestServer::spawn(17107)
        .await
        .expect("Failed to spawn test server");

    let mut client = server.connect().await.unwrap();
    client.expect("Enter 'login' or 'register':").await.unwrap();
    client.send("register").await.unwrap();
    client.expect("Enter username:").await.unwrap();
    client.send("").await.unwrap();
    client
        .expect("Invalid username. Disconnecting.")
        .await
        .unwrap();
    client.expect_closed().await.unwrap();
}

#[tokio::test]
async fn test_abandoned_handshake_does_not_affect_server() {
    let server = TestServer::spawn(17108)
        .await
        .expect("Failed to spawn test server");

    let mut quitter = server.connect().await.unwrap();
    quitter.expect("Enter 'login' or 'register':").await.unwrap();
    quitter.send("login").await.unwrap();
    drop(quitter);

    let mut client = server.connect().await.unwrap();
    client.register("dave", "pw").await.unwrap();
}
