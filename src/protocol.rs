//! Wire-level text of the chat protocol.
//!
//! Every message in either direction is one line of UTF-8 text terminated by
//! `\n`. These are the exact lines the server writes.

pub const PROMPT_ACTION: &str = "Enter 'login' or 'register':";
pub const PROMPT_USERNAME: &str = "Enter username:";
pub const PROMPT_PASSWORD: &str = "Enter password:";

pub const INVALID_ACTION: &str = "Invalid action. Disconnecting.";
pub const INVALID_USERNAME: &str = "Invalid username. Disconnecting.";
pub const HANDSHAKE_LINE_TOO_LONG: &str = "Input line too long. Disconnecting.";

pub const REGISTER_OK: &str = "Registration successful! You can now chat.";
pub const REGISTER_FAILED: &str = "Registration failed: Username may already exist.";
pub const LOGIN_FAILED: &str = "Login failed: Invalid username or password.";

pub const CHAT_INSTRUCTIONS: &str = "Type your messages below. Type 'exit' to quit.";
pub const LINE_TOO_LONG: &str = "Input line too long.";
pub const SENDQ_EXCEEDED: &str = "SendQ exceeded. Disconnecting.";

/// Keyword that ends the message loop, compared case-insensitively.
pub const EXIT_COMMAND: &str = "exit";

pub fn login_ok(username: &str) -> String {
    format!("Login successful! Welcome back, {username}.")
}

/// Line delivered to every other member for a broadcast.
pub fn chat_line(sender: &str, message: &str) -> String {
    format!("{sender}: {message}")
}

pub fn is_exit_command(line: &str) -> bool {
    line.eq_ignore_ascii_case(EXIT_COMMAND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_matches_any_case_only_exactly() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("ExIt"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command(" exit"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn formats_lines() {
        assert_eq!(chat_line("alice", "hello"), "alice: hello");
        assert_eq!(login_ok("alice"), "Login successful! Welcome back, alice.");
    }
}
