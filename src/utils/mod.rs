use std::io::Read;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Keyboard-interactive prompt handler that always responds with the password
struct PasswordPrompt {
    password: String,
}

impl ssh2::KeyboardInteractivePrompt for PasswordPrompt {
    fn prompt<'a>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[ssh2::Prompt<'a>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.clone()).collect()
    }
}

/// SSH target and credentials for one device
#[derive(Debug, Clone)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub timeout_secs: u64,
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, String> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| format!("Invalid address {}:{}: {}", host, port, e))?
        .next()
        .ok_or_else(|| format!("No address found for {}:{}", host, port))
}

/// Create an SSH session and authenticate with password + keyboard-interactive.
/// Returns the authenticated Session. Uses the ssh2 crate (libssh2).
/// This is blocking, so call from a spawn_blocking context.
pub fn ssh_connect(target: &SshTarget) -> Result<ssh2::Session, String> {
    let addr = resolve(&target.host, target.port)?;
    let timeout = Duration::from_secs(target.timeout_secs);
    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|e| format!("TCP connection failed: {}", e))?;

    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session = ssh2::Session::new()
        .map_err(|e| format!("Failed to create SSH session: {}", e))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(u32::try_from(target.timeout_secs * 1000).unwrap_or(u32::MAX));
    session.handshake()
        .map_err(|e| format!("SSH handshake failed: {}", e))?;

    // Try password auth first
    match session.userauth_password(&target.user, &target.pass) {
        Ok(_) if session.authenticated() => return Ok(session),
        _ => {}
    }

    // Some IOS images only offer keyboard-interactive
    let mut prompter = PasswordPrompt { password: target.pass.clone() };
    let _ = session.userauth_keyboard_interactive(&target.user, &mut prompter);

    if session.authenticated() {
        Ok(session)
    } else {
        Err("SSH authentication failed: all methods exhausted".to_string())
    }
}

/// Connect via SSH and run a single command, returning the output.
/// This is blocking, so call from a spawn_blocking context.
pub fn ssh_run_command(target: &SshTarget, command: &str) -> Result<String, String> {
    let session = ssh_connect(target)?;

    let mut channel = session.channel_session()
        .map_err(|e| format!("Failed to open channel: {}", e))?;

    channel.exec(command)
        .map_err(|e| format!("Failed to execute command: {}", e))?;

    let mut output = String::new();
    channel.read_to_string(&mut output)
        .map_err(|e| format!("Failed to read output: {}", e))?;

    channel.wait_close()
        .map_err(|e| format!("Failed to close channel: {}", e))?;

    Ok(output)
}

/// Async wrapper for ssh_run_command - runs in a blocking thread pool
pub async fn ssh_run_command_async(target: SshTarget, command: &str) -> Result<String, String> {
    let command = command.to_string();

    tokio::task::spawn_blocking(move || ssh_run_command(&target, &command))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

/// Validate a device or service key used in URL paths.
/// Allows alphanumeric, hyphens, dots, slashes, colons and underscores.
pub fn is_valid_key(key: &str) -> bool {
    if key.is_empty() || key.len() > 253 {
        return false;
    }
    key.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_literal_address() {
        let addr = resolve("127.0.0.1", 2022).unwrap();
        assert_eq!(addr.port(), 2022);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_connect_refused_is_an_error() {
        let target = SshTarget {
            host: "127.0.0.1".into(),
            port: 1,
            user: "admin".into(),
            pass: "admin".into(),
            timeout_secs: 1,
        };
        let err = ssh_run_command(&target, "show version").unwrap_err();
        assert!(err.starts_with("TCP connection failed"));
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("pe0"));
        assert!(is_valid_key("acme-corp"));
        assert!(is_valid_key("GigabitEthernet0/1"));
        assert!(is_valid_key("ce_1.lab"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("has space"));
        assert!(!is_valid_key("semi;colon"));
        assert!(!is_valid_key("quote'"));
    }
}
