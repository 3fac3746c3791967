//! FTP/FTPS adapter over `suppaftp`.
//!
//! The FTP control connection is a single stateful channel, so the adapter
//! holds the client behind a mutex and advertises `max_in_flight() == 1`.
//! The blocking client is driven from `spawn_blocking` to keep the async
//! orchestrator responsive.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitesync_types::RemotePath;
use suppaftp::native_tls::TlsConnector;
use suppaftp::{FtpError, FtpStream, NativeTlsConnector, NativeTlsFtpStream, Status};
use tracing::debug;

use crate::error::{ConnectError, OpKind, TransferError, TransferErrorKind, TransferResult};
use crate::store::RemoteStore;

/// Connection settings for the remote server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Negotiate explicit FTPS after connecting.
    pub secure: bool,
    /// Directory on the server to deploy into ("" for the login root).
    pub root: String,
}

enum Client {
    Plain(FtpStream),
    Secure(NativeTlsFtpStream),
}

impl Client {
    fn mkdir(&mut self, path: &str) -> Result<(), FtpError> {
        match self {
            Self::Plain(c) => c.mkdir(path),
            Self::Secure(c) => c.mkdir(path),
        }
    }

    fn put_file(&mut self, path: &str, reader: &mut Cursor<Vec<u8>>) -> Result<u64, FtpError> {
        match self {
            Self::Plain(c) => c.put_file(path, reader),
            Self::Secure(c) => c.put_file(path, reader),
        }
    }

    fn rm(&mut self, path: &str) -> Result<(), FtpError> {
        match self {
            Self::Plain(c) => c.rm(path),
            Self::Secure(c) => c.rm(path),
        }
    }

    fn rmdir(&mut self, path: &str) -> Result<(), FtpError> {
        match self {
            Self::Plain(c) => c.rmdir(path),
            Self::Secure(c) => c.rmdir(path),
        }
    }

    fn nlst(&mut self, path: &str) -> Result<Vec<String>, FtpError> {
        match self {
            Self::Plain(c) => c.nlst(Some(path)),
            Self::Secure(c) => c.nlst(Some(path)),
        }
    }

    fn cwd(&mut self, path: &str) -> Result<(), FtpError> {
        match self {
            Self::Plain(c) => c.cwd(path),
            Self::Secure(c) => c.cwd(path),
        }
    }

    fn quit(&mut self) -> Result<(), FtpError> {
        match self {
            Self::Plain(c) => c.quit(),
            Self::Secure(c) => c.quit(),
        }
    }
}

/// Remote store over one FTP or FTPS control connection.
pub struct FtpStore {
    client: Arc<Mutex<Client>>,
}

impl FtpStore {
    /// Connect and log in. The returned store carries the open connection
    /// for the whole deployment batch.
    pub async fn connect(config: &RemoteConfig) -> Result<Self, ConnectError> {
        let config = config.clone();
        tokio::task::spawn_blocking(move || Self::connect_blocking(&config))
            .await
            .map_err(|e| ConnectError::Protocol(format!("connect task failed: {e}")))?
    }

    fn connect_blocking(config: &RemoteConfig) -> Result<Self, ConnectError> {
        let addr = format!("{}:{}", config.host, config.port);
        let mut client = if config.secure {
            let stream = NativeTlsFtpStream::connect(&addr)
                .map_err(|e| unreachable_err(config, e))?;
            let connector = TlsConnector::new().map_err(|e| ConnectError::Tls {
                host: config.host.clone(),
                reason: e.to_string(),
            })?;
            let stream = stream
                .into_secure(NativeTlsConnector::from(connector), &config.host)
                .map_err(|e| ConnectError::Tls {
                    host: config.host.clone(),
                    reason: e.to_string(),
                })?;
            Client::Secure(stream)
        } else {
            Client::Plain(FtpStream::connect(&addr).map_err(|e| unreachable_err(config, e))?)
        };

        login(&mut client, config)?;

        if !config.root.is_empty() {
            client
                .cwd(&config.root)
                .map_err(|e| ConnectError::Protocol(format!("cwd {}: {e}", config.root)))?;
        }

        debug!(host = %config.host, port = config.port, secure = config.secure, "connected");
        Ok(Self {
            client: Arc::new(Mutex::new(client)),
        })
    }

    /// Politely close the control connection.
    pub async fn quit(self) {
        let client = Arc::clone(&self.client);
        let _ = tokio::task::spawn_blocking(move || {
            if let Ok(mut guard) = client.lock() {
                let _ = guard.quit();
            }
        })
        .await;
    }

    async fn run_blocking<T, F>(&self, op: F) -> T
    where
        T: Send + 'static,
        F: FnOnce(&mut Client) -> T + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            let mut guard = client.lock().expect("ftp client lock poisoned");
            op(&mut guard)
        })
        .await
        .expect("ftp blocking task panicked")
    }
}

fn login(client: &mut Client, config: &RemoteConfig) -> Result<(), ConnectError> {
    let result = match client {
        Client::Plain(c) => c.login(&config.user, &config.password),
        Client::Secure(c) => c.login(&config.user, &config.password),
    };
    result.map_err(|e| ConnectError::LoginRejected {
        user: config.user.clone(),
        reason: e.to_string(),
    })
}

fn unreachable_err(config: &RemoteConfig, err: FtpError) -> ConnectError {
    match err {
        FtpError::ConnectionError(source) => ConnectError::Unreachable {
            host: config.host.clone(),
            port: config.port,
            source,
        },
        other => ConnectError::Protocol(other.to_string()),
    }
}

fn map_ftp_error(operation: OpKind, path: &RemotePath, err: FtpError) -> TransferError {
    let kind = match err {
        FtpError::ConnectionError(source) => match source.kind() {
            std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe => {
                TransferErrorKind::ConnectionReset
            }
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                TransferErrorKind::Timeout
            }
            _ => TransferErrorKind::Io(source),
        },
        FtpError::UnexpectedResponse(response) => match response.status {
            Status::FileUnavailable => TransferErrorKind::NotFound,
            Status::NotLoggedIn => TransferErrorKind::PermissionDenied,
            _ => TransferErrorKind::Protocol(format!("{:?}", response.status)),
        },
        other => TransferErrorKind::Protocol(other.to_string()),
    };
    TransferError::new(operation, path.clone(), kind)
}

/// Remove a directory, clearing any remaining contents first.
///
/// The sequencer removes children before their parent, so the recursion is
/// only exercised when the remote holds entries the mirror never knew about.
fn remove_dir_recursive(client: &mut Client, path: &str) -> Result<(), FtpError> {
    if client.rmdir(path).is_ok() {
        return Ok(());
    }
    let entries = client.nlst(path)?;
    for entry in entries {
        let name = entry.rsplit('/').next().unwrap_or(entry.as_str());
        if name.is_empty() || name == "." || name == ".." {
            continue;
        }
        let child = format!("{path}/{name}");
        if client.rm(&child).is_err() {
            remove_dir_recursive(client, &child)?;
        }
    }
    client.rmdir(path)
}

/// Classify a failed MKD. A server refusing MKD for an existing directory
/// answers 550, which is indistinguishable from "already present" here, so
/// most refusals are skipped. An authentication rejection or a dropped
/// connection is unambiguous and propagates.
fn mkdir_failure(path: &RemotePath, prefix: &str, err: FtpError) -> Option<TransferError> {
    match err {
        FtpError::UnexpectedResponse(response) if response.status != Status::NotLoggedIn => {
            debug!(path = %prefix, status = ?response.status, "mkdir skipped");
            None
        }
        other => Some(map_ftp_error(OpKind::EnsureDir, path, other)),
    }
}

#[async_trait]
impl RemoteStore for FtpStore {
    async fn ensure_dir(&self, path: &RemotePath) -> TransferResult<()> {
        let path = path.clone();
        self.run_blocking(move |client| {
            // Create ancestors shallow-first.
            let mut prefix = String::new();
            for segment in path.segments() {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(segment);
                if let Err(err) = client.mkdir(&prefix) {
                    if let Some(failure) = mkdir_failure(&path, &prefix, err) {
                        return Err(failure);
                    }
                }
            }
            Ok(())
        })
        .await
    }

    async fn upload_from(&self, local: &Path, remote: &RemotePath) -> TransferResult<()> {
        let local = PathBuf::from(local);
        let remote = remote.clone();
        self.run_blocking(move |client| {
            let bytes = std::fs::read(&local).map_err(|source| {
                TransferError::new(OpKind::Upload, remote.clone(), TransferErrorKind::Io(source))
            })?;
            let mut reader = Cursor::new(bytes);
            client
                .put_file(remote.as_str(), &mut reader)
                .map(|_| ())
                .map_err(|e| map_ftp_error(OpKind::Upload, &remote, e))
        })
        .await
    }

    async fn remove(&self, path: &RemotePath) -> TransferResult<()> {
        let path = path.clone();
        self.run_blocking(move |client| {
            client
                .rm(path.as_str())
                .map_err(|e| map_ftp_error(OpKind::Remove, &path, e))
        })
        .await
    }

    async fn remove_dir(&self, path: &RemotePath) -> TransferResult<()> {
        let path = path.clone();
        self.run_blocking(move |client| {
            remove_dir_recursive(client, path.as_str())
                .map_err(|e| map_ftp_error(OpKind::RemoveDir, &path, e))
        })
        .await
    }
}
