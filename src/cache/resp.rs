//! # RESP Cache Client
//!
//! Minimal Redis client speaking RESP2 over pooled TCP connections.
//! Only the commands the key verifier needs are issued: `AUTH`, `SELECT`,
//! `PING`, `GET`, `SET ... EX` and `QUIT`.
//!
//! Each call makes one attempt under one deadline. A connection that fails
//! or times out is dropped, and the server is not contacted again until a
//! short backoff has passed; calls in that window fail fast.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex as Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::errors::{CacheError, CacheResult};
use super::KeyValueCache;

/// Default Redis port
pub const DEFAULT_PORT: u16 = 6379;

// ==================
// URL
// ==================

/// Parsed `redis://` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisUrl {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db: u32,
}

impl RedisUrl {
    pub fn parse(url: &str) -> CacheResult<Self> {
        let rest = if let Some(rest) = url.strip_prefix("redis://") {
            rest
        } else if url.starts_with("rediss://") {
            return Err(CacheError::InvalidUrl(
                "TLS connections (rediss://) are not supported".to_string(),
            ));
        } else {
            return Err(CacheError::InvalidUrl(format!("expected redis://, got '{}'", url)));
        };

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));

        let (userinfo, hostport) = match authority.rsplit_once('@') {
            Some((userinfo, hostport)) => (Some(userinfo), hostport),
            None => (None, authority),
        };

        let (username, password) = match userinfo {
            Some(info) => match info.split_once(':') {
                Some((user, pass)) => (non_empty(user), non_empty(pass)),
                None => (non_empty(info), None),
            },
            None => (None, None),
        };

        let (host, port) = match hostport.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| CacheError::InvalidUrl(format!("invalid port '{}'", port)))?;
                (host, port)
            }
            None => (hostport, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(CacheError::InvalidUrl("missing host".to_string()));
        }

        let db = if path.is_empty() {
            0
        } else {
            path.parse()
                .map_err(|_| CacheError::InvalidUrl(format!("invalid database '{}'", path)))?
        };

        Ok(Self {
            host: host.to_string(),
            port,
            username,
            password,
            db,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ==================
// Codec
// ==================

/// A decoded RESP2 reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    Simple(String),
    Error(String),
    Integer(i64),
    /// `None` is the nil bulk string
    Bulk(Option<Vec<u8>>),
    /// `None` is the nil array
    Array(Option<Vec<RespValue>>),
}

/// Encode a command as an array of bulk strings
pub fn encode_command(args: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + args.iter().map(|a| a.len() + 16).sum::<usize>());
    out.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        out.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
    out
}

async fn read_line<R>(reader: &mut R) -> CacheResult<String>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut buf = Vec::new();
    let n = reader.read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Err(CacheError::Io("connection closed by server".to_string()));
    }
    if !buf.ends_with(b"\r\n") {
        return Err(CacheError::Protocol("line not terminated by CRLF".to_string()));
    }
    buf.truncate(buf.len() - 2);
    String::from_utf8(buf).map_err(|_| CacheError::Protocol("non-UTF-8 line".to_string()))
}

/// Largest bulk string accepted from the server (Redis's own limit)
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Largest array accepted from the server
pub const MAX_ARRAY_LEN: i64 = 1024 * 1024;

fn parse_len(s: &str) -> CacheResult<i64> {
    s.parse()
        .map_err(|_| CacheError::Protocol(format!("invalid length '{}'", s)))
}

fn check_len(len: i64, max: i64, what: &str) -> CacheResult<usize> {
    if len > max {
        return Err(CacheError::Protocol(format!(
            "{} length {} exceeds limit {}",
            what, len, max
        )));
    }
    usize::try_from(len).map_err(|_| CacheError::Protocol(format!("invalid {} length {}", what, len)))
}

/// Decode one reply
pub fn read_value<'a, R>(
    reader: &'a mut R,
) -> Pin<Box<dyn Future<Output = CacheResult<RespValue>> + Send + 'a>>
where
    R: AsyncBufRead + Unpin + Send,
{
    Box::pin(async move {
        let line = read_line(reader).await?;
        let mut chars = line.chars();
        let Some(kind) = chars.next() else {
            return Err(CacheError::Protocol("empty reply".to_string()));
        };
        let body = chars.as_str();

        match kind {
            '+' => Ok(RespValue::Simple(body.to_string())),
            '-' => Ok(RespValue::Error(body.to_string())),
            ':' => Ok(RespValue::Integer(parse_len(body)?)),
            '$' => {
                let len = parse_len(body)?;
                if len < 0 {
                    return Ok(RespValue::Bulk(None));
                }
                let len = check_len(len, MAX_BULK_LEN, "bulk")?;
                let mut data = vec![0u8; len + 2];
                reader.read_exact(&mut data).await?;
                if !data.ends_with(b"\r\n") {
                    return Err(CacheError::Protocol("bulk string not terminated by CRLF".to_string()));
                }
                data.truncate(len);
                Ok(RespValue::Bulk(Some(data)))
            }
            '*' => {
                let len = parse_len(body)?;
                if len < 0 {
                    return Ok(RespValue::Array(None));
                }
                let len = check_len(len, MAX_ARRAY_LEN, "array")?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(read_value(reader).await?);
                }
                Ok(RespValue::Array(Some(items)))
            }
            other => Err(CacheError::Protocol(format!("unknown reply type '{}'", other))),
        }
    })
}

fn expect_ok(reply: RespValue) -> CacheResult<()> {
    match reply {
        RespValue::Simple(_) => Ok(()),
        RespValue::Error(msg) => Err(CacheError::Server(msg)),
        other => Err(CacheError::Protocol(format!("unexpected reply {:?}", other))),
    }
}

// ==================
// Client
// ==================

type Connection = BufStream<TcpStream>;

/// Idle connections kept for reuse
const MAX_IDLE_CONNECTIONS: usize = 8;

/// Default pause after a failed command before the server is tried again
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Redis client with a small pool of idle connections.
///
/// No lock is held across socket I/O: a call takes an idle connection (or
/// opens one), runs its command, and returns the connection on success.
/// Concurrent calls proceed on separate connections.
pub struct RespCache {
    url: RedisUrl,
    connect_timeout: Duration,
    command_timeout: Duration,
    retry_backoff: Duration,
    idle: Mutex<Vec<Connection>>,
    down_until: Mutex<Option<Instant>>,
}

impl RespCache {
    /// Parse `url`, open a connection and verify it with `PING`
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> CacheResult<Self> {
        let cache = Self {
            url: RedisUrl::parse(url)?,
            connect_timeout,
            command_timeout,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            idle: Mutex::new(Vec::new()),
            down_until: Mutex::new(None),
        };

        let conn = cache.open().await?;
        cache.release(conn)?;
        Ok(cache)
    }

    /// Pause after a transport failure during which calls fail fast
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn url(&self) -> &RedisUrl {
        &self.url
    }

    async fn open(&self) -> CacheResult<Connection> {
        let deadline = self.connect_timeout;
        let stream = timeout(deadline, TcpStream::connect(self.url.addr()))
            .await
            .map_err(|_| CacheError::Timeout(deadline.as_millis() as u64))?
            .map_err(|e| CacheError::Connect(format!("{}: {}", self.url.addr(), e)))?;
        stream.set_nodelay(true)?;

        let mut conn = BufStream::new(stream);
        timeout(deadline, self.handshake(&mut conn))
            .await
            .map_err(|_| CacheError::Timeout(deadline.as_millis() as u64))??;
        Ok(conn)
    }

    async fn handshake(&self, conn: &mut Connection) -> CacheResult<()> {
        match (&self.url.username, &self.url.password) {
            (Some(user), Some(pass)) => {
                expect_ok(exchange(conn, &[b"AUTH", user.as_bytes(), pass.as_bytes()]).await?)?;
            }
            (None, Some(pass)) => {
                expect_ok(exchange(conn, &[b"AUTH", pass.as_bytes()]).await?)?;
            }
            _ => {}
        }

        if self.url.db != 0 {
            let db = self.url.db.to_string();
            expect_ok(exchange(conn, &[b"SELECT", db.as_bytes()]).await?)?;
        }

        expect_ok(exchange(conn, &[b"PING"]).await?)
    }

    fn acquire(&self) -> CacheResult<Option<Connection>> {
        let mut idle = self.idle.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(idle.pop())
    }

    fn release(&self, conn: Connection) -> CacheResult<()> {
        let mut idle = self.idle.lock().map_err(|_| CacheError::Poisoned)?;
        if idle.len() < MAX_IDLE_CONNECTIONS {
            idle.push(conn);
        }
        Ok(())
    }

    /// Time left before the server may be tried again
    fn backoff_remaining(&self) -> CacheResult<Option<Duration>> {
        let down_until = self.down_until.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(down_until
            .and_then(|until| until.checked_duration_since(Instant::now()))
            .filter(|remaining| !remaining.is_zero()))
    }

    /// Fail fast for `retry_backoff` and drop idle connections
    fn mark_down(&self) -> CacheResult<()> {
        if let Ok(mut idle) = self.idle.lock() {
            idle.clear();
        }
        let mut down_until = self.down_until.lock().map_err(|_| CacheError::Poisoned)?;
        *down_until = Some(Instant::now() + self.retry_backoff);
        Ok(())
    }

    /// Run one command under a single deadline covering reconnect and reply
    async fn command(&self, args: &[&[u8]]) -> CacheResult<RespValue> {
        if let Some(remaining) = self.backoff_remaining()? {
            return Err(CacheError::Unavailable(remaining.as_millis() as u64));
        }

        let attempt = async {
            let mut conn = match self.acquire()? {
                Some(conn) => conn,
                None => self.open().await?,
            };
            let reply = exchange(&mut conn, args).await?;
            Ok::<_, CacheError>((conn, reply))
        };

        match timeout(self.command_timeout, attempt).await {
            Ok(Ok((conn, reply))) => {
                self.release(conn)?;
                Ok(reply)
            }
            Ok(Err(e)) => {
                self.mark_down()?;
                Err(e)
            }
            Err(_) => {
                self.mark_down()?;
                Err(CacheError::Timeout(self.command_timeout.as_millis() as u64))
            }
        }
    }
}

async fn exchange(conn: &mut Connection, args: &[&[u8]]) -> CacheResult<RespValue> {
    conn.write_all(&encode_command(args)).await?;
    conn.flush().await?;
    read_value(conn).await
}

#[async_trait]
impl KeyValueCache for RespCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self.command(&[b"GET", key.as_bytes()]).await? {
            RespValue::Bulk(None) => Ok(None),
            RespValue::Bulk(Some(data)) => String::from_utf8(data)
                .map(Some)
                .map_err(|_| CacheError::Protocol("non-UTF-8 value".to_string())),
            RespValue::Error(msg) => Err(CacheError::Server(msg)),
            other => Err(CacheError::Protocol(format!("unexpected reply {:?}", other))),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        // EX must be positive
        let seconds = ttl.as_secs().max(1).to_string();
        let reply = self
            .command(&[b"SET", key.as_bytes(), value.as_bytes(), b"EX", seconds.as_bytes()])
            .await?;
        expect_ok(reply)
    }

    async fn close(&self) -> CacheResult<()> {
        let connections: Vec<Connection> = {
            let mut idle = self.idle.lock().map_err(|_| CacheError::Poisoned)?;
            idle.drain(..).collect()
        };
        for mut conn in connections {
            // Best effort; the socket is dropped either way
            let _ = timeout(self.command_timeout, exchange(&mut conn, &[b"QUIT"])).await;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RespCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RespCache")
            .field("addr", &self.url.addr())
            .field("db", &self.url.db)
            .finish()
    }
}
