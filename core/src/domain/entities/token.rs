//! Token entities: kinds, identifiers and persisted records.

use serde::{Deserialize, Serialize};
use uuid::{NoContext, Timestamp, Uuid};

use crate::errors::TokenError;

use super::principal::AuthPrincipal;

/// One day in milliseconds
pub const ONE_DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// One week in milliseconds
pub const ONE_WEEK_MILLIS: i64 = 7 * ONE_DAY_MILLIS;

/// Record type label used when `create` is given none
pub const DEFAULT_TOKEN_TYPE: &str = "access";

/// Opaque caller-supplied state attached to a token
pub type TokenState = serde_json::Map<String, serde_json::Value>;

/// The closed set of token kinds
///
/// Each kind has a two-character signing prefix, a four-character wire prefix
/// (`base64url(signing_prefix || "-")`) and a default lifetime. Only access and
/// refresh tokens carry their absolute expiry inside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Email,
    Offline,
}

impl TokenKind {
    /// All kinds, in wire-prefix matching order
    pub const ALL: [TokenKind; 4] = [
        TokenKind::Access,
        TokenKind::Refresh,
        TokenKind::Email,
        TokenKind::Offline,
    ];

    /// Prefix mixed into the signature input
    pub fn signing_prefix(&self) -> &'static str {
        match self {
            TokenKind::Access => "ac",
            TokenKind::Refresh => "re",
            TokenKind::Email => "em",
            TokenKind::Offline => "of",
        }
    }

    /// Prefix the wire string starts with
    pub fn wire_prefix(&self) -> &'static str {
        match self {
            TokenKind::Access => "YWMt",
            TokenKind::Refresh => "cmUt",
            TokenKind::Email => "ZW0t",
            TokenKind::Offline => "b2Yt",
        }
    }

    /// Whether the payload includes an absolute expiry timestamp
    pub fn carries_embedded_expiry(&self) -> bool {
        matches!(self, TokenKind::Access | TokenKind::Refresh)
    }

    /// Built-in lifetime in milliseconds
    pub fn default_ttl_millis(&self) -> i64 {
        match self {
            TokenKind::Access => ONE_DAY_MILLIS,
            TokenKind::Refresh | TokenKind::Email | TokenKind::Offline => ONE_WEEK_MILLIS,
        }
    }

    /// Lowercase label used in logs and configuration
    pub fn label(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::Email => "email",
            TokenKind::Offline => "offline",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TokenKind {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s))
            .ok_or(TokenError::UnknownKind)
    }
}

/// Time-ordered token identifier
///
/// Wraps a UUID whose creation time is recoverable. The creation time in epoch
/// milliseconds is extracted once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId {
    uuid: Uuid,
    created: i64,
}

impl TokenId {
    /// Generates a new UUIDv7 id stamped with `now_millis`
    pub fn generate(now_millis: i64) -> Self {
        let millis = now_millis.max(0) as u64;
        let timestamp = Timestamp::from_unix(
            NoContext,
            millis / 1000,
            ((millis % 1000) * 1_000_000) as u32,
        );
        Self {
            uuid: Uuid::new_v7(timestamp),
            created: millis as i64,
        }
    }

    /// Wraps an existing UUID
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if the UUID carries no timestamp
    /// (anything other than versions 1, 6 and 7) or one before the Unix epoch.
    pub fn from_uuid(uuid: Uuid) -> Result<Self, TokenError> {
        let created = creation_millis(&uuid).ok_or(TokenError::Malformed)?;
        Ok(Self { uuid, created })
    }

    /// Reads an id from its 16 big-endian bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Result<Self, TokenError> {
        Self::from_uuid(Uuid::from_bytes(bytes))
    }

    /// Creation time in epoch milliseconds
    pub fn created_millis(&self) -> i64 {
        self.created
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.uuid.as_bytes()
    }
}

/// 100ns intervals between 1582-10-15 and 1970-01-01
const GREGORIAN_UNIX_OFFSET: u64 = 0x01B2_1DD2_1381_4000;

/// Epoch milliseconds embedded in a time-based UUID
fn creation_millis(uuid: &Uuid) -> Option<i64> {
    let b = uuid.as_bytes();
    let be = |range: std::ops::Range<usize>| {
        b[range].iter().fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
    };

    let millis = match uuid.get_version_num() {
        7 => be(0..6),
        1 => {
            let ticks = ((be(6..8) & 0x0FFF) << 48) | (be(4..6) << 32) | be(0..4);
            ticks.checked_sub(GREGORIAN_UNIX_OFFSET)? / 10_000
        }
        6 => {
            let ticks = (be(0..4) << 28) | (be(4..6) << 12) | (be(6..8) & 0x0FFF);
            ticks.checked_sub(GREGORIAN_UNIX_OFFSET)? / 10_000
        }
        _ => return None,
    };
    i64::try_from(millis).ok()
}

impl std::fmt::Display for TokenId {
    /// Canonical lowercase hyphenated form
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uuid.hyphenated())
    }
}

impl std::str::FromStr for TokenId {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s).map_err(|_| TokenError::Malformed)?;
        Self::from_uuid(uuid)
    }
}

/// Components recovered from a verified wire string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedToken {
    pub kind: TokenKind,
    pub id: TokenId,
    /// Absolute expiry in epoch milliseconds, for kinds that embed one
    pub expires: Option<i64>,
}

/// Metadata persisted for every issued token
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    /// Token identifier, unique and immutable
    pub id: TokenId,

    /// Caller-chosen subtype label
    pub token_type: String,

    /// Creation time in epoch milliseconds, equal to the id's timestamp
    pub created: i64,

    /// Last successful access in epoch milliseconds
    pub accessed: i64,

    /// Principal the token was issued for
    pub principal: Option<AuthPrincipal>,

    /// Opaque caller state
    pub state: Option<TokenState>,
}

impl TokenRecord {
    /// Creates a record for a freshly issued id
    ///
    /// `created` and `accessed` both start at the id's creation time.
    pub fn new(
        id: TokenId,
        token_type: impl Into<String>,
        principal: Option<AuthPrincipal>,
        state: Option<TokenState>,
    ) -> Self {
        let created = id.created_millis();
        Self {
            id,
            token_type: token_type.into(),
            created,
            accessed: created,
            principal,
            state,
        }
    }

    /// Advances `accessed` to `now`, never moving it backwards
    ///
    /// Returns the resulting access time.
    pub fn mark_accessed(&mut self, now: i64) -> i64 {
        self.accessed = self.accessed.max(now);
        self.accessed
    }
}
