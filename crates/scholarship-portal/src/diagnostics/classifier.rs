use serde::Serialize;

/// Broad failure families recognised in database driver error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    AccessDenied,
    DnsFailure,
    ConnectionRefused,
    Timeout,
    TlsMismatch,
    Unknown,
}

impl FailureKind {
    pub const fn label(self) -> &'static str {
        match self {
            FailureKind::AccessDenied => "access_denied",
            FailureKind::DnsFailure => "dns_failure",
            FailureKind::ConnectionRefused => "connection_refused",
            FailureKind::Timeout => "timeout",
            FailureKind::TlsMismatch => "tls_mismatch",
            FailureKind::Unknown => "unknown",
        }
    }
}

/// Human-readable explanation of a connection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub kind: FailureKind,
    pub reason: &'static str,
    pub action: &'static str,
}

struct Rule {
    kind: FailureKind,
    needles: &'static [&'static str],
    reason: &'static str,
    action: &'static str,
}

// Evaluated top to bottom; the first rule with a matching needle wins.
const RULES: &[Rule] = &[
    Rule {
        kind: FailureKind::AccessDenied,
        needles: &["access denied", "er_access_denied_error", "authentication failed"],
        reason: "The database rejected the credentials or the connecting host.",
        action: "Verify DB_USER and DB_PASSWORD, and allowlist this server's egress IP for the database user.",
    },
    Rule {
        kind: FailureKind::DnsFailure,
        needles: &[
            "getaddrinfo",
            "enotfound",
            "failed to lookup address",
            "name or service not known",
            "no such host",
        ],
        reason: "The database host name could not be resolved.",
        action: "Check DB_HOST for typos and confirm the host is publicly resolvable.",
    },
    Rule {
        kind: FailureKind::ConnectionRefused,
        needles: &["econnrefused", "connection refused"],
        reason: "The database host refused the connection.",
        action: "Confirm the database is running and listening on DB_PORT, and that no firewall blocks it.",
    },
    Rule {
        kind: FailureKind::Timeout,
        needles: &["etimedout", "timed out", "timeout"],
        reason: "The connection attempt timed out.",
        action: "Allowlist this server's egress IP in the database firewall and check network reachability.",
    },
    Rule {
        kind: FailureKind::TlsMismatch,
        needles: &["ssl", "tls", "certificate", "handshake"],
        reason: "The TLS/SSL negotiation with the database failed.",
        action: "Align the server's SSL requirements with the client settings or provide the expected CA certificate.",
    },
];

const UNKNOWN: Diagnosis = Diagnosis {
    kind: FailureKind::Unknown,
    reason: "The database connection failed for an unrecognised reason.",
    action: "Inspect the raw error and the database server logs.",
};

/// Map a raw driver error to the first matching diagnosis.
pub fn classify(message: &str) -> Diagnosis {
    let normalized = message.to_lowercase();

    RULES
        .iter()
        .find(|rule| {
            rule.needles
                .iter()
                .any(|needle| contains_word(&normalized, needle))
        })
        .map(|rule| Diagnosis {
            kind: rule.kind,
            reason: rule.reason,
            action: rule.action,
        })
        .unwrap_or(UNKNOWN)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `needle` occurs in `haystack` without a word character directly on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}
