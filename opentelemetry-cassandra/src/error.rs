use std::fmt;
use thiserror::Error;

/// Errors a Cassandra driver reports for a failed request.
///
/// The tracing hook accepts any `std::error::Error`; this enum exists so
/// drivers and tests share one rendering of server errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryError {
    /// The coordinator answered with an error frame.
    #[error("Error from server: code={code} [{}] message=\"{message}\"", .code.summary())]
    Server {
        /// Native protocol error code.
        code: ErrorCode,
        /// Message sent by the server.
        message: String,
    },

    /// No host in the query plan could be tried.
    #[error("Unable to connect to any servers")]
    NoHostAvailable,

    /// The client side timeout elapsed before a response arrived.
    #[error("Client request timeout")]
    OperationTimedOut,

    /// The connection to the coordinator failed.
    #[error("Connection error: {0}")]
    Connection(String),
}

impl QueryError {
    /// Build a server error from its code and message.
    pub fn server(code: ErrorCode, message: impl Into<String>) -> Self {
        QueryError::Server {
            code,
            message: message.into(),
        }
    }
}

/// Error codes of the CQL native protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// 0x0000
    ServerError,
    /// 0x000A
    ProtocolError,
    /// 0x0100
    BadCredentials,
    /// 0x1000
    Unavailable,
    /// 0x1001
    Overloaded,
    /// 0x1002
    IsBootstrapping,
    /// 0x1003
    TruncateError,
    /// 0x1100
    WriteTimeout,
    /// 0x1200
    ReadTimeout,
    /// 0x1300
    ReadFailure,
    /// 0x1400
    FunctionFailure,
    /// 0x1500
    WriteFailure,
    /// 0x2000
    SyntaxError,
    /// 0x2100
    Unauthorized,
    /// 0x2200
    Invalid,
    /// 0x2300
    ConfigError,
    /// 0x2400
    AlreadyExists,
    /// 0x2500
    Unprepared,
}

impl ErrorCode {
    /// The numeric protocol code.
    pub const fn code(&self) -> u16 {
        match self {
            ErrorCode::ServerError => 0x0000,
            ErrorCode::ProtocolError => 0x000A,
            ErrorCode::BadCredentials => 0x0100,
            ErrorCode::Unavailable => 0x1000,
            ErrorCode::Overloaded => 0x1001,
            ErrorCode::IsBootstrapping => 0x1002,
            ErrorCode::TruncateError => 0x1003,
            ErrorCode::WriteTimeout => 0x1100,
            ErrorCode::ReadTimeout => 0x1200,
            ErrorCode::ReadFailure => 0x1300,
            ErrorCode::FunctionFailure => 0x1400,
            ErrorCode::WriteFailure => 0x1500,
            ErrorCode::SyntaxError => 0x2000,
            ErrorCode::Unauthorized => 0x2100,
            ErrorCode::Invalid => 0x2200,
            ErrorCode::ConfigError => 0x2300,
            ErrorCode::AlreadyExists => 0x2400,
            ErrorCode::Unprepared => 0x2500,
        }
    }

    /// Look up a code received on the wire.
    pub const fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0x0000 => ErrorCode::ServerError,
            0x000A => ErrorCode::ProtocolError,
            0x0100 => ErrorCode::BadCredentials,
            0x1000 => ErrorCode::Unavailable,
            0x1001 => ErrorCode::Overloaded,
            0x1002 => ErrorCode::IsBootstrapping,
            0x1003 => ErrorCode::TruncateError,
            0x1100 => ErrorCode::WriteTimeout,
            0x1200 => ErrorCode::ReadTimeout,
            0x1300 => ErrorCode::ReadFailure,
            0x1400 => ErrorCode::FunctionFailure,
            0x1500 => ErrorCode::WriteFailure,
            0x2000 => ErrorCode::SyntaxError,
            0x2100 => ErrorCode::Unauthorized,
            0x2200 => ErrorCode::Invalid,
            0x2300 => ErrorCode::ConfigError,
            0x2400 => ErrorCode::AlreadyExists,
            0x2500 => ErrorCode::Unprepared,
            _ => return None,
        })
    }

    /// Human readable summary used when rendering server errors.
    pub const fn summary(&self) -> &'static str {
        match self {
            ErrorCode::ServerError => "Server error",
            ErrorCode::ProtocolError => "Protocol error",
            ErrorCode::BadCredentials => "Bad credentials",
            ErrorCode::Unavailable => "Unavailable exception",
            ErrorCode::Overloaded => "Overloaded",
            ErrorCode::IsBootstrapping => "Is bootstrapping",
            ErrorCode::TruncateError => "Truncate error",
            ErrorCode::WriteTimeout => "Coordinator node timed out waiting for replica nodes' responses",
            ErrorCode::ReadTimeout => "Coordinator node timed out waiting for replica nodes' responses",
            ErrorCode::ReadFailure => "Replica(s) failed to execute read",
            ErrorCode::FunctionFailure => "User Defined Function failure",
            ErrorCode::WriteFailure => "Replica(s) failed to execute write",
            ErrorCode::SyntaxError => "Syntax error in CQL query",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::Invalid => "Invalid query",
            ErrorCode::ConfigError => "Query invalid because of configuration issue",
            ErrorCode::AlreadyExists => "Already exists",
            ErrorCode::Unprepared => "Unprepared",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.code())
    }
}
