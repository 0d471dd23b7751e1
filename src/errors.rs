use std::fmt;

#[derive(Debug, Clone)]
pub enum LogUtilError {
    Io(String),
    Descriptor(String),
    InvalidLevel(String),
    Appender(String),
    Reload(String),
    Sink(String),
    NotInitialized(String),
    AlreadyInitialized(String),
    InvalidFormat(String),
}

impl LogUtilError {
    /// Stable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            LogUtilError::Io(_) => "E001",
            LogUtilError::Descriptor(_) => "E002",
            LogUtilError::InvalidLevel(_) => "E003",
            LogUtilError::Appender(_) => "E004",
            LogUtilError::Reload(_) => "E005",
            LogUtilError::Sink(_) => "E006",
            LogUtilError::NotInitialized(_) => "E007",
            LogUtilError::AlreadyInitialized(_) => "E008",
            LogUtilError::InvalidFormat(_) => "E009",
        }
    }

    /// Human-readable name of the error kind
    pub fn error_type(&self) -> &'static str {
        match self {
            LogUtilError::Io(_) => "I/O Error",
            LogUtilError::Descriptor(_) => "Configuration Descriptor Error",
            LogUtilError::InvalidLevel(_) => "Invalid Log Level",
            LogUtilError::Appender(_) => "Appender Error",
            LogUtilError::Reload(_) => "Logger Update Error",
            LogUtilError::Sink(_) => "Report Sink Error",
            LogUtilError::NotInitialized(_) => "Logging Not Initialized",
            LogUtilError::AlreadyInitialized(_) => "Logging Already Initialized",
            LogUtilError::InvalidFormat(_) => "Invalid Log Format",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LogUtilError::Io(msg) => msg,
            LogUtilError::Descriptor(msg) => msg,
            LogUtilError::InvalidLevel(msg) => msg,
            LogUtilError::Appender(msg) => msg,
            LogUtilError::Reload(msg) => msg,
            LogUtilError::Sink(msg) => msg,
            LogUtilError::NotInitialized(msg) => msg,
            LogUtilError::AlreadyInitialized(msg) => msg,
            LogUtilError::InvalidFormat(msg) => msg,
        }
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// Same as [`LogUtilError::format_simple`], prefixed with the code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code(), self.format_simple())
    }
}

impl fmt::Display for LogUtilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LogUtilError {}

// Constructors
impl LogUtilError {
    pub fn io<T: Into<String>>(msg: T) -> Self {
        LogUtilError::Io(msg.into())
    }

    pub fn descriptor<T: Into<String>>(msg: T) -> Self {
        LogUtilError::Descriptor(msg.into())
    }

    pub fn invalid_level<T: Into<String>>(msg: T) -> Self {
        LogUtilError::InvalidLevel(msg.into())
    }

    pub fn appender<T: Into<String>>(msg: T) -> Self {
        LogUtilError::Appender(msg.into())
    }

    pub fn reload<T: Into<String>>(msg: T) -> Self {
        LogUtilError::Reload(msg.into())
    }

    pub fn sink<T: Into<String>>(msg: T) -> Self {
        LogUtilError::Sink(msg.into())
    }

    pub fn not_initialized<T: Into<String>>(msg: T) -> Self {
        LogUtilError::NotInitialized(msg.into())
    }

    pub fn already_initialized<T: Into<String>>(msg: T) -> Self {
        LogUtilError::AlreadyInitialized(msg.into())
    }

    pub fn invalid_format<T: Into<String>>(msg: T) -> Self {
        LogUtilError::InvalidFormat(msg.into())
    }
}

// Conversions from the errors of the crates we call into
impl From<std::io::Error> for LogUtilError {
    fn from(err: std::io::Error) -> Self {
        LogUtilError::Io(err.to_string())
    }
}

impl From<quick_xml::DeError> for LogUtilError {
    fn from(err: quick_xml::DeError) -> Self {
        LogUtilError::Descriptor(err.to_string())
    }
}

impl From<tracing_subscriber::reload::Error> for LogUtilError {
    fn from(err: tracing_subscriber::reload::Error) -> Self {
        LogUtilError::Reload(err.to_string())
    }
}

impl From<tracing_appender::rolling::InitError> for LogUtilError {
    fn from(err: tracing_appender::rolling::InitError) -> Self {
        LogUtilError::Appender(err.to_string())
    }
}

impl From<tracing::dispatcher::SetGlobalDefaultError> for LogUtilError {
    fn from(err: tracing::dispatcher::SetGlobalDefaultError) -> Self {
        LogUtilError::AlreadyInitialized(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LogUtilError>;
