use std::fmt;

#[derive(Debug)]
pub enum Error {
    Mqtt(paho_mqtt::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
    Join(tokio::task::JoinError),
    AddrParse(std::net::AddrParseError),
    FanControl(fan_control::Error),
    MissingVar(&'static str),
    InvalidVar(&'static str, String),
    UnknownTopic(String),
    SessionEnded,
}

impl From<paho_mqtt::Error> for Error {
    fn from(err: paho_mqtt::Error) -> Self {
        Self::Mqtt(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err)
    }
}

impl From<std::net::AddrParseError> for Error {
    fn from(err: std::net::AddrParseError) -> Self {
        Self::AddrParse(err)
    }
}

impl From<fan_control::Error> for Error {
    fn from(err: fan_control::Error) -> Self {
        Self::FanControl(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mqtt(err) => write!(f, "mqtt error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Join(err) => write!(f, "join error: {err}"),
            Self::AddrParse(err) => write!(f, "address error: {err}"),
            Self::FanControl(err) => write!(f, "{err}"),
            Self::MissingVar(name) => write!(f, "set ENV variable {name}"),
            Self::InvalidVar(name, reason) => write!(f, "invalid ENV variable {name}: {reason}"),
            Self::UnknownTopic(topic) => write!(f, "unknown topic {topic}"),
            Self::SessionEnded => write!(f, "session has ended"),
        }
    }
}

impl std::error::Error for Error {}
