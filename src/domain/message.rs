use crate::domain::Fingerprint;
use std::fmt;
use thiserror::Error;

/// Separates the sender identity from the payload.
pub const SEPARATOR: &str = "-";
/// Separates a file message kind from the filename.
pub const FILE_SEPARATOR: &str = " = ";

const PING: &str = "flocon: PING";
const PONG: &str = "flocon: PONG";
const DISCONNECT: &str = "flocon: DISCONNECT";
const HAS: &str = "flocon: HAS";
const YES: &str = "flocon: YES";
const NO: &str = "flocon: NO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Ping,
    Pong,
    Disconnect,
    Has(String),
    Yes(String),
    No(String),
}

impl Message {
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Has(name) | Self::Yes(name) | Self::No(name) => Some(name),
            Self::Ping | Self::Pong | Self::Disconnect => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Ping => PING,
            Self::Pong => PONG,
            Self::Disconnect => DISCONNECT,
            Self::Has(_) => HAS,
            Self::Yes(_) => YES,
            Self::No(_) => NO,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.filename() {
            Some(name) => write!(f, "{}{FILE_SEPARATOR}{name}", self.kind()),
            None => f.write_str(self.kind()),
        }
    }
}

/// A decoded multicast datagram: who sent it and what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub sender: Fingerprint,
    pub message: Message,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("datagram is not valid UTF-8")]
    InvalidUtf8,
    #[error("malformed message: missing identity separator")]
    Malformed,
    #[error("malformed file message: expected `<kind> = <filename>`")]
    MalformedFileMessage,
    #[error("unknown message kind `{0}`")]
    UnknownKind(String),
}

impl Datagram {
    pub fn new(sender: Fingerprint, message: Message) -> Self {
        Self { sender, message }
    }

    pub fn encode(&self) -> Vec<u8> {
        format!("{}{SEPARATOR}{}", self.sender, self.message).into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8)?;

        let (sender, payload) = text
            .split_once(SEPARATOR)
            .filter(|(sender, _)| !sender.is_empty())
            .ok_or(ProtocolError::Malformed)?;

        let message = match payload {
            PING => Message::Ping,
            PONG => Message::Pong,
            DISCONNECT => Message::Disconnect,
            _ => decode_file_message(payload)?,
        };

        Ok(Self::new(sender.into(), message))
    }
}

fn decode_file_message(payload: &str) -> Result<Message, ProtocolError> {
    let mut parts = payload.split(FILE_SEPARATOR);

    let (Some(kind), Some(filename), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ProtocolError::MalformedFileMessage);
    };

    if filename.is_empty() {
        return Err(ProtocolError::MalformedFileMessage);
    }

    let filename = filename.to_string();
    match kind {
        HAS => Ok(Message::Has(filename)),
        YES => Ok(Message::Yes(filename)),
        NO => Ok(Message::No(filename)),
        other => Err(ProtocolError::UnknownKind(other.to_string())),
    }
}
