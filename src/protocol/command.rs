//! Command definitions
//!
//! A [`Request`] is the raw argument list read off the wire. A [`Command`]
//! is a request that passed name and arity checks.

use bytes::Bytes;

use crate::error::{EmberError, Result};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Set,
    Del,
    Flush,
    MSet,
}

impl CommandType {
    /// Case-insensitive lookup of a command name
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name.to_ascii_uppercase().as_slice() {
            b"GET" => Some(CommandType::Get),
            b"SET" => Some(CommandType::Set),
            b"DEL" => Some(CommandType::Del),
            b"FLUSH" => Some(CommandType::Flush),
            b"MSET" => Some(CommandType::MSet),
            _ => None,
        }
    }

    /// Canonical (upper-case) name
    pub fn name(&self) -> &'static str {
        match self {
            CommandType::Get => "GET",
            CommandType::Set => "SET",
            CommandType::Del => "DEL",
            CommandType::Flush => "FLUSH",
            CommandType::MSet => "MSET",
        }
    }
}

/// A raw request: the command name followed by its operands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    pub args: Vec<Bytes>,
}

impl Request {
    pub fn new(args: Vec<Bytes>) -> Self {
        Self { args }
    }

    /// Build a request from anything byte-like
    pub fn from_args<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        Self {
            args: args
                .into_iter()
                .map(|a| Bytes::copy_from_slice(a.as_ref()))
                .collect(),
        }
    }

    /// The command name, if any
    pub fn name(&self) -> Option<&[u8]> {
        self.args.first().map(|a| a.as_ref())
    }

    /// Operands after the command name
    pub fn operands(&self) -> &[Bytes] {
        self.args.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: String },

    /// Set a key-value pair
    Set { key: String, value: Bytes },

    /// Delete a key
    Del { key: String },

    /// Remove every key
    Flush,

    /// Set many key-value pairs at once
    MSet { pairs: Vec<(String, Bytes)> },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Del { .. } => CommandType::Del,
            Command::Flush => CommandType::Flush,
            Command::MSet { .. } => CommandType::MSet,
        }
    }

    /// Validate a request's name and arity
    pub fn parse(request: &Request) -> Result<Command> {
        let name = request
            .name()
            .ok_or_else(|| EmberError::Arity("missing command".to_string()))?;

        let command_type = CommandType::from_name(name).ok_or_else(|| {
            EmberError::UnknownCommand(String::from_utf8_lossy(name).into_owned())
        })?;

        let operands = request.operands();
        let arity_ok = match command_type {
            CommandType::Get | CommandType::Del => operands.len() == 1,
            CommandType::Set => operands.len() == 2,
            CommandType::Flush => operands.is_empty(),
            CommandType::MSet => !operands.is_empty() && operands.len() % 2 == 0,
        };
        if !arity_ok {
            return Err(EmberError::Arity(format!(
                "wrong number of arguments for '{}' command",
                command_type.name()
            )));
        }

        let command = match command_type {
            CommandType::Get => Command::Get {
                key: parse_key(&operands[0])?,
            },
            CommandType::Set => Command::Set {
                key: parse_key(&operands[0])?,
                value: operands[1].clone(),
            },
            CommandType::Del => Command::Del {
                key: parse_key(&operands[0])?,
            },
            CommandType::Flush => Command::Flush,
            CommandType::MSet => Command::MSet {
                pairs: operands
                    .chunks_exact(2)
                    .map(|pair| -> Result<(String, Bytes)> {
                        Ok((parse_key(&pair[0])?, pair[1].clone()))
                    })
                    .collect::<Result<Vec<_>>>()?,
            },
        };

        Ok(command)
    }

    /// Turn the command back into a wire request
    pub fn to_request(&self) -> Request {
        let name = Bytes::from_static(self.command_type().name().as_bytes());
        let mut args = vec![name];

        match self {
            Command::Get { key } | Command::Del { key } => {
                args.push(Bytes::copy_from_slice(key.as_bytes()));
            }
            Command::Set { key, value } => {
                args.push(Bytes::copy_from_slice(key.as_bytes()));
                args.push(value.clone());
            }
            Command::Flush => {}
            Command::MSet { pairs } => {
                for (key, value) in pairs {
                    args.push(Bytes::copy_from_slice(key.as_bytes()));
                    args.push(value.clone());
                }
            }
        }

        Request::new(args)
    }
}

/// Keys are non-empty UTF-8 strings
fn parse_key(raw: &Bytes) -> Result<String> {
    if raw.is_empty() {
        return Err(EmberError::InvalidKey("empty key".to_string()));
    }
    String::from_utf8(raw.to_vec())
        .map_err(|_| EmberError::InvalidKey("key is not valid UTF-8".to_string()))
}
