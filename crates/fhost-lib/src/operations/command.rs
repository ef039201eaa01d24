//! Typed commands for driving a [`FileStore`](crate::store::FileStore).
//!
//! A raw command is a list of strings: the operation name followed by its
//! positional arguments. [`Command::parse`] turns that into a [`Command`]
//! variant, checking arity and numeric arguments up front so dispatch never
//! has to.
//!
//! # Example
//!
//! ```
//! use fhost_lib::operations::Command;
//!
//! let cmd = Command::parse(&["FILE_UPLOAD_AT", "2023-01-01T00:00:00", "a.txt", "10", "60"]).unwrap();
//! assert_eq!(
//!     cmd,
//!     Command::FileUploadAt {
//!         timestamp: "2023-01-01T00:00:00".to_string(),
//!         name: "a.txt".to_string(),
//!         size: 10,
//!         ttl: Some(60.0),
//!     }
//! );
//! ```

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{op} expects {expected} argument(s), got {got}")]
    Arity {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("invalid {field} for {op}: {value:?}")]
    InvalidNumber {
        op: &'static str,
        field: &'static str,
        value: String,
    },
}

/// One store operation with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FileUpload {
        name: String,
        size: u64,
    },
    FileGet {
        name: String,
    },
    FileCopy {
        source: String,
        dest: String,
    },
    FileSearch {
        prefix: String,
    },
    FileUploadAt {
        timestamp: String,
        name: String,
        size: u64,
        /// Seconds until expiry
        ttl: Option<f64>,
    },
    FileGetAt {
        timestamp: String,
        name: String,
    },
    FileCopyAt {
        timestamp: String,
        source: String,
        dest: String,
    },
    FileSearchAt {
        timestamp: String,
        prefix: String,
    },
    Rollback {
        timestamp: String,
    },
}

impl Command {
    /// Parse a raw command. The operation name is matched case-insensitively.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, CommandError> {
        let (op, args) = raw.split_first().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let op = op.as_ref().trim().to_ascii_lowercase();

        let cmd = match op.as_str() {
            "file_upload" => {
                let [name, size] = exact::<2>("file_upload", &args)?;
                Command::FileUpload {
                    name: name.to_string(),
                    size: parse_size("file_upload", size)?,
                }
            }
            "file_get" => {
                let [name] = exact::<1>("file_get", &args)?;
                Command::FileGet {
                    name: name.to_string(),
                }
            }
            "file_copy" => {
                let [source, dest] = exact::<2>("file_copy", &args)?;
                Command::FileCopy {
                    source: source.to_string(),
                    dest: dest.to_string(),
                }
            }
            "file_search" => {
                let [prefix] = exact::<1>("file_search", &args)?;
                Command::FileSearch {
                    prefix: prefix.to_string(),
                }
            }
            "file_upload_at" => {
                let (timestamp, name, size, ttl) = match args.as_slice() {
                    [timestamp, name, size] => (timestamp, name, size, None),
                    [timestamp, name, size, ttl] => (timestamp, name, size, Some(ttl)),
                    _ => {
                        return Err(CommandError::Arity {
                            op: "file_upload_at",
                            expected: "3 or 4",
                            got: args.len(),
                        })
                    }
                };
                Command::FileUploadAt {
                    timestamp: timestamp.to_string(),
                    name: name.to_string(),
                    size: parse_size("file_upload_at", size)?,
                    ttl: ttl.map(|ttl| parse_ttl("file_upload_at", ttl)).transpose()?,
                }
            }
            "file_get_at" => {
                let [timestamp, name] = exact::<2>("file_get_at", &args)?;
                Command::FileGetAt {
                    timestamp: timestamp.to_string(),
                    name: name.to_string(),
                }
            }
            "file_copy_at" => {
                let [timestamp, source, dest] = exact::<3>("file_copy_at", &args)?;
                Command::FileCopyAt {
                    timestamp: timestamp.to_string(),
                    source: source.to_string(),
                    dest: dest.to_string(),
                }
            }
            "file_search_at" => {
                let [timestamp, prefix] = exact::<2>("file_search_at", &args)?;
                Command::FileSearchAt {
                    timestamp: timestamp.to_string(),
                    prefix: prefix.to_string(),
                }
            }
            "rollback" => {
                let [timestamp] = exact::<1>("rollback", &args)?;
                Command::Rollback {
                    timestamp: timestamp.to_string(),
                }
            }
            _ => return Err(CommandError::UnknownOperation(op.clone())),
        };

        Ok(cmd)
    }

    /// Canonical lowercase operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::FileUpload { .. } => "file_upload",
            Command::FileGet { .. } => "file_get",
            Command::FileCopy { .. } => "file_copy",
            Command::FileSearch { .. } => "file_search",
            Command::FileUploadAt { .. } => "file_upload_at",
            Command::FileGetAt { .. } => "file_get_at",
            Command::FileCopyAt { .. } => "file_copy_at",
            Command::FileSearchAt { .. } => "file_search_at",
            Command::Rollback { .. } => "rollback",
        }
    }

    /// Whether running this command can append to the store history.
    pub fn is_versioned(&self) -> bool {
        matches!(
            self,
            Command::FileUploadAt { .. } | Command::FileCopyAt { .. }
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_ascii_uppercase())?;
        match self {
            Command::FileUpload { name, size } => write!(f, " {} {}", name, size),
            Command::FileGet { name } => write!(f, " {}", name),
            Command::FileCopy { source, dest } => write!(f, " {} {}", source, dest),
            Command::FileSearch { prefix } => write!(f, " {:?}", prefix),
            Command::FileUploadAt {
                timestamp,
                name,
                size,
                ttl,
            } => {
                write!(f, " {} {} {}", timestamp, name, size)?;
                match ttl {
                    Some(ttl) => write!(f, " {}", ttl),
                    None => Ok(()),
                }
            }
            Command::FileGetAt { timestamp, name } => write!(f, " {} {}", timestamp, name),
            Command::FileCopyAt {
                timestamp,
                source,
                dest,
            } => write!(f, " {} {} {}", timestamp, source, dest),
            Command::FileSearchAt { timestamp, prefix } => {
                write!(f, " {} {:?}", timestamp, prefix)
            }
            Command::Rollback { timestamp } => write!(f, " {}", timestamp),
        }
    }
}

fn exact<'a, const N: usize>(
    op: &'static str,
    args: &[&'a str],
) -> Result<[&'a str; N], CommandError> {
    <[&str; N]>::try_from(args).map_err(|_| CommandError::Arity {
        op,
        expected: arity_label(N),
        got: args.len(),
    })
}

fn arity_label(n: usize) -> &'static str {
    match n {
        1 => "1",
        2 => "2",
        3 => "3",
        _ => "more",
    }
}

fn parse_size(op: &'static str, value: &str) -> Result<u64, CommandError> {
    value.trim().parse().map_err(|_| CommandError::InvalidNumber {
        op,
        field: "size",
        value: value.to_string(),
    })
}

fn parse_ttl(op: &'static str, value: &str) -> Result<f64, CommandError> {
    value.trim().parse().map_err(|_| CommandError::InvalidNumber {
        op,
        field: "ttl",
        value: value.to_string(),
    })
}
