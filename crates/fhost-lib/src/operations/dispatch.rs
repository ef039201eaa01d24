//! Sequential command dispatch against a single [`FileStore`].

use std::fmt;

use log::{debug, warn};
use thiserror::Error;

use crate::store::{FileStore, StoreError};

use super::command::{Command, CommandError};

/// What a command hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Void result, or a lookup that found nothing
    None,
    /// File size from `file_get` / `file_get_at`
    Size(u64),
    /// Ordered names from `file_search` / `file_search_at`
    Names(Vec<String>),
}

impl From<Option<u64>> for Output {
    fn from(size: Option<u64>) -> Self {
        size.map_or(Output::None, Output::Size)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::None => write!(f, "null"),
            Output::Size(size) => write!(f, "{}", size),
            Output::Names(names) => {
                write!(f, "[")?;
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", name)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("command #{index}: {source}")]
    Parse {
        index: usize,
        #[source]
        source: CommandError,
    },

    #[error("command #{index} ({command}): {source}")]
    Store {
        index: usize,
        command: String,
        #[source]
        source: StoreError,
    },
}

impl DispatchError {
    /// Zero-based position of the failing command.
    pub fn index(&self) -> usize {
        match self {
            DispatchError::Parse { index, .. } | DispatchError::Store { index, .. } => *index,
        }
    }
}

/// Runs commands in order against an owned store and collects their outputs.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: FileStore,
    stop_on_error: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(FileStore::new())
    }
}

impl Dispatcher {
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            stop_on_error: true,
        }
    }

    /// When disabled, a failing command yields [`Output::None`] and the run continues.
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn into_store(self) -> FileStore {
        self.store
    }

    /// Execute one command.
    pub fn execute(&mut self, command: &Command) -> Result<Output, StoreError> {
        let store = &mut self.store;
        let output = match command {
            Command::FileUpload { name, size } => {
                store.upload(name, *size)?;
                Output::None
            }
            Command::FileGet { name } => store.get(name).into(),
            Command::FileCopy { source, dest } => {
                store.copy(source, dest)?;
                Output::None
            }
            Command::FileSearch { prefix } => Output::Names(store.search(prefix)),
            Command::FileUploadAt {
                timestamp,
                name,
                size,
                ttl,
            } => {
                store.upload_at(timestamp, name, *size, *ttl)?;
                Output::None
            }
            Command::FileGetAt { timestamp, name } => store.get_at(timestamp, name)?.into(),
            Command::FileCopyAt {
                timestamp,
                source,
                dest,
            } => {
                store.copy_at(timestamp, source, dest)?;
                Output::None
            }
            Command::FileSearchAt { timestamp, prefix } => {
                Output::Names(store.search_at(timestamp, prefix)?)
            }
            Command::Rollback { timestamp } => {
                store.rollback(timestamp)?;
                Output::None
            }
        };
        debug!("{} -> {}", command, output);
        Ok(output)
    }

    /// Parse and execute raw commands in order, one output per command.
    pub fn run<S: AsRef<str>>(
        &mut self,
        commands: &[Vec<S>],
    ) -> Result<Vec<Output>, DispatchError> {
        let mut outputs = Vec::with_capacity(commands.len());

        for (index, raw) in commands.iter().enumerate() {
            let result = Command::parse(raw)
                .map_err(|source| DispatchError::Parse { index, source })
                .and_then(|command| {
                    self.execute(&command)
                        .map_err(|source| DispatchError::Store {
                            index,
                            command: command.to_string(),
                            source,
                        })
                });

            match result {
                Ok(output) => outputs.push(output),
                Err(e) if self.stop_on_error => return Err(e),
                Err(e) => {
                    warn!("{}", e);
                    outputs.push(Output::None);
                }
            }
        }

        Ok(outputs)
    }
}

/// Run `commands` against a fresh store, stopping at the first failure.
pub fn simulate<S: AsRef<str>>(commands: &[Vec<S>]) -> Result<Vec<Output>, DispatchError> {
    Dispatcher::default().run(commands)
}
