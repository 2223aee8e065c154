//! Command registry: the vocabulary of named commands an executor accepts.

use std::collections::HashMap;

use crate::command::{CommandInfo, HttpVerb};
use crate::error::RemoteError;

/// Names of the base commands every executor knows.
pub mod names {
    pub const NEW_SESSION: &str = "newSession";
    pub const STATUS: &str = "status";
    pub const QUIT: &str = "quit";
    pub const FIND_ELEMENT: &str = "findElement";
    pub const FIND_CHILD_ELEMENT: &str = "findChildElement";
}

/// The minimal base command set needed to open, use and close a session.
pub const BASE_COMMANDS: &[(&str, CommandInfo)] = &[
    (names::NEW_SESSION, CommandInfo::new(HttpVerb::Post, "/session")),
    (names::STATUS, CommandInfo::new(HttpVerb::Get, "/status")),
    (names::QUIT, CommandInfo::new(HttpVerb::Delete, "/session/{sessionId}")),
    (
        names::FIND_ELEMENT,
        CommandInfo::new(HttpVerb::Post, "/session/{sessionId}/element"),
    ),
    (
        names::FIND_CHILD_ELEMENT,
        CommandInfo::new(HttpVerb::Post, "/session/{sessionId}/element/{id}/element"),
    ),
];

/// Mapping from command name to its wire description.
///
/// Names are unique: adding a name that is already present fails instead of
/// overwriting the existing entry.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandInfo>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with [`BASE_COMMANDS`].
    pub fn with_base_commands() -> Self {
        let mut registry = Self::new();
        for (name, info) in BASE_COMMANDS {
            registry
                .commands
                .insert((*name).to_string(), info.clone());
        }
        registry
    }

    /// Add a single command. Fails with [`RemoteError::DuplicateCommand`]
    /// if the name is taken.
    pub fn try_add(&mut self, name: &str, info: CommandInfo) -> Result<(), RemoteError> {
        if self.commands.contains_key(name) {
            return Err(RemoteError::DuplicateCommand(name.to_string()));
        }
        self.commands.insert(name.to_string(), info);
        Ok(())
    }

    /// Add a batch of commands, all or nothing.
    ///
    /// Every name is checked against the registry and against the rest of
    /// the batch before anything is inserted, so a collision leaves the
    /// registry exactly as it was.
    pub fn try_add_all(&mut self, commands: &[(&str, CommandInfo)]) -> Result<(), RemoteError> {
        let mut seen = std::collections::HashSet::with_capacity(commands.len());
        for (name, _) in commands {
            if self.commands.contains_key(*name) || !seen.insert(*name) {
                return Err(RemoteError::DuplicateCommand((*name).to_string()));
            }
        }
        for (name, info) in commands {
            self.commands.insert((*name).to_string(), info.clone());
        }
        Ok(())
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&CommandInfo> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
