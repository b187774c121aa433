// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatch: request → handler → correlated response.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use mahmock_core::{CommandHandler, MahError};

use crate::protocol::{Request, Response};

/// Command name → handler table, fixed once the gateway starts.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands: Vec<&str> = self.commands().collect();
        commands.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("commands", &commands)
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `command` to `handler`, replacing any earlier binding.
    pub fn register(
        &mut self,
        command: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> &mut Self {
        let command = command.into();
        if self
            .handlers
            .insert(command.clone(), Arc::new(handler))
            .is_some()
        {
            tracing::warn!(%command, "command handler replaced");
        }
        self
    }

    /// Builder-style [`Dispatcher::register`].
    pub fn with_handler(
        mut self,
        command: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        self.register(command, handler);
        self
    }

    pub fn contains(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Run the handler for `request`.
    ///
    /// `Ok(None)` means the command is unmapped and nothing should be sent.
    /// Handler failures come back as `Err` so the caller can log them.
    pub async fn dispatch(&self, request: Request) -> Result<Option<Response>, MahError> {
        let Some(handler) = self.handlers.get(&request.command) else {
            tracing::debug!(command = %request.command, sync_id = %request.sync_id, "unmapped command dropped");
            return Ok(None);
        };

        let Request {
            sync_id,
            command,
            content,
            ..
        } = request;

        let data = handler
            .handle(Value::Object(content))
            .await
            .map_err(|err| match err {
                MahError::Handler { .. } => err,
                other => MahError::handler(&command, other.to_string()),
            })?;

        Ok(Some(Response::new(sync_id, data)))
    }
}
