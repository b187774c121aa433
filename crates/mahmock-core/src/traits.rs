// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handler trait for protocol commands.
//!
//! The gateway does not know any command semantics. Each command string
//! (`sendGroupMessage`, `about`, ...) is bound to a [`CommandHandler`]
//! supplied at construction time.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MahError;

/// Asynchronous handler for one protocol command.
///
/// Receives the request `content` mapping (including `sessionKey`) and
/// returns the `data` payload of the response.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, content: Value) -> Result<Value, MahError>;
}

/// Adapter turning an async closure into a [`CommandHandler`].
pub struct FnHandler<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

/// Wrap an async closure as a [`CommandHandler`].
///
/// ```
/// use mahmock_core::traits::{handler_fn, CommandHandler};
/// use mahmock_core::MahError;
///
/// let about = handler_fn(|_content| async {
///     Ok::<_, MahError>(serde_json::json!({"code": 0, "data": {"version": "mock"}}))
/// });
/// # let _ = &about as &dyn CommandHandler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, MahError>> + Send,
{
    FnHandler {
        f,
        _fut: PhantomData,
    }
}

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, MahError>> + Send,
{
    async fn handle(&self, content: Value) -> Result<Value, MahError> {
        (self.f)(content).await
    }
}
