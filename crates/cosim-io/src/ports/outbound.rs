//! # Outbound Port - Remote Functions
//!
//! Callbacks a controlled solver registers so its partner can drive it
//! through `run`. A callback receives the `settings` sent with the control
//! signal and returns an `Info`.

use async_trait::async_trait;
use cosim_types::{Info, Result};
use std::future::Future;

/// A function callable by name from the connected partner.
#[async_trait]
pub trait RemoteFunction: Send + Sync {
    async fn invoke(&self, input: Info) -> Result<Info>;
}

/// Plain closures, e.g. `|info| Ok(info)`.
#[async_trait]
impl<F> RemoteFunction for F
where
    F: Fn(Info) -> Result<Info> + Send + Sync,
{
    async fn invoke(&self, input: Info) -> Result<Info> {
        self(input)
    }
}

/// Wraps a closure returning a future, for callbacks that exchange data
/// with the partner themselves.
///
/// ```rust,ignore
/// let handle = io.clone();
/// io.register(&info, Arc::new(AsyncFunction(move |settings: Info| {
///     let io = handle.clone();
///     async move {
///         let mut values = Vector::new();
///         io.import_data(&settings.with("identifier", "load"), &mut values).await
///     }
/// })))?;
/// ```
pub struct AsyncFunction<F>(pub F);

#[async_trait]
impl<F, Fut> RemoteFunction for AsyncFunction<F>
where
    F: Fn(Info) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Info>> + Send + 'static,
{
    async fn invoke(&self, input: Info) -> Result<Info> {
        (self.0)(input).await
    }
}
