//! Browsing session lifecycle
//!
//! A suite owns exactly one isolated browsing context and one tab inside
//! it. [`SessionManager::scoped`] guarantees the context is closed when
//! the suite body returns, fails, or panics.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::driver::{Browser, BrowserContext, ContextOptions, Page};
use crate::error::{E2eError, E2eResult};

/// Handles to a suite's browsing context and its tab
#[derive(Clone)]
pub struct Session {
    context: Arc<dyn BrowserContext>,
    page: Arc<dyn Page>,
}

impl Session {
    pub fn context(&self) -> &Arc<dyn BrowserContext> {
        &self.context
    }

    pub fn page(&self) -> Arc<dyn Page> {
        self.page.clone()
    }

    pub fn id(&self) -> &str {
        self.context.id()
    }
}

pub struct SessionManager {
    options: ContextOptions,
}

impl SessionManager {
    pub fn new(options: ContextOptions) -> Self {
        Self { options }
    }

    /// Allocate an isolated context; any failure is fatal for the suite
    pub async fn create_context(&self, browser: &dyn Browser) -> E2eResult<Arc<dyn BrowserContext>> {
        let context = browser
            .new_context(&self.options)
            .await
            .map_err(|e| E2eError::SessionCreate(e.to_string()))?;
        debug!("Created browsing context {}", context.id());
        Ok(context)
    }

    pub async fn new_tab(&self, context: &Arc<dyn BrowserContext>) -> E2eResult<Arc<dyn Page>> {
        context
            .new_page()
            .await
            .map_err(|e| E2eError::SessionCreate(format!("new tab in {}: {}", context.id(), e)))
    }

    pub async fn close_context(&self, context: &Arc<dyn BrowserContext>) -> E2eResult<()> {
        debug!("Closing browsing context {}", context.id());
        context.close().await
    }

    /// Open a context and a tab, run `body`, then close the context
    /// whatever the outcome. A panic in `body` is resumed after cleanup.
    /// A failed close is logged; it never replaces what `body` returned.
    pub async fn scoped<F, Fut, T>(&self, browser: &dyn Browser, body: F) -> E2eResult<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = E2eResult<T>>,
    {
        let context = self.create_context(browser).await?;

        let page = match self.new_tab(&context).await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = self.close_context(&context).await {
                    warn!("Failed to close context {} after tab error: {}", context.id(), close_err);
                }
                return Err(e);
            }
        };

        let session = Session {
            context: context.clone(),
            page,
        };

        let outcome = AssertUnwindSafe(body(session)).catch_unwind().await;

        let closed = self.close_context(&context).await;

        match outcome {
            Err(panic) => {
                if let Err(e) = closed {
                    warn!("Failed to close context {} after panic: {}", context.id(), e);
                }
                std::panic::resume_unwind(panic)
            }
            Ok(result) => {
                match closed {
                    Ok(()) => info!("Browsing context {} closed", context.id()),
                    Err(e) => error!("Failed to close context {}: {}", context.id(), e),
                }
                result
            }
        }
    }
}
