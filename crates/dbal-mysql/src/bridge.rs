//! Blocking facade over the async client.
//!
//! Every public driver call funnels through [`Blocking::wait`], which drives
//! one future to completion before returning. Each connection owns its own
//! current-thread runtime, so independent connections never share an
//! executor.
//!
//! Tokio will not nest `block_on` inside a thread that already carries a
//! runtime context (a `spawn_blocking` thread or an async task). There the
//! future is driven from a short-lived helper thread while the caller waits.

use dbal_core::{Error, Result};
use std::future::Future;
use std::panic;
use std::sync::Arc;
use std::thread;
use tokio::runtime::{Builder, Handle, Runtime};

/// Runs async client operations to completion, blocking the caller.
#[derive(Debug, Clone)]
pub struct Blocking {
    engine: Arc<Engine>,
}

/// Owner of the runtime. Present until dropped.
#[derive(Debug)]
struct Engine {
    runtime: Option<Runtime>,
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            if inside_runtime() {
                // Blocking shutdown is forbidden under a runtime context.
                runtime.shutdown_background();
                tracing::trace!("runtime shut down in background");
            }
        }
    }
}

impl Blocking {
    /// Start a dedicated current-thread runtime.
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name("dbal-mysql")
            .build()?;
        Ok(Self {
            engine: Arc::new(Engine {
                runtime: Some(runtime),
            }),
        })
    }

    /// Block until `fut` completes.
    pub fn wait<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
        T: Send,
    {
        self.drive(fut).unwrap_or_else(|| {
            Err(Error::Unsupported(
                "blocking runtime already shut down".to_string(),
            ))
        })
    }

    /// Block until `fut` completes, for teardown paths that cannot fail.
    pub fn wait_quietly<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send,
    {
        if self.drive(fut).is_none() {
            tracing::warn!("skipping teardown, blocking runtime already shut down");
        }
    }

    fn drive<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future + Send,
        F::Output: Send,
    {
        let runtime = self.engine.runtime.as_ref()?;
        if !inside_runtime() {
            return Some(runtime.block_on(fut));
        }

        tracing::trace!("driving future from a helper thread");
        thread::scope(|scope| {
            match scope.spawn(move || runtime.block_on(fut)).join() {
                Ok(output) => Some(output),
                Err(payload) => panic::resume_unwind(payload),
            }
        })
    }
}

fn inside_runtime() -> bool {
    Handle::try_current().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_drives_future_to_completion() {
        let bridge = Blocking::new().unwrap();
        let value = bridge
            .wait(async {
                tokio::task::yield_now().await;
                Ok(41 + 1)
            })
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn wait_propagates_errors() {
        let bridge = Blocking::new().unwrap();
        let err = bridge
            .wait(async { Err::<(), _>(Error::driver("boom", Some(1))) })
            .unwrap_err();
        assert_eq!(err.code(), Some(1));
    }

    #[test]
    fn clones_share_one_runtime() {
        let bridge = Blocking::new().unwrap();
        let other = bridge.clone();
        assert!(Arc::ptr_eq(&bridge.engine, &other.engine));
        other.wait_quietly(async {});
    }

    #[test]
    fn completes_under_an_async_task() {
        let outer = Builder::new_current_thread().build().unwrap();
        let bridge = Blocking::new().unwrap();
        let value = outer
            .block_on(async { bridge.wait(async { Ok(7) }) })
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn completes_on_a_spawn_blocking_thread() {
        let outer = Builder::new_current_thread().build().unwrap();
        let bridge = Blocking::new().unwrap();
        let value = outer
            .block_on(async {
                tokio::task::spawn_blocking(move || bridge.wait(async { Ok("done") })).await
            })
            .unwrap()
            .unwrap();
        assert_eq!(value, "done");
    }

    #[test]
    fn last_clone_can_drop_under_an_async_task() {
        let outer = Builder::new_current_thread().build().unwrap();
        let bridge = Blocking::new().unwrap();
        outer.block_on(async move {
            bridge.wait_quietly(async {});
            drop(bridge);
        });
    }

    #[test]
    fn panics_in_the_helper_thread_reach_the_caller() {
        let outer = Builder::new_current_thread().build().unwrap();
        let bridge = Blocking::new().unwrap();
        let caught = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            outer.block_on(async {
                bridge.wait_quietly(async {
                    if true {
                        panic!("inner failure");
                    }
                });
            });
        }));
        assert!(caught.is_err());
    }
}
