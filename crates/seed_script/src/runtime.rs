//! Script runtime management
//!
//! One QuickJS runtime per evaluator, owned by a dedicated worker thread.
//! QuickJS parses and evaluates recursively, so deeply nested `create()`
//! calls need a deep native stack; the worker gets one of `stack_size`
//! bytes and QuickJS is allowed to use all of it but a small reserve.
//!
//! Every script runs in a fresh context so globals never leak from one
//! script into the next. The caller's tracing span is carried into the
//! worker so its logs nest under the build that asked for them.

use rquickjs::{CatchResultExt, Context, Runtime, Value};
use std::panic::AssertUnwindSafe;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

const PRELUDE: &str = include_str!("prelude.js");

/// Default native stack of the script worker.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Stack kept back from QuickJS for the worker's own frames.
const STACK_RESERVE: usize = 512 * 1024;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("cannot spawn script worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("cannot create QuickJS runtime: {0}")]
    Start(String),

    #[error("stack size of {0} bytes leaves no room for scripts")]
    StackTooSmall(usize),
}

struct Job {
    source: String,
    span: tracing::Span,
    reply: mpsc::Sender<Result<String, String>>,
}

/// QuickJS runtime hosting the entity definition DSL.
pub struct ScriptRuntime {
    jobs: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl ScriptRuntime {
    pub fn new() -> Result<Self, RuntimeError> {
        Self::with_stack_size(DEFAULT_STACK_SIZE)
    }

    /// Start the worker with `stack_size` bytes of native stack.
    pub fn with_stack_size(stack_size: usize) -> Result<Self, RuntimeError> {
        if stack_size <= STACK_RESERVE {
            return Err(RuntimeError::StackTooSmall(stack_size));
        }

        let (jobs, queue) = mpsc::channel::<Job>();
        let (ready_tx, ready) = mpsc::channel::<Result<(), String>>();

        let worker = thread::Builder::new()
            .name("seed-script".into())
            .stack_size(stack_size)
            .spawn(move || {
                let runtime = match Runtime::new() {
                    Ok(runtime) => runtime,
                    Err(error) => {
                        let _ = ready_tx.send(Err(error.to_string()));
                        return;
                    }
                };
                runtime.set_max_stack_size(stack_size - STACK_RESERVE);
                let _ = ready_tx.send(Ok(()));

                while let Ok(job) = queue.recv() {
                    let _guard = job.span.enter();
                    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                        export(&runtime, &job.source)
                    }));
                    match result {
                        Ok(exported) => {
                            let _ = job.reply.send(exported);
                        }
                        Err(_) => {
                            let _ = job
                                .reply
                                .send(Err("script worker panicked during evaluation".to_string()));
                            break;
                        }
                    }
                }
            })
            .map_err(RuntimeError::Spawn)?;

        match ready.recv() {
            Ok(Ok(())) => Ok(Self {
                jobs: Some(jobs),
                worker: Some(worker),
            }),
            Ok(Err(message)) => {
                let _ = worker.join();
                Err(RuntimeError::Start(message))
            }
            Err(_) => {
                let _ = worker.join();
                Err(RuntimeError::Start("script worker exited during startup".to_string()))
            }
        }
    }

    /// Run `source` with the DSL installed and return every definition it
    /// declared, serialized as JSON.
    ///
    /// Errors are rendered messages including the JS stack when available.
    pub fn export_definitions(&self, source: &str) -> Result<String, String> {
        let stopped = || "script worker is not running".to_string();
        let jobs = self.jobs.as_ref().ok_or_else(stopped)?;

        let (reply, response) = mpsc::channel();
        jobs.send(Job {
            source: source.to_string(),
            span: tracing::Span::current(),
            reply,
        })
        .map_err(|_| stopped())?;
        response.recv().map_err(|_| stopped())?
    }
}

impl Drop for ScriptRuntime {
    fn drop(&mut self) {
        // Closing the queue ends the worker loop.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn export(runtime: &Runtime, source: &str) -> Result<String, String> {
    let context = Context::full(runtime).map_err(|error| error.to_string())?;

    context.with(|ctx| {
        ctx.eval::<Value, _>(PRELUDE)
            .catch(&ctx)
            .map_err(|error| format!("prelude: {error}"))?;
        ctx.eval::<Value, _>(source)
            .catch(&ctx)
            .map_err(|error| error.to_string())?;
        ctx.eval::<String, _>("__seedExport()")
            .catch(&ctx)
            .map_err(|error| error.to_string())
    })
}
