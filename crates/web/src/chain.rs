//! Sequential execution of a handler list.

use std::fmt;

use tracing::trace;

use crate::error::HandlerResult;
use crate::middleware::BoxMiddleware;
use crate::request::Request;
use crate::response::Response;

/// Control handed to every entry of a chain.
///
/// `Next` points at the entry that runs after the current one. It is consumed
/// by [`Next::advance`], so an entry can hand over control at most once, and a
/// position that already ran is never entered again.
pub struct Next<'a> {
    chain: &'a [BoxMiddleware],
    index: usize,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [BoxMiddleware]) -> Self {
        Self { chain, index: 0 }
    }

    /// Runs the next entry of the chain and waits for it to return.
    ///
    /// Advancing past the last entry does nothing.
    pub async fn advance(self, req: &mut Request, res: &mut Response) -> HandlerResult {
        let Some(middleware) = self.chain.get(self.index) else {
            trace!(len = self.chain.len(), "advanced past the end of the chain");
            return Ok(());
        };

        let next = Next { chain: self.chain, index: self.index + 1 };
        middleware.handle(req, res, next).await
    }

    /// How many entries have not run yet.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("index", &self.index).field("len", &self.chain.len()).finish()
    }
}

/// Runs `chain` from its first entry.
pub(crate) async fn run(chain: &[BoxMiddleware], req: &mut Request, res: &mut Response) -> HandlerResult {
    Next::new(chain).advance(req, res).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::middleware::{handler_fn, middleware_fn};
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str, advance: bool) -> BoxMiddleware {
        let log = Arc::clone(log);
        Arc::new(middleware_fn(move |req: &mut Request, res: &mut Response, next: Next<'_>| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push(name);
                if advance { next.advance(req, res).await } else { Ok(()) }
            })
        }))
    }

    #[tokio::test]
    async fn runs_entries_in_order() {
        let log = Arc::new(Mutex::new(vec![]));
        let chain = vec![recorder(&log, "a", true), recorder(&log, "b", true), recorder(&log, "c", true)];

        let (mut req, mut res) = (Request::for_test("/"), Response::new());
        run(&chain, &mut req, &mut res).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn stops_when_an_entry_does_not_advance() {
        let log = Arc::new(Mutex::new(vec![]));
        let chain = vec![recorder(&log, "a", true), recorder(&log, "b", false), recorder(&log, "c", true)];

        let (mut req, mut res) = (Request::for_test("/"), Response::new());
        run(&chain, &mut req, &mut res).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn work_after_advance_runs_once_the_rest_returns() {
        let log = Arc::new(Mutex::new(vec![]));
        let outer_log = Arc::clone(&log);
        let outer: BoxMiddleware = Arc::new(middleware_fn(move |req: &mut Request, res: &mut Response, next: Next<'_>| {
            let log = Arc::clone(&outer_log);
            Box::pin(async move {
                log.lock().unwrap().push("before");
                let result = next.advance(req, res).await;
                log.lock().unwrap().push("after");
                result
            })
        }));
        let chain = vec![outer, recorder(&log, "inner", true)];

        let (mut req, mut res) = (Request::for_test("/"), Response::new());
        run(&chain, &mut req, &mut res).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["before", "inner", "after"]);
    }

    #[tokio::test]
    async fn errors_abort_the_chain() {
        let log = Arc::new(Mutex::new(vec![]));
        let failing: BoxMiddleware = Arc::new(handler_fn(|_req: &mut Request, _res: &mut Response| {
            Box::pin(async move { Err::<(), BoxError>("boom".into()) })
        }));
        let chain = vec![recorder(&log, "a", true), failing, recorder(&log, "c", true)];

        let (mut req, mut res) = (Request::for_test("/"), Response::new());
        let err = run(&chain, &mut req, &mut res).await.unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn empty_chain_and_remaining() {
        let (mut req, mut res) = (Request::for_test("/"), Response::new());
        run(&[], &mut req, &mut res).await.unwrap();

        let log = Arc::new(Mutex::new(vec![]));
        let chain = vec![recorder(&log, "a", true), recorder(&log, "b", true)];
        assert_eq!(Next::new(&chain).remaining(), 2);
        assert_eq!(Next { chain: &chain, index: 5 }.remaining(), 0);
    }
}
