use std::time::Instant;

use http::StatusCode;
use syvex::{BoxError, Next, Request, Response, Router, handler_fn, json_body, middleware_fn};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let access_log = middleware_fn(|req: &mut Request, res: &mut Response, next: Next<'_>| {
        Box::pin(async move {
            let start = Instant::now();
            let method = req.method().clone();
            let path = req.path().to_owned();
            let result = next.advance(req, res).await;
            info!(%method, path, status = res.status_code().as_u16(), elapsed = ?start.elapsed(), "handled");
            result
        })
    });

    let require_token = middleware_fn(|req: &mut Request, res: &mut Response, next: Next<'_>| {
        Box::pin(async move {
            if req.header("x-token").is_none() {
                res.status(StatusCode::UNAUTHORIZED).send("missing x-token")?;
                return Ok(());
            }
            next.advance(req, res).await
        })
    });

    let router = Router::builder()
        .use_middleware(access_log)
        // curl -v -H 'x-token: t' -H 'Content-Type: application/json' -d '{"name":"bob"}' http://127.0.0.1:8080/users
        .post(
            "/users",
            (
                require_token,
                json_body(),
                handler_fn(|req: &mut Request, res: &mut Response| {
                    Box::pin(async move {
                        match req.body() {
                            Some(user) => res.status(StatusCode::CREATED).json(user)?,
                            None => res.status(StatusCode::BAD_REQUEST).send("expected a json body")?,
                        }
                        Ok::<_, BoxError>(())
                    })
                }),
            ),
        )?
        .build();

    router.listen("127.0.0.1:8080", |addr| info!(%addr, "listening")).await?;
    Ok(())
}
