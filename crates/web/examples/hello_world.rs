use serde::Serialize;
use syvex::{BoxError, Request, Response, Router, Server, handler_fn};

#[derive(Serialize)]
struct Data<'a> {
    id: &'a str,
    message: &'static str,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::builder()
        .get(
            "/",
            handler_fn(|_req: &mut Request, res: &mut Response| {
                Box::pin(async move {
                    res.send("Hello World!")?;
                    Ok::<_, BoxError>(())
                })
            }),
        )?
        // curl -v http://127.0.0.1:8080/api/data/42
        .get(
            "/api/data/:id",
            handler_fn(|req: &mut Request, res: &mut Response| {
                Box::pin(async move {
                    let id = req.param("id").unwrap_or_default();
                    res.json(&Data { id, message: "data fetched" })?;
                    Ok::<_, BoxError>(())
                })
            }),
        )?
        .build();

    Server::builder().router(router).address("127.0.0.1:8080").build()?.start().await;
    Ok(())
}
