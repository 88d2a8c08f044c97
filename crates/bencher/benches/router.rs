use std::hint::black_box;

use bencher::RouteCase;
use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use http::Method;
use http_body_util::Full;
use syvex::router::PathPattern;
use syvex::{BoxError, Request, Response, Router, handler_fn, json_body};

fn build_router(case: &RouteCase, with_echo: bool) -> Router {
    let mut builder = Router::builder();
    if with_echo {
        builder = builder
            .post(
                "/echo",
                (
                    json_body(),
                    handler_fn(|req: &mut Request, res: &mut Response| {
                        Box::pin(async move {
                            match req.body() {
                                Some(body) => res.json(body)?,
                                None => res.send("")?,
                            }
                            Ok::<_, BoxError>(())
                        })
                    }),
                ),
            )
            .expect("benchmark routes are valid");
    }
    for route in case.routes() {
        builder = builder
            .get(
                route,
                handler_fn(|req: &mut Request, res: &mut Response| {
                    Box::pin(async move {
                        let id = req.param("id").unwrap_or_default().to_owned();
                        res.send(id)?;
                        Ok::<_, BoxError>(())
                    })
                }),
            )
            .expect("benchmark routes are valid");
    }
    builder.build()
}

fn benchmark_pattern(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("path_pattern");

    group.bench_function("compile", |b| {
        b.iter(|| PathPattern::compile(black_box("/api/v1/resource/:id/:name")).expect("valid pattern"))
    });

    let pattern = PathPattern::compile("/api/v1/resource/:id/:name").expect("valid pattern");
    group.bench_function("extract", |b| b.iter(|| pattern.extract(black_box("/api/v1/resource/42/bob"))));

    group.finish();
}

fn benchmark_resolve(criterion: &mut Criterion) {
    let cases = [RouteCase::api("routes_10", 10), RouteCase::api("routes_100", 100)];
    let mut group = criterion.benchmark_group("route_resolve");

    for case in &cases {
        let router = build_router(case, false);
        for path in case.paths() {
            group.bench_with_input(BenchmarkId::new(case.name(), path), path, |b, path| {
                b.iter(|| router.resolve(&Method::GET, black_box(path)).map(|matched| matched.params.len()))
            });
        }
    }

    group.finish();
}

fn benchmark_dispatch(criterion: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
    let router = build_router(&RouteCase::api("routes_10", 10), true);

    let mut group = criterion.benchmark_group("dispatch");
    group.bench_function("get_with_params", |b| {
        b.iter(|| {
            let req = http::Request::builder()
                .uri("/api/v1/resource5/42/bob")
                .body(Full::new(Bytes::new()))
                .expect("valid request");
            runtime.block_on(router.dispatch(req))
        })
    });
    group.bench_function("post_json", |b| {
        b.iter(|| {
            let req = http::Request::builder()
                .method(Method::POST)
                .uri("/echo")
                .body(Full::new(Bytes::from_static(br#"{"name":"hello","zip":"world"}"#)))
                .expect("valid request");
            runtime.block_on(router.dispatch(req))
        })
    });
    group.finish();
}

criterion_group!(router, benchmark_pattern, benchmark_resolve, benchmark_dispatch);
criterion_main!(router);
