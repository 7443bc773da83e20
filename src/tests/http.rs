use crate::{
    infra::http::routes::{file_router, redirect_router},
    tests::support::{Harness, PACKAGE, PEER_A, addr_a, harness, mirror, settings},
};
use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use tower::ServiceExt;

async fn call(router: axum::Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    router.oneshot(request).await.unwrap()
}

async fn get(router: axum::Router, uri: &str) -> Response {
    call(router, Method::GET, uri).await
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test(start_paused = true)]
async fn redirects_to_the_mirror_when_alone() {
    let Harness {
        service,
        handle,
        mut net,
        cache_dir: _cache_dir,
    } = harness(settings(), Some(mirror()));

    let (result, ()) = tokio::join!(service.run(), async {
        net.expect_announce().await;

        let response = get(
            redirect_router(handle.clone()),
            &format!("/core/os/x86_64/{PACKAGE}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            format!("https://mirror.example/archlinux/core/os/x86_64/{PACKAGE}")
        );

        handle.shutdown().await;
    });
    result.unwrap();
}

#[tokio::test(start_paused = true)]
async fn answers_not_found_without_a_mirror() {
    let Harness {
        service,
        handle,
        mut net,
        cache_dir: _cache_dir,
    } = harness(settings(), None);

    let (result, ()) = tokio::join!(service.run(), async {
        net.expect_announce().await;

        let response = get(
            redirect_router(handle.clone()),
            &format!("/core/os/x86_64/{PACKAGE}"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        handle.shutdown().await;
    });
    result.unwrap();
}

#[tokio::test(start_paused = true)]
async fn rejects_paths_pacman_would_never_ask_for() {
    let Harness {
        service,
        handle,
        mut net,
        cache_dir: _cache_dir,
    } = harness(settings(), Some(mirror()));

    let (result, ()) = tokio::join!(service.run(), async {
        net.expect_announce().await;

        for uri in [
            "/core/x86_64/linux.pkg.tar.zst",
            "/core/os/x86_64",
            "/core/os/x86_64/a%20%3D%20b.pkg.tar.zst",
        ] {
            let response = get(redirect_router(handle.clone()), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }

        assert_eq!(net.try_sent(), None);
        handle.shutdown().await;
    });
    result.unwrap();
}

#[tokio::test(start_paused = true)]
async fn status_lists_known_peers() {
    let Harness {
        service,
        handle,
        mut net,
        cache_dir: _cache_dir,
    } = harness(settings(), Some(mirror()));

    let (result, ()) = tokio::join!(service.run(), async {
        net.expect_announce().await;
        net.handshake(PEER_A, addr_a()).await;

        let response = get(redirect_router(handle.clone()), "/_flocon/status").await;
        assert_eq!(response.status(), StatusCode::OK);

        let peers: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(peers[0]["id"], PEER_A);
        assert_eq!(peers[0]["ip"], "10.0.0.2");
        assert_eq!(peers[0]["port"], 19432);
        assert_eq!(peers[0]["connected"], true);

        handle.shutdown().await;
    });
    result.unwrap();
}

#[tokio::test(start_paused = true)]
async fn resume_conflicts_while_the_link_is_up() {
    let Harness {
        service,
        handle,
        mut net,
        cache_dir: _cache_dir,
    } = harness(settings(), Some(mirror()));

    let (result, ()) = tokio::join!(service.run(), async {
        net.expect_announce().await;

        let response = call(
            redirect_router(handle.clone()),
            Method::POST,
            "/_flocon/resume",
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        handle.shutdown().await;
    });
    result.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stopped_service_is_unavailable() {
    let Harness {
        service,
        handle,
        net: _net,
        cache_dir: _cache_dir,
    } = harness(settings(), Some(mirror()));

    handle.shutdown().await;
    service.run().await.unwrap();

    let response = get(
        redirect_router(handle.clone()),
        &format!("/core/os/x86_64/{PACKAGE}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = get(redirect_router(handle), "/_flocon/status").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn file_server_serves_the_package_cache() {
    let cache_dir = tempfile::tempdir().unwrap();
    std::fs::write(cache_dir.path().join(PACKAGE), b"package bytes").unwrap();

    let response = get(file_router(cache_dir.path()), &format!("/{PACKAGE}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"package bytes");

    let response = get(file_router(cache_dir.path()), "/missing.pkg.tar.zst").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
