use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::{StreamExt, TryStreamExt};
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::net::TcpListener;
use video_storage_proxy::{
    ByteStream, CosIamAdapter, CosSettings, ObjectKey, StorageError, VideoStore, VideoUpload,
};

const API_KEY: &str = "test-api-key";
const INSTANCE_ID: &str = "crn:v1:bluemix:public:cloud-object-storage:global:a/123::";
const TOKEN: &str = "token-1";
const BUCKET: &str = "videos";

/// In-process stand-in for the IAM token service and the object API
#[derive(Clone, Default)]
struct FakeCos {
    objects: Arc<Mutex<HashMap<String, (Option<String>, Bytes)>>>,
    token_requests: Arc<AtomicUsize>,
}

fn error_xml(status: StatusCode, code: &str) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Error><Code>{code}</Code><Message>{code} from fake</Message></Error>"
    );
    (status, [(CONTENT_TYPE, "application/xml")], body).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN));
    let instance = headers
        .get("ibm-service-instance-id")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == INSTANCE_ID);
    bearer && instance
}

async fn issue_token(
    State(fake): State<FakeCos>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let grant = form.get("grant_type").map(String::as_str);
    let key = form.get("apikey").map(String::as_str);
    if grant != Some("urn:ibm:params:oauth:grant-type:apikey") || key != Some(API_KEY) {
        let body = Json(json!({ "errorCode": "BXNIM0415E" }));
        return (StatusCode::BAD_REQUEST, body).into_response();
    }

    fake.token_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "access_token": TOKEN,
        "refresh_token": "not_supported",
        "token_type": "Bearer",
        "expires_in": 3600,
        "expiration": 1_900_000_000u64,
    }))
    .into_response()
}

async fn get_object(
    State(fake): State<FakeCos>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return error_xml(StatusCode::FORBIDDEN, "AccessDenied");
    }
    if bucket != BUCKET {
        return error_xml(StatusCode::NOT_FOUND, "NoSuchBucket");
    }

    let objects = fake.objects.lock().unwrap();
    match objects.get(&key) {
        Some((content_type, data)) => {
            let content_type = content_type
                .clone()
                .unwrap_or_else(|| "binary/octet-stream".to_string());
            (StatusCode::OK, [(CONTENT_TYPE, content_type)], data.clone()).into_response()
        }
        None => error_xml(StatusCode::NOT_FOUND, "NoSuchKey"),
    }
}

async fn put_object(
    State(fake): State<FakeCos>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !authorized(&headers) {
        return error_xml(StatusCode::FORBIDDEN, "AccessDenied");
    }
    if bucket != BUCKET {
        return error_xml(StatusCode::NOT_FOUND, "NoSuchBucket");
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.objects.lock().unwrap().insert(key, (content_type, body));
    StatusCode::OK.into_response()
}

async fn start_fake() -> (FakeCos, String) {
    let fake = FakeCos::default();
    let router = Router::new()
        .route("/identity/token", post(issue_token))
        .route("/{bucket}/{*key}", get(get_object).put(put_object))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (fake, format!("http://{}", addr))
}

fn adapter(base: &str, api_key: &str, instance: &str) -> CosIamAdapter {
    CosIamAdapter::new(
        CosSettings::builder()
            .endpoint(base)
            .bucket(BUCKET)
            .api_key(api_key)
            .service_instance_id(instance)
            .token_url(format!("{}/identity/token", base))
            .build(),
    )
    .unwrap()
}

fn chunked(chunks: Vec<&'static str>) -> ByteStream {
    async_stream::stream! {
        for chunk in chunks {
            yield Ok::<_, std::io::Error>(Bytes::from_static(chunk.as_bytes()));
        }
    }
    .boxed()
}

async fn collect(body: ByteStream) -> Vec<u8> {
    body.try_fold(Vec::new(), |mut acc, chunk| async move {
        acc.extend_from_slice(&chunk);
        Ok(acc)
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_store_then_fetch_round_trip() {
    let (fake, base) = start_fake().await;
    let store = adapter(&base, API_KEY, INSTANCE_ID);
    let key = ObjectKey::new("clips/my video.mp4").unwrap();

    store
        .store(
            VideoUpload {
                key: key.clone(),
                content_type: Some("video/mp4".to_string()),
                content_length: Some(11),
            },
            chunked(vec!["hello ", "world"]),
        )
        .await
        .unwrap();

    assert!(fake.objects.lock().unwrap().contains_key("clips/my video.mp4"));

    let video = store.fetch(&key).await.unwrap();
    assert_eq!(video.content_type.as_deref(), Some("video/mp4"));
    assert_eq!(video.content_length, Some(11));
    assert_eq!(collect(video.body).await, b"hello world");
}

#[tokio::test]
async fn test_store_without_declared_length() {
    let (fake, base) = start_fake().await;
    let store = adapter(&base, API_KEY, INSTANCE_ID);
    let key = ObjectKey::new("chunked.webm").unwrap();

    store
        .store(
            VideoUpload {
                key,
                content_type: None,
                content_length: None,
            },
            chunked(vec!["a", "b", "c"]),
        )
        .await
        .unwrap();

    let objects = fake.objects.lock().unwrap();
    assert_eq!(objects["chunked.webm"].1.as_ref(), b"abc");
}

#[tokio::test]
async fn test_fetch_missing_key_is_not_found() {
    let (_, base) = start_fake().await;
    let store = adapter(&base, API_KEY, INSTANCE_ID);

    let err = store
        .fetch(&ObjectKey::new("missing.mp4").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_access_denied_is_backend_error() {
    let (_, base) = start_fake().await;
    let store = adapter(&base, API_KEY, "someone-elses-instance");

    let err = store
        .fetch(&ObjectKey::new("clip.mp4").unwrap())
        .await
        .unwrap_err();
    match err {
        StorageError::Backend { message, .. } => assert!(message.contains("AccessDenied")),
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_api_key_is_backend_error() {
    let (fake, base) = start_fake().await;
    let store = adapter(&base, "wrong-key", INSTANCE_ID);

    let err = store
        .fetch(&ObjectKey::new("clip.mp4").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Backend { .. }));
    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_token_is_reused_between_requests() {
    let (fake, base) = start_fake().await;
    let store = adapter(&base, API_KEY, INSTANCE_ID);
    let key = ObjectKey::new("cached.mp4").unwrap();

    store
        .store(
            VideoUpload {
                key: key.clone(),
                content_type: Some("video/mp4".to_string()),
                content_length: Some(4),
            },
            chunked(vec!["data"]),
        )
        .await
        .unwrap();
    store.fetch(&key).await.unwrap();
    let _ = store.fetch(&ObjectKey::new("other.mp4").unwrap()).await;

    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_body_is_reported() {
    let (fake, base) = start_fake().await;
    let store = adapter(&base, API_KEY, INSTANCE_ID);
    let body: ByteStream = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"partial")),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionAborted,
            "client went away",
        )),
    ])
    .boxed();

    let err = store
        .store(
            VideoUpload {
                key: ObjectKey::new("aborted.mp4").unwrap(),
                content_type: None,
                content_length: None,
            },
            body,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Body(_)));
    assert!(!fake.objects.lock().unwrap().contains_key("aborted.mp4"));
}
