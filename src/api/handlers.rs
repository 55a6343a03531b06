//! Request handlers, one per endpoint.
//!
//! Every node operation runs in its own task: once issued it completes even if
//! the client goes away, the response is simply dropped then.

use std::future::Future;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::{ApiError, ApiResult, AppState};
use crate::{
    codec::{self, Registration, UsernameRecord},
    common::{Id, Value},
    directory,
};

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");

// === Responses ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub node_id: Id,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfoResponse {
    pub node_id: Id,
    pub address: Option<String>,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct UsernameResponse {
    #[serde(flatten)]
    pub record: UsernameRecord,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct FindResponse {
    pub id: Id,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub success: bool,
    pub id: Id,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnounceResponse {
    pub success: bool,
    pub info_hash: Id,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeersResponse {
    pub info_hash: Id,
    pub peers: Vec<String>,
}

// === Requests ===

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub node_id: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreRequest {
    pub data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnounceRequest {
    pub info_hash: Option<String>,
    pub port: Option<u16>,
}

// === Handlers ===

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        node_id: state.node.id(),
    })
}

/// GET /api/node
pub async fn node_info(State(state): State<AppState>) -> Json<NodeInfoResponse> {
    Json(NodeInfoResponse {
        node_id: state.node.id(),
        address: state.node.address4().map(|address| address.to_string()),
        port: state.node.port(),
    })
}

/// GET /api/username/{name}
pub async fn lookup_username(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<UsernameResponse>> {
    let username = directory::normalize(&path_segment(name, "Invalid username")?);

    let node = state.node.clone();
    let key = username.clone();
    let record = detached(async move {
        Ok::<_, ApiError>(directory::lookup(node.as_ref(), &key).await?)
    })
    .await?;

    match record {
        Some(record) => Ok(Json(UsernameResponse { record, username })),
        None => Err(ApiError::NotFound {
            message: "Username not found",
            username: Some(username),
        }),
    }
}

/// POST /api/username
pub async fn register_username(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<RegisterResponse>> {
    let request: RegisterRequest = parse_body(&read_body(body)?)?;

    let username = directory::normalize(request.username.as_deref().unwrap_or_default());

    let registration = match (non_empty(request.node_id), non_empty(request.endpoint)) {
        (Some(node_id), Some(endpoint)) if !username.is_empty() => {
            Registration { node_id, endpoint }
        }
        _ => {
            return Err(ApiError::MissingField(
                "Missing required fields: username, nodeId, endpoint",
            ))
        }
    };

    let node = state.node.clone();
    let key = username.clone();
    detached(async move {
        Ok::<_, ApiError>(directory::register(node.as_ref(), &key, &registration).await?)
    })
    .await?;

    Ok(Json(RegisterResponse {
        success: true,
        username,
    }))
}

/// GET /api/dht/find/{id}
pub async fn find_value(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<FindResponse>> {
    let id: Id = path_segment(id, "Invalid ID")?.parse()?;

    let node = state.node.clone();
    let value = detached(async move { Ok::<_, ApiError>(node.find_value(id).await?) })
        .await?
        .ok_or_else(|| ApiError::not_found("Value not found"))?;

    Ok(Json(FindResponse {
        id,
        data: codec::decode_raw(value.data()),
    }))
}

/// POST /api/dht/store
pub async fn store_value(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<StoreResponse>> {
    let request: StoreRequest = parse_body(&read_body(body)?)?;

    let data = request
        .data
        .ok_or(ApiError::MissingField("Missing 'data' field"))?;

    let value = Value::immutable(codec::encode_raw(&data));

    let node = state.node.clone();
    let receipt =
        detached(async move { Ok::<_, ApiError>(node.store_value(value).await?) }).await?;

    debug!(id = ?receipt.id(), "Value stored");

    Ok(Json(StoreResponse {
        success: true,
        id: *receipt.id(),
    }))
}

/// POST /api/dht/announce
pub async fn announce_peer(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<AnnounceResponse>> {
    let request: AnnounceRequest = parse_body(&read_body(body)?)?;

    let info_hash: Id = non_empty(request.info_hash)
        .ok_or(ApiError::MissingField("Missing 'infoHash' field"))?
        .parse()?;

    let node = state.node.clone();
    let port = request.port;
    let info_hash = detached(async move {
        Ok::<_, ApiError>(node.announce_peer(info_hash, port).await?)
    })
    .await?;

    Ok(Json(AnnounceResponse {
        success: true,
        info_hash,
    }))
}

/// GET /api/dht/peers/{info_hash}
pub async fn get_peers(
    State(state): State<AppState>,
    info_hash: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<PeersResponse>> {
    let info_hash: Id = path_segment(info_hash, "Invalid ID")?.parse()?;

    let node = state.node.clone();
    let peers =
        detached(async move { Ok::<_, ApiError>(node.get_peers(info_hash).await?) }).await?;

    if peers.is_empty() {
        return Err(ApiError::not_found("No peers found"));
    }

    Ok(Json(PeersResponse {
        info_hash,
        peers: peers.iter().map(|peer| peer.to_string()).collect(),
    }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// Fallback for known routes called with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// === Private Functions ===

/// Run a node operation to completion on its own task.
async fn detached<T, F>(operation: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(operation)
        .await
        .map_err(|error| ApiError::Internal(error.to_string()))?
}

fn path_segment(
    path: Result<Path<String>, PathRejection>,
    message: &'static str,
) -> ApiResult<String> {
    path.map(|Path(segment)| segment)
        .map_err(|source| ApiError::InvalidPath { message, source })
}

fn read_body(body: Result<Bytes, BytesRejection>) -> ApiResult<Bytes> {
    body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::BodyTooLarge,
        _ => ApiError::InvalidBody,
    })
}

/// Parse a JSON object body.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value @ serde_json::Value::Object(_)) => {
            serde_json::from_value(value).map_err(|_| ApiError::InvalidBody)
        }
        _ => Err(ApiError::InvalidBody),
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_body_requires_object() {
        assert!(matches!(
            parse_body::<StoreRequest>(b"not json"),
            Err(ApiError::InvalidBody)
        ));
        assert!(matches!(
            parse_body::<StoreRequest>(b"[\"hello\"]"),
            Err(ApiError::InvalidBody)
        ));
        assert!(matches!(
            parse_body::<StoreRequest>(b"{\"data\": 5}"),
            Err(ApiError::InvalidBody)
        ));

        let request: StoreRequest = parse_body(b"{\"data\": \"hello\", \"extra\": 1}").unwrap();
        assert_eq!(request.data.as_deref(), Some("hello"));
    }

    #[test]
    fn non_empty_fields() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("a".to_string())), Some("a".to_string()));
    }
}
