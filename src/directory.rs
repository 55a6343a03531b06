//! Username directory on top of the node's key/value store.
//!
//! A username maps to a [UsernameRecord] stored under
//! `Id::derive(USERNAME_NAMESPACE, lowercase(username))`. Registrations are
//! not checked for prior owners, the latest store wins.

use tracing::{debug, info};

use crate::{
    codec::{self, CodecError, Registration, UsernameRecord},
    common::{Id, Value},
    node::{Node, NodeError},
};

/// Prefix separating directory keys from other uses of the store.
pub const USERNAME_NAMESPACE: &str = "pc2:username:";

#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Usernames are case insensitive.
pub fn normalize(username: &str) -> String {
    username.to_lowercase()
}

/// The [Id] a username's record is stored under.
pub fn username_id(username: &str) -> Id {
    Id::derive(USERNAME_NAMESPACE, &normalize(username))
}

/// Find the record registered for `username`.
pub async fn lookup(
    node: &dyn Node,
    username: &str,
) -> Result<Option<UsernameRecord>, DirectoryError> {
    let id = username_id(username);

    let value = match node.find_value(id).await? {
        Some(value) => value,
        None => {
            debug!(username, ?id, "Username not found");
            return Ok(None);
        }
    };

    Ok(Some(codec::decode_record(value.data())?))
}

/// Register `username`, overwriting any previous registration.
pub async fn register(
    node: &dyn Node,
    username: &str,
    registration: &Registration,
) -> Result<Id, DirectoryError> {
    let id = username_id(username);
    let data = codec::encode_record(registration)?;

    let receipt = node.store_value(Value::keyed(id, data)).await?;

    info!(
        username = %normalize(username),
        endpoint = %registration.endpoint,
        "Username registered"
    );

    Ok(*receipt.id())
}
