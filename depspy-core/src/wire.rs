//! Payload Decoding
//!
//! Builds send their module records as one batch, either as JSON or as
//! MessagePack with named fields. Both decode to the same records.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::ChangeRecord;

/// Encoding of an ingestion payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    MessagePack,
}

/// Decode a batch of records.
pub fn decode_records(bytes: &[u8], format: WireFormat) -> Result<Vec<ChangeRecord>> {
    let records = match format {
        WireFormat::Json => serde_json::from_slice(bytes)?,
        WireFormat::MessagePack => rmp_serde::from_slice(bytes)?,
    };
    Ok(records)
}
