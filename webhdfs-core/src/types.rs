//! # WebHDFS Payloads
//!
//! Serde models of the JSON objects returned by the namenodes. Most responses wrap their payload
//! in a single-key object (`{"FileStatus": {...}}`); the `*Envelope` types describe that wire shape
//! and the operations unwrap them before handing the value back.
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub access_time: u64,
    pub block_size: u64,
    #[serde(default)]
    pub children_num: u32,
    #[serde(default)]
    pub file_id: u64,
    pub group: String,
    pub length: u64,
    pub modification_time: u64,
    pub owner: String,
    /// Empty for GETFILESTATUS, the entry name for LISTSTATUS.
    #[serde(default)]
    pub path_suffix: String,
    /// Octal permission, e.g. `644`.
    pub permission: String,
    pub replication: u16,
    #[serde(default)]
    pub storage_policy: u8,
    #[serde(rename = "type")]
    pub file_type: FileType,
    #[serde(default)]
    pub symlink: Option<String>,
    #[serde(default)]
    pub ec_policy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileStatusEnvelope {
    #[serde(rename = "FileStatus")]
    pub file_status: FileStatus,
}

#[derive(Debug, Deserialize)]
pub struct FileStatusesEnvelope {
    #[serde(rename = "FileStatuses")]
    pub file_statuses: FileStatuses,
}

#[derive(Debug, Deserialize)]
pub struct FileStatuses {
    #[serde(rename = "FileStatus", default)]
    pub file_status: Vec<FileStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub directory_count: u64,
    pub file_count: u64,
    pub length: u64,
    /// `-1` when no quota is set.
    pub quota: i64,
    pub space_consumed: u64,
    pub space_quota: i64,
    #[serde(default)]
    pub ec_policy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentSummaryEnvelope {
    #[serde(rename = "ContentSummary")]
    pub content_summary: ContentSummary,
}

#[derive(Debug, Deserialize)]
pub struct PathEnvelope {
    #[serde(rename = "Path")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct BooleanEnvelope {
    pub boolean: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XAttr {
    pub name: String,
    /// Encoded according to the requested encoding. Absent for attributes without a value.
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct XAttrsEnvelope {
    #[serde(rename = "XAttrs", default)]
    pub xattrs: Vec<XAttr>,
}

/// LISTXATTRS returns the names as a JSON array serialized inside a string:
/// `{"XAttrNames": "[\"user.a\",\"user.b\"]"}`.
#[derive(Debug, Deserialize)]
pub struct XAttrNamesEnvelope {
    #[serde(rename = "XAttrNames", deserialize_with = "json_in_string")]
    pub names: Vec<String>,
}

fn json_in_string<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    serde_json::from_str(&raw).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStoragePolicy {
    pub id: u8,
    pub name: String,
    #[serde(default)]
    pub storage_types: Vec<String>,
    #[serde(default)]
    pub replication_fallbacks: Vec<String>,
    #[serde(default)]
    pub creation_fallbacks: Vec<String>,
    #[serde(default)]
    pub copy_on_create_file: bool,
}

#[derive(Debug, Deserialize)]
pub struct BlockStoragePolicyEnvelope {
    #[serde(rename = "BlockStoragePolicy")]
    pub policy: BlockStoragePolicy,
}

#[derive(Debug, Deserialize)]
pub struct BlockStoragePoliciesEnvelope {
    #[serde(rename = "BlockStoragePolicies")]
    pub policies: BlockStoragePolicies,
}

#[derive(Debug, Deserialize)]
pub struct BlockStoragePolicies {
    #[serde(rename = "BlockStoragePolicy", default)]
    pub policy: Vec<BlockStoragePolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErasureCodingPolicy {
    pub name: String,
    pub id: u8,
    pub cell_size: u64,
    pub codec_name: String,
    pub num_data_units: u32,
    pub num_parity_units: u32,
    #[serde(default)]
    pub replication_policy: bool,
    #[serde(default)]
    pub system_policy: bool,
}
