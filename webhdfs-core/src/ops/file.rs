//! File and directory operations.
//!
//! See <https://hadoop.apache.org/docs/current/hadoop-project-dist/hadoop-hdfs/WebHDFS.html>.
use super::permission::Permission;
use crate::error::ValidationError;
use crate::protocol::{
    EmptyErrorBody, Json, Op, Operation, Query, Raw, RequestDescriptor, RequestParams, Void,
    require_absolute,
};
use crate::types::{
    BooleanEnvelope, ContentSummary, ContentSummaryEnvelope, FileStatus, FileStatusEnvelope,
    FileStatusesEnvelope, PathEnvelope,
};
use bytes::Bytes;

/// Open and read a file (`OPEN`).
#[derive(Debug, Clone, Default)]
pub struct Open {
    pub path: String,
    /// Starting byte position.
    pub offset: Option<u64>,
    /// Number of bytes to read, the whole file when absent.
    pub length: Option<u64>,
    pub buffer_size: Option<u32>,
    /// Ask the namenode to return the datanode location instead of redirecting.
    pub no_redirect: Option<bool>,
    pub params: RequestParams,
}

impl Open {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    pub fn with_no_redirect(mut self, no_redirect: bool) -> Self {
        self.no_redirect = Some(no_redirect);
        self
    }
}

impl RequestDescriptor for Open {
    fn op(&self) -> Op {
        Op::Open
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push_opt("offset", self.offset);
        query.push_opt("length", self.length);
        query.push_opt("buffersize", self.buffer_size);
        query.push_opt("noredirect", self.no_redirect);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)
    }
}

impl Operation for Open {
    type Decoder = Raw;

    fn decoder(&self) -> Raw {
        Raw
    }
}

/// Status of a file or directory (`GETFILESTATUS`).
#[derive(Debug, Clone, Default)]
pub struct GetFileStatus {
    pub path: String,
    pub params: RequestParams,
}

impl GetFileStatus {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for GetFileStatus {
    fn op(&self) -> Op {
        Op::GetFileStatus
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)
    }
}

impl Operation for GetFileStatus {
    type Decoder = Json<FileStatusEnvelope, FileStatus>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: FileStatusEnvelope| envelope.file_status)
    }
}

/// List a directory (`LISTSTATUS`).
#[derive(Debug, Clone, Default)]
pub struct ListStatus {
    pub path: String,
    pub params: RequestParams,
}

impl ListStatus {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for ListStatus {
    fn op(&self) -> Op {
        Op::ListStatus
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)
    }
}

impl Operation for ListStatus {
    type Decoder = Json<FileStatusesEnvelope, Vec<FileStatus>>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: FileStatusesEnvelope| envelope.file_statuses.file_status)
    }
}

/// Directory usage (`GETCONTENTSUMMARY`).
#[derive(Debug, Clone, Default)]
pub struct GetContentSummary {
    pub path: String,
    pub params: RequestParams,
}

impl GetContentSummary {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for GetContentSummary {
    fn op(&self) -> Op {
        Op::GetContentSummary
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)
    }
}

impl Operation for GetContentSummary {
    type Decoder = Json<ContentSummaryEnvelope, ContentSummary>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: ContentSummaryEnvelope| envelope.content_summary)
    }
}

/// Home directory of the calling user (`GETHOMEDIRECTORY`).
#[derive(Debug, Clone, Default)]
pub struct GetHomeDirectory {
    pub params: RequestParams,
}

impl GetHomeDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestDescriptor for GetHomeDirectory {
    fn op(&self) -> Op {
        Op::GetHomeDirectory
    }

    fn path(&self) -> &str {
        "/"
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }
}

impl Operation for GetHomeDirectory {
    type Decoder = Json<PathEnvelope, String>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: PathEnvelope| envelope.path)
    }
}

/// Create a directory and its parents (`MKDIRS`).
#[derive(Debug, Clone, Default)]
pub struct MkDirs {
    pub path: String,
    pub permission: Option<Permission>,
    pub params: RequestParams,
}

impl MkDirs {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }
}

impl RequestDescriptor for MkDirs {
    fn op(&self) -> Op {
        Op::MkDirs
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push_opt("permission", self.permission);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)
    }
}

impl Operation for MkDirs {
    type Decoder = Json<BooleanEnvelope, bool>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: BooleanEnvelope| envelope.boolean)
    }
}

/// Rename a file or directory (`RENAME`).
#[derive(Debug, Clone, Default)]
pub struct Rename {
    pub path: String,
    pub destination: String,
    pub params: RequestParams,
}

impl Rename {
    pub fn new(path: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for Rename {
    fn op(&self) -> Op {
        Op::Rename
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push("destination", &self.destination);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)?;
        if self.destination.is_empty() {
            return Err(ValidationError::MissingField("destination"));
        }
        require_absolute(&self.destination)
    }
}

impl Operation for Rename {
    type Decoder = Json<BooleanEnvelope, bool>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: BooleanEnvelope| envelope.boolean)
    }
}

/// Delete a file or directory (`DELETE`).
#[derive(Debug, Clone, Default)]
pub struct Delete {
    pub path: String,
    pub recursive: Option<bool>,
    pub params: RequestParams,
}

impl Delete {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }
}

impl RequestDescriptor for Delete {
    fn op(&self) -> Op {
        Op::Delete
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push_opt("recursive", self.recursive);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)
    }
}

impl Operation for Delete {
    type Decoder = Json<BooleanEnvelope, bool>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: BooleanEnvelope| envelope.boolean)
    }
}

/// Create and write a file (`CREATE`).
///
/// The namenode redirects to a datanode, which receives the content.
#[derive(Debug, Clone, Default)]
pub struct Create {
    pub path: String,
    pub data: Bytes,
    pub overwrite: Option<bool>,
    pub block_size: Option<u64>,
    pub replication: Option<u16>,
    pub permission: Option<Permission>,
    pub buffer_size: Option<u32>,
    pub no_redirect: Option<bool>,
    pub params: RequestParams,
}

impl Create {
    pub fn new(path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = Some(block_size);
        self
    }

    pub fn with_replication(mut self, replication: u16) -> Self {
        self.replication = Some(replication);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }
}

impl RequestDescriptor for Create {
    fn op(&self) -> Op {
        Op::Create
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push_opt("overwrite", self.overwrite);
        query.push_opt("blocksize", self.block_size);
        query.push_opt("replication", self.replication);
        query.push_opt("permission", self.permission);
        query.push_opt("buffersize", self.buffer_size);
        query.push_opt("noredirect", self.no_redirect);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)?;
        if self.replication == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "replication",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    fn body(&self) -> Option<Bytes> {
        Some(self.data.clone())
    }
}

impl Operation for Create {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Failure)
    }
}

/// Append to a file (`APPEND`).
#[derive(Debug, Clone, Default)]
pub struct Append {
    pub path: String,
    pub data: Bytes,
    pub buffer_size: Option<u32>,
    pub no_redirect: Option<bool>,
    pub params: RequestParams,
}

impl Append {
    pub fn new(path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for Append {
    fn op(&self) -> Op {
        Op::Append
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push_opt("buffersize", self.buffer_size);
        query.push_opt("noredirect", self.no_redirect);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)
    }

    fn body(&self) -> Option<Bytes> {
        Some(self.data.clone())
    }
}

impl Operation for Append {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Failure)
    }
}

with_params!(
    Open,
    GetFileStatus,
    ListStatus,
    GetContentSummary,
    GetHomeDirectory,
    MkDirs,
    Rename,
    Delete,
    Create,
    Append,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::render_query;

    #[test]
    fn test_open_renders_only_present_keys() {
        let open = Open::new("/data/a.txt").with_offset(10);
        let query = render_query(&open, &RequestParams::default());

        assert_eq!(query.get("op"), Some("OPEN"));
        assert_eq!(query.get("offset"), Some("10"));
        assert_eq!(query.get("length"), None);
        assert_eq!(query.get("noredirect"), None);
    }

    #[test]
    fn test_rename_requires_absolute_destination() {
        assert_eq!(
            Rename::new("/a", "").validate(),
            Err(ValidationError::MissingField("destination"))
        );
        assert_eq!(
            Rename::new("/a", "b").validate(),
            Err(ValidationError::RelativePath("b".to_string()))
        );
        assert!(Rename::new("/a", "/b").validate().is_ok());
    }

    #[test]
    fn test_mkdirs_permission_is_octal() {
        let mkdirs = MkDirs::new("/tmp/x").with_permission(Permission::new(0o750).unwrap());
        let query = render_query(&mkdirs, &RequestParams::default());
        assert_eq!(query.get("permission"), Some("750"));
        assert_eq!(mkdirs.method(), http::Method::PUT);
    }

    #[test]
    fn test_create_carries_body_and_rejects_zero_replication() {
        let create = Create::new("/tmp/x", "hello").with_overwrite(true);
        assert_eq!(create.body().unwrap(), Bytes::from_static(b"hello"));
        assert!(create.validate().is_ok());

        let create = create.with_replication(0);
        assert!(matches!(
            create.validate(),
            Err(ValidationError::InvalidValue {
                field: "replication",
                ..
            })
        ));
    }

    #[test]
    fn test_delete_uses_delete_method() {
        let delete = Delete::new("/tmp/x").with_recursive(true);
        assert_eq!(delete.method(), http::Method::DELETE);
        assert_eq!(
            render_query(&delete, &RequestParams::default()).get("recursive"),
            Some("true")
        );
    }
}
