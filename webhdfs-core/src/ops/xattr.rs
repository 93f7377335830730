//! Extended attributes.
//!
//! Attribute names carry their namespace (`user.`, `trusted.`, `system.`, `security.`, `raw.`).
//! Values travel encoded, see [`XAttrEncoding`].
use crate::error::ValidationError;
use crate::protocol::{
    EmptyErrorBody, Json, Op, Operation, Query, RequestDescriptor, RequestParams, Void,
    require_absolute, require_non_empty,
};
use crate::types::{XAttr, XAttrNamesEnvelope, XAttrsEnvelope};
use std::fmt;
use std::str::FromStr;

const NAME_KEY: &str = "xattr.name";
const VALUE_KEY: &str = "xattr.value";

/// Encoding of attribute values.
///
/// Text values are enclosed in double quotes, hex values are prefixed with `0x` and base64
/// values with `0s`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum XAttrEncoding {
    #[default]
    Text,
    Hex,
    Base64,
}

impl XAttrEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            XAttrEncoding::Text => "text",
            XAttrEncoding::Hex => "hex",
            XAttrEncoding::Base64 => "base64",
        }
    }
}

impl fmt::Display for XAttrEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for XAttrEncoding {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(XAttrEncoding::Text),
            "hex" => Ok(XAttrEncoding::Hex),
            "base64" => Ok(XAttrEncoding::Base64),
            _ => Err(ValidationError::InvalidValue {
                field: "encoding",
                reason: format!("unknown encoding '{s}'"),
            }),
        }
    }
}

/// Behaviour of SETXATTR when the attribute exists, or doesn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XAttrSetFlag {
    /// Fail if the attribute already exists.
    Create,
    /// Fail if the attribute doesn't exist.
    Replace,
}

impl XAttrSetFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            XAttrSetFlag::Create => "CREATE",
            XAttrSetFlag::Replace => "REPLACE",
        }
    }
}

impl fmt::Display for XAttrSetFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for XAttrSetFlag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Ok(XAttrSetFlag::Create),
            "REPLACE" => Ok(XAttrSetFlag::Replace),
            _ => Err(ValidationError::InvalidValue {
                field: "flag",
                reason: format!("unknown flag '{s}'"),
            }),
        }
    }
}

/// Read attributes of a path (`GETXATTRS`). Every attribute is returned when no name is given.
#[derive(Debug, Clone, Default)]
pub struct GetXAttrs {
    pub path: String,
    pub names: Vec<String>,
    pub encoding: XAttrEncoding,
    pub params: RequestParams,
}

impl GetXAttrs {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn with_encoding(mut self, encoding: XAttrEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

impl RequestDescriptor for GetXAttrs {
    fn op(&self) -> Op {
        Op::GetXAttrs
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        for name in &self.names {
            query.push(NAME_KEY, name);
        }
        query.push("encoding", self.encoding);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)?;
        self.names
            .iter()
            .try_for_each(|name| require_non_empty(NAME_KEY, name))
    }
}

impl Operation for GetXAttrs {
    type Decoder = Json<XAttrsEnvelope, Vec<XAttr>>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: XAttrsEnvelope| envelope.xattrs)
    }
}

/// List the attribute names of a path (`LISTXATTRS`).
#[derive(Debug, Clone, Default)]
pub struct ListXAttrs {
    pub path: String,
    pub params: RequestParams,
}

impl ListXAttrs {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for ListXAttrs {
    fn op(&self) -> Op {
        Op::ListXAttrs
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

impl Operation for ListXAttrs {
    type Decoder = Json<XAttrNamesEnvelope, Vec<String>>;

    fn decoder(&self) -> Self::Decoder {
        Json::new(|envelope: XAttrNamesEnvelope| envelope.names)
    }
}

/// Set one attribute (`SETXATTR`).
#[derive(Debug, Clone)]
pub struct SetXAttr {
    pub path: String,
    pub name: String,
    /// Encoded value, e.g. `"blue"`, `0x626c7565` or `0sYmx1ZQ==`.
    pub value: Option<String>,
    pub flag: XAttrSetFlag,
    pub params: RequestParams,
}

impl SetXAttr {
    pub fn new(path: impl Into<String>, name: impl Into<String>, flag: XAttrSetFlag) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            value: None,
            flag,
            params: RequestParams::default(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl RequestDescriptor for SetXAttr {
    fn op(&self) -> Op {
        Op::SetXAttr
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push(NAME_KEY, &self.name);
        query.push_opt(VALUE_KEY, self.value.as_deref());
        query.push("flag", self.flag);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)?;
        require_non_empty(NAME_KEY, &self.name)
    }
}

impl Operation for SetXAttr {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Failure)
    }
}

/// Remove one attribute (`REMOVEXATTR`).
#[derive(Debug, Clone, Default)]
pub struct RemoveXAttr {
    pub path: String,
    pub name: String,
    pub params: RequestParams,
}

impl RemoveXAttr {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for RemoveXAttr {
    fn op(&self) -> Op {
        Op::RemoveXAttr
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push(NAME_KEY, &self.name);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)?;
        require_non_empty(NAME_KEY, &self.name)
    }
}

impl Operation for RemoveXAttr {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Failure)
    }
}

with_params!(GetXAttrs, ListXAttrs, SetXAttr, RemoveXAttr);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::render_query;

    #[test]
    fn test_get_xattrs_repeats_name_key() {
        let op = GetXAttrs::new("/a")
            .with_name("user.a")
            .with_name("user.b")
            .with_encoding(XAttrEncoding::Hex);
        let query = render_query(&op, &RequestParams::default());

        let names: Vec<_> = query
            .pairs()
            .iter()
            .filter(|(k, _)| k == NAME_KEY)
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(names, vec!["user.a", "user.b"]);
        assert_eq!(query.get("encoding"), Some("hex"));
    }

    #[test]
    fn test_set_xattr_requires_name() {
        let op = SetXAttr::new("/a", " ", XAttrSetFlag::Create);
        assert_eq!(op.validate(), Err(ValidationError::MissingField(NAME_KEY)));
    }

    #[test]
    fn test_set_xattr_query() {
        let op = SetXAttr::new("/a", "user.color", XAttrSetFlag::Replace).with_value("\"blue\"");
        let query = render_query(&op, &RequestParams::default());

        assert_eq!(query.get(NAME_KEY), Some("user.color"));
        assert_eq!(query.get(VALUE_KEY), Some("\"blue\""));
        assert_eq!(query.get("flag"), Some("REPLACE"));
        assert_eq!(op.method(), http::Method::PUT);
    }

    #[test]
    fn test_encoding_and_flag_parsing() {
        assert_eq!("BASE64".parse::<XAttrEncoding>().unwrap(), XAttrEncoding::Base64);
        assert!("rot13".parse::<XAttrEncoding>().is_err());
        assert_eq!("create".parse::<XAttrSetFlag>().unwrap(), XAttrSetFlag::Create);
    }
}
