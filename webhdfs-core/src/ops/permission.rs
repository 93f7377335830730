//! Ownership and permission bits.
use crate::error::ValidationError;
use crate::protocol::{
    EmptyErrorBody, Op, Operation, Query, RequestDescriptor, RequestParams, Void, require_absolute,
};
use std::fmt;
use std::str::FromStr;

/// Largest permission accepted by HDFS, sticky bit included.
pub const MAX_PERMISSION: u16 = 0o1777;

/// POSIX permission bits, rendered in octal on the wire (`755`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission(u16);

impl Permission {
    pub fn new(bits: u16) -> Result<Self, ValidationError> {
        if bits > MAX_PERMISSION {
            return Err(ValidationError::InvalidValue {
                field: "permission",
                reason: format!("{bits:o} is greater than {MAX_PERMISSION:o}"),
            });
        }
        Ok(Self(bits))
    }

    pub fn bits(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

impl FromStr for Permission {
    type Err = ValidationError;

    /// Parses an octal string such as `644` or `1777`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = u16::from_str_radix(s, 8).map_err(|e| ValidationError::InvalidValue {
            field: "permission",
            reason: format!("'{s}' is not an octal number: {e}"),
        })?;
        Self::new(bits)
    }
}

/// Change the permission bits of a path (`SETPERMISSION`).
#[derive(Debug, Clone)]
pub struct SetPermission {
    pub path: String,
    pub permission: Permission,
    pub params: RequestParams,
}

impl SetPermission {
    pub fn new(path: impl Into<String>, permission: Permission) -> Self {
        Self {
            path: path.into(),
            permission,
            params: RequestParams::default(),
        }
    }
}

impl RequestDescriptor for SetPermission {
    fn op(&self) -> Op {
        Op::SetPermission
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push("permission", self.permission);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)
    }
}

impl Operation for SetPermission {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Failure)
    }
}

/// Change the owner and/or the group of a path (`SETOWNER`).
#[derive(Debug, Clone, Default)]
pub struct SetOwner {
    pub path: String,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub params: RequestParams,
}

impl SetOwner {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

impl RequestDescriptor for SetOwner {
    fn op(&self) -> Op {
        Op::SetOwner
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push_opt("owner", self.owner.as_deref());
        query.push_opt("group", self.group.as_deref());
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)?;
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        if !present(&self.owner) && !present(&self.group) {
            return Err(ValidationError::MissingField("owner"));
        }
        Ok(())
    }
}

impl Operation for SetOwner {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Failure)
    }
}

with_params!(SetPermission, SetOwner);
