//! Erasure coding policies.
//!
//! Enabling and disabling a policy is a cluster-level operation sent to the root path.
//! Both tolerate a bodiless error answer as success, like SETSTORAGEPOLICY.
use crate::error::ValidationError;
use crate::protocol::{
    EmptyErrorBody, Json, Op, Operation, Query, RequestDescriptor, RequestParams, Void,
    require_absolute, require_non_empty,
};
use crate::types::ErasureCodingPolicy;

const POLICY_KEY: &str = "ecpolicy";

/// Enable a named policy on the cluster (`ENABLEECPOLICY`).
#[derive(Debug, Clone, Default)]
pub struct EnableECPolicy {
    /// Policy name, e.g. `RS-6-3-1024k`.
    pub policy: String,
    pub params: RequestParams,
}

impl EnableECPolicy {
    pub fn new(policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for EnableECPolicy {
    fn op(&self) -> Op {
        Op::EnableECPolicy
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push(POLICY_KEY, &self.policy);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(POLICY_KEY, &self.policy)
    }
}

impl Operation for EnableECPolicy {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Success)
    }
}

/// Disable a named policy on the cluster (`DISABLEECPOLICY`).
#[derive(Debug, Clone, Default)]
pub struct DisableECPolicy {
    pub policy: String,
    pub params: RequestParams,
}

impl DisableECPolicy {
    pub fn new(policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for DisableECPolicy {
    fn op(&self) -> Op {
        Op::DisableECPolicy
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push(POLICY_KEY, &self.policy);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(POLICY_KEY, &self.policy)
    }
}

impl Operation for DisableECPolicy {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Success)
    }
}

/// Apply a policy to a directory (`SETECPOLICY`).
#[derive(Debug, Clone, Default)]
pub struct SetECPolicy {
    pub path: String,
    pub policy: String,
    pub params: RequestParams,
}

impl SetECPolicy {
    pub fn new(path: impl Into<String>, policy: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            policy: policy.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for SetECPolicy {
    fn op(&self) -> Op {
        Op::SetECPolicy
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Option<&RequestParams> {
        Some(&self.params)
    }

    fn write_query(&self, query: &mut Query) {
        query.push(POLICY_KEY, &self.policy);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_absolute(&self.path)?;
        require_non_empty(POLICY_KEY, &self.policy)
    }
}

impl Operation for SetECPolicy {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Failure)
    }
}

/// Remove the policy of a directory (`UNSETECPOLICY`).
#[derive(Debug, Clone, Default)]
pub struct UnsetECPolicy {
    pub path: String,
    pub params: RequestParams,
}

impl UnsetECPolicy {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for UnsetECPolicy {
    fn op(&self) -> Op {
        Op::UnsetECPolicy
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

impl Operation for UnsetECPolicy {
    type Decoder = Void;

    fn decoder(&self) -> Void {
        Void::new(EmptyErrorBody::Failure)
    }
}

/// Policy of a path (`GETECPOLICY`). `None` for replicated paths.
#[derive(Debug, Clone, Default)]
pub struct GetECPolicy {
    pub path: String,
    pub params: RequestParams,
}

impl GetECPolicy {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl RequestDescriptor for GetECPolicy {
    fn op(&self) -> Op {
        Op::GetECPolicy
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

impl Operation for GetECPolicy {
    type Decoder = Json<Option<ErasureCodingPolicy>>;

    fn decoder(&self) -> Self::Decoder {
        Json::plain()
    }
}

with_params!(
    EnableECPolicy,
    DisableECPolicy,
    SetECPolicy,
    UnsetECPolicy,
    GetECPolicy,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ResponseDecoder, render_query};
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};

    #[test]
    fn test_enable_is_cluster_level() {
        let op = EnableECPolicy::new("RS-6-3-1024k");
        assert_eq!(op.path(), "/");
        assert_eq!(
            render_query(&op, &RequestParams::default()).get(POLICY_KEY),
            Some("RS-6-3-1024k")
        );
        assert_eq!(
            DisableECPolicy::new("").validate(),
            Err(ValidationError::MissingField(POLICY_KEY))
        );
    }

    #[test]
    fn test_get_ec_policy_of_replicated_path() {
        let decoder = GetECPolicy::new("/a").decoder();
        let policy = decoder
            .decode(StatusCode::OK, &HeaderMap::new(), Bytes::from_static(b"null"))
            .unwrap();
        assert_eq!(policy, None);
    }

    #[test]
    fn test_get_ec_policy() {
        let body = br#"{"name":"RS-6-3-1024k","id":1,"cellSize":1048576,"codecName":"rs",
            "numDataUnits":6,"numParityUnits":3,"replicationPolicy":false,"systemPolicy":true}"#;
        let policy = GetECPolicy::new("/a")
            .decoder()
            .decode(StatusCode::OK, &HeaderMap::new(), Bytes::from_static(body))
            .unwrap()
            .unwrap();
        assert_eq!(policy.num_data_units, 6);
        assert!(policy.system_policy);
    }
}
