//! # Operation Catalogue
//!
//! Concrete WebHDFS operations. Each one is a plain struct implementing
//! [`RequestDescriptor`](crate::protocol::RequestDescriptor) and
//! [`Operation`](crate::protocol::Operation); none of them contains any dispatch logic.
//!
//! Required fields are constructor arguments, optional ones are set through `with_*` methods.
//! Every operation also accepts a [`RequestParams`](crate::protocol::RequestParams) through
//! `with_params`, overriding the client defaults.

// Generates `with_params` for operations carrying a `params: RequestParams` field.
macro_rules! with_params {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $ty {
                /// Overrides the client default request parameters for this call.
                pub fn with_params(mut self, params: $crate::protocol::RequestParams) -> Self {
                    self.params = params;
                    self
                }
            }
        )*
    };
}

pub mod ec_policy;
pub mod file;
pub mod permission;
pub mod storage_policy;
pub mod xattr;
