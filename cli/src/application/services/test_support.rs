//! Shared test helpers for lifecycle and provisioning service tests.
//!
//! Provides operation constructors and a macro to generate `ComputeApi`
//! stub methods that fail with "not expected".

use crate::domain::compute::{Operation, OperationErrorItem, OperationErrors};
use crate::domain::CloudError;

/// A finished operation with no error payload.
pub fn done_op(name: &str) -> Operation {
    Operation {
        name: name.to_string(),
        status: "DONE".to_string(),
        ..Operation::default()
    }
}

/// A finished operation carrying one error item.
pub fn failed_op(name: &str, message: &str) -> Operation {
    Operation {
        error: Some(OperationErrors {
            errors: vec![OperationErrorItem {
                code: "INTERNAL".to_string(),
                message: message.to_string(),
            }],
        }),
        ..done_op(name)
    }
}

pub fn unexpected<T>(method: &str) -> Result<T, CloudError> {
    Err(CloudError::Decode(format!("{method} not expected")))
}

/// Generate `ComputeApi` stub methods that fail with "not expected".
///
/// Usage: `impl_compute_stubs!(get_instance, insert_instance);`
/// Omit any method you implement yourself.
macro_rules! impl_compute_stubs {
    ($($method:ident),* $(,)?) => {
        $(impl_compute_stubs!(@one $method);)*
    };
    (@one get_instance) => {
        async fn get_instance(
            &self,
            _: &$crate::domain::InstanceLocator,
        ) -> Result<$crate::domain::compute::Instance, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("get_instance")
        }
    };
    (@one insert_instance) => {
        async fn insert_instance(
            &self,
            _: &$crate::domain::InstanceLocator,
            _: &$crate::domain::compute::InstanceSpec,
        ) -> Result<$crate::domain::compute::Operation, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("insert_instance")
        }
    };
    (@one delete_instance) => {
        async fn delete_instance(
            &self,
            _: &$crate::domain::InstanceLocator,
        ) -> Result<$crate::domain::compute::Operation, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("delete_instance")
        }
    };
    (@one list_instances) => {
        async fn list_instances(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Vec<$crate::domain::compute::Instance>, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("list_instances")
        }
    };
    (@one get_static_ip) => {
        async fn get_static_ip(
            &self,
            _: &$crate::domain::RegionLocator,
            _: &str,
        ) -> Result<$crate::domain::compute::StaticIp, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("get_static_ip")
        }
    };
    (@one insert_static_ip) => {
        async fn insert_static_ip(
            &self,
            _: &$crate::domain::RegionLocator,
            _: &str,
            _: &str,
        ) -> Result<$crate::domain::compute::Operation, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("insert_static_ip")
        }
    };
    (@one delete_static_ip) => {
        async fn delete_static_ip(
            &self,
            _: &$crate::domain::RegionLocator,
            _: &str,
        ) -> Result<$crate::domain::compute::Operation, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("delete_static_ip")
        }
    };
    (@one get_firewall) => {
        async fn get_firewall(
            &self,
            _: &str,
            _: &str,
        ) -> Result<$crate::domain::compute::Firewall, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("get_firewall")
        }
    };
    (@one insert_firewall) => {
        async fn insert_firewall(
            &self,
            _: &str,
            _: &$crate::domain::compute::FirewallSpec,
        ) -> Result<$crate::domain::compute::Operation, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("insert_firewall")
        }
    };
    (@one guest_attributes) => {
        async fn guest_attributes(
            &self,
            _: &$crate::domain::InstanceLocator,
            _: &str,
        ) -> Result<$crate::domain::GuestAttributes, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("guest_attributes")
        }
    };
    (@one wait_operation) => {
        async fn wait_operation(
            &self,
            _: &str,
            _: &$crate::domain::compute::Operation,
        ) -> Result<$crate::domain::compute::Operation, $crate::domain::CloudError> {
            $crate::application::services::test_support::unexpected("wait_operation")
        }
    };
}

pub(crate) use impl_compute_stubs;
