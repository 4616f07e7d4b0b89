// src/lib.rs

pub mod actuator;   // HTTP health/info probes
pub mod config;     // Environment configuration
pub mod domain;     // Accounts and transactions
pub mod error;      // Service errors and their gRPC status codes
pub mod ledger;     // Posting rules
pub mod money;      // Exact amounts
pub mod server;     // gRPC surface
pub mod store;      // Persistence

/// Generated protobuf types.
pub mod proto {
    pub mod google {
        pub mod r#type {
            tonic::include_proto!("google.r#type");
        }
    }

    pub mod ledger {
        pub mod v1 {
            tonic::include_proto!("ledger.v1");
        }
    }
}
