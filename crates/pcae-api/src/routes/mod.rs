//! # Route Modules
//!
//! | Prefix                  | Module                    |
//! |-------------------------|---------------------------|
//! | `/v1/configuration/*`   | [`configuration`]         |
//! | `/v1/use-case`          | [`configuration`]         |
//! | `/v1/apply`             | [`configuration`]         |
//! | `/v1/cache/*`           | [`configuration`]         |
//! | `/v1/audit/*`           | [`audit`]                 |

pub mod audit;
pub mod configuration;
