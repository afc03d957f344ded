//! 认证授权模块
//!
//! Bearer tokens are issued by the account service; this server only
//! verifies them.
//! - [`JwtService`] - JWT 令牌验证
//! - [`CurrentUser`] - authenticated member (id, restaurant, role)
//! - [`Actor`] - caller of an operation, anonymous customers included

mod actor;
pub mod extractor;
pub mod jwt;

pub use actor::Actor;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
