//! Role-based access control for calendars.

mod error;
mod policy;
mod types;

pub use error::AccessError;
pub use policy::{
    authorize, authorize_grant, authorize_revoke, authorize_role_change, authorize_view_grant,
    require_superuser,
};
pub use types::{CalendarAction, Principal};
