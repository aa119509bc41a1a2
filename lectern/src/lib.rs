pub use lectern_core::{MeetingId, UserId};

pub mod model {
    pub use lectern_core::model::*;
}

pub mod error {
    pub use lectern_core::error::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use lectern_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use lectern_client::*;
}
