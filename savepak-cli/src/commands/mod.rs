//! Command implementations for the savepak CLI.

pub mod info;
pub mod pack;
pub mod unpack;

pub use info::cmd_info;
pub use pack::cmd_pack;
pub use unpack::cmd_unpack;
