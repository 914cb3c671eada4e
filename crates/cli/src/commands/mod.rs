//! Command implementations.

mod fingerprint;
mod info;
mod pair;
mod simulate;
mod validate;

pub use fingerprint::run_fingerprint;
pub use info::run_info;
pub use pair::run_pair;
pub use simulate::run_simulate;
pub use validate::run_validate;
