//! Repository discovery and boundary rules.
//!
//! Every mutation the engine applies must stay inside one version-control
//! boundary, with a single sanctioned exception: distributing loose files
//! from the outermost root repository into a nested sub-repository.

pub mod boundary;
pub mod discovery;

pub use boundary::{can_move_file, find_most_specific_repository, is_within_repository};
pub use discovery::{discover, discover_with_options, DiscoveryResult, Repository, ScanOptions};
