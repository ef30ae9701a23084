//! Package argument parsing and the install/update/remove workflow.

pub mod installer;
pub mod spec;

pub use installer::{
    BulkUpdateEntry, BulkUpdateReport, CUSTOM_VERSION, InstallError, InstallReport,
    InstallRequest, Installer, RemoveReport, StoreKind, UpdateCheck, UpdateOutcome,
    remove_server,
};
pub use spec::{LATEST, PackageSpec, parse_env_pair, parse_env_pairs};
