mod disabled;
mod error;
mod layout;
mod manifest;
mod record;
mod scanner;

pub use disabled::{load_disabled_packages, parse_disabled_packages, DisabledPackages};
pub use error::MoleculeError;
pub use layout::{default_base_dir, BaseLayout, BASE_DIR_ENV};
pub use manifest::{
    encode_manifest, parse_manifest, read_manifest, write_manifest, Manifest, ManifestEntry,
};
pub use record::PackageRecord;
pub use scanner::{collect_manifest, scan_descriptors, DescriptorScan, ScannedDescriptor};

#[cfg(test)]
mod tests;
