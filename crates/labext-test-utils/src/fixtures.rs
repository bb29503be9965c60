//! Builders for wire records and entries.

use labext_core::schema::{
    CompanionBase, CompanionPackage, Discovery, InstalledRecord, KernelCompanionRule,
    KernelSpecPattern, LabMetadata, PackageLinks, PackageMetadata, RegistryPackage, SearchObject,
    SearchPage,
};
use labext_core::{Entry, EntryStatus, KernelSpec, PackageType};

/// An installed, enabled extension at `version` whose latest release is
/// also `version`.
pub fn installed_record(name: &str, version: &str) -> InstalledRecord {
    InstalledRecord {
        name: name.to_string(),
        description: format!("{name} (installed)"),
        url: format!("https://github.com/example/{}", name.replace('/', "-")),
        installed: true,
        enabled: true,
        latest_version: version.to_string(),
        installed_version: version.to_string(),
        status: Some(EntryStatus::Ok),
        pkg_type: Some(PackageType::Prebuilt),
    }
}

/// A registry package at `version`.
pub fn registry_package(name: &str, version: &str) -> RegistryPackage {
    RegistryPackage {
        name: name.to_string(),
        description: format!("{name} (registry)"),
        version: version.to_string(),
        keywords: vec!["jupyterlab-extension".to_string()],
        links: PackageLinks {
            homepage: None,
            repository: None,
            npm: format!("https://www.npmjs.com/package/{name}"),
        },
    }
}

/// A registry package flagged deprecated through its keywords.
pub fn deprecated_package(name: &str, version: &str) -> RegistryPackage {
    let mut pkg = registry_package(name, version);
    pkg.keywords.push("deprecated".to_string());
    pkg
}

/// A search page whose total equals the number of packages.
pub fn search_page(packages: Vec<RegistryPackage>) -> SearchPage {
    SearchPage {
        total: packages.len(),
        objects: packages
            .into_iter()
            .map(|package| SearchObject { package })
            .collect(),
    }
}

/// A not-installed entry as it appears in search results.
pub fn search_entry(name: &str, latest: &str) -> Entry {
    Entry::from_registry(&registry_package(name, latest)).expect("fixture name is non-empty")
}

/// An installed entry.
pub fn installed_entry(name: &str, installed: &str, latest: &str) -> Entry {
    let mut record = installed_record(name, installed);
    record.latest_version = latest.to_string();
    Entry::from_installed(record).expect("fixture name is non-empty")
}

pub fn kernel_spec(name: &str, language: &str, display_name: &str) -> KernelSpec {
    KernelSpec {
        name: name.to_string(),
        language: language.to_string(),
        display_name: display_name.to_string(),
    }
}

/// Metadata declaring a kernel companion for kernels whose language matches
/// `language`.
pub fn kernel_companion_metadata(language: &str, base: &str) -> PackageMetadata {
    discovery_metadata(Discovery {
        kernel: Some(vec![KernelCompanionRule {
            kernel_spec: KernelSpecPattern {
                language: Some(language.to_string()),
                display_name: None,
            },
            package: CompanionPackage {
                base: Some(CompanionBase {
                    name: base.to_string(),
                }),
                managers: vec!["pip".to_string(), "conda".to_string()],
            },
        }]),
        server: None,
    })
}

/// Metadata declaring a server companion.
pub fn server_companion_metadata(base: &str) -> PackageMetadata {
    discovery_metadata(Discovery {
        kernel: None,
        server: Some(CompanionPackage {
            base: Some(CompanionBase {
                name: base.to_string(),
            }),
            managers: vec!["pip".to_string()],
        }),
    })
}

/// Metadata without a discovery section.
pub fn plain_metadata() -> PackageMetadata {
    PackageMetadata {
        jupyterlab: Some(LabMetadata { discovery: None }),
    }
}

fn discovery_metadata(discovery: Discovery) -> PackageMetadata {
    PackageMetadata {
        jupyterlab: Some(LabMetadata {
            discovery: Some(discovery),
        }),
    }
}
