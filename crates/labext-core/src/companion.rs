//! Companion package discovery.
//!
//! A frontend extension may declare kernel-side and server-side packages it
//! needs. Kernel rules are matched against the kernels available on the
//! server; whatever is found is presented to the user before installing.

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::schema::{CompanionPackage, Discovery, KernelCompanionRule, KernelSpec};

/// A kernel rule together with the kernels it matched (possibly none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelCompanion {
    pub rule: KernelCompanionRule,
    pub kernels: Vec<KernelSpec>,
}

/// What the user is asked to confirm before installing `package`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanionRequest {
    pub package: String,
    pub version: String,
    pub kernel_companions: Vec<KernelCompanion>,
    pub server: Option<CompanionPackage>,
}

fn compile(pattern: &Option<String>) -> Result<Option<Regex>> {
    pattern
        .as_deref()
        .map(|p| {
            Regex::new(p).map_err(|source| Error::InvalidPattern {
                pattern: p.to_string(),
                source,
            })
        })
        .transpose()
}

/// Kernels whose language, or failing that display name, matches the rule.
pub fn match_specs(rule: &KernelCompanionRule, specs: &[KernelSpec]) -> Result<Vec<KernelSpec>> {
    let language = compile(&rule.kernel_spec.language)?;
    let display_name = compile(&rule.kernel_spec.display_name)?;

    Ok(specs
        .iter()
        .filter(|spec| {
            language.as_ref().is_some_and(|re| re.is_match(&spec.language))
                || display_name
                    .as_ref()
                    .is_some_and(|re| re.is_match(&spec.display_name))
        })
        .cloned()
        .collect())
}

/// Match every kernel rule against `specs`, keeping rules with no match.
pub fn kernel_companions(
    rules: &[KernelCompanionRule],
    specs: &[KernelSpec],
) -> Result<Vec<KernelCompanion>> {
    rules
        .iter()
        .map(|rule| {
            Ok(KernelCompanion {
                rule: rule.clone(),
                kernels: match_specs(rule, specs)?,
            })
        })
        .collect()
}

/// Build the confirmation request for a discovery section.
///
/// `specs` is only consulted when kernel rules are declared; `None` then
/// means the server has no kernel specs and is an error. Returns `Ok(None)`
/// when there is nothing to confirm.
pub fn companion_request(
    package: &str,
    version: &str,
    discovery: &Discovery,
    specs: Option<&[KernelSpec]>,
) -> Result<Option<CompanionRequest>> {
    let kernel_companions = match &discovery.kernel {
        Some(rules) => kernel_companions(rules, specs.ok_or(Error::NoKernelSpecs)?)?,
        None => Vec::new(),
    };

    if kernel_companions.is_empty() && discovery.server.is_none() {
        return Ok(None);
    }

    Ok(Some(CompanionRequest {
        package: package.to_string(),
        version: version.to_string(),
        kernel_companions,
        server: discovery.server.clone(),
    }))
}
