use std::{
    path::{Component, Path},
    sync::LazyLock,
};

use regex::Regex;

use crate::validation::{ValidationErrorCategory, ValidationIssue, ValidationIssues};

use super::AppConfig;

/// `vendor/name`, lowercase, the naming rule of the package registry.
static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([_.-]?[a-z0-9]+)*/[a-z0-9](([_.]|-{1,2})?[a-z0-9]+)*$")
        .expect("package name regex is valid")
});

impl AppConfig {
    /// Full validation for the `AppConfig`
    ///
    #[must_use]
    pub fn validate(&self) -> ValidationIssues {
        let mut issues = validate_vendor_dir(&self.vendor_dir);

        if let Some(registry_file) = self.registry_file.as_deref() {
            if !expand_tilde(registry_file).is_absolute() {
                issues.push(ValidationIssue::error(
                    ValidationErrorCategory::PathFormat,
                    "registry_file",
                    "The path at `registry_file` is not absolute",
                    Some("Provide an absolute path, or remove the field to use <vendor_dir>/installed.json"),
                ));
            }
        }

        if self.deployment.is_empty() {
            issues.push(ValidationIssue::warning(
                ValidationErrorCategory::RequiredField,
                "deployment",
                "No package has deployment rules, nothing will be cleaned",
                Some("Add a package under `deployment`. Ex. `twig/twig: [src, LICENSE]`"),
            ));
        }

        for (package_name, patterns) in &self.deployment {
            issues.extend(validate_rules(package_name, patterns));
        }

        issues.into()
    }
}

fn expand_tilde(path: &Path) -> std::path::PathBuf {
    let path = path.to_string_lossy();
    std::path::PathBuf::from(shellexpand::tilde(&path).as_ref())
}

fn validate_vendor_dir(vendor_dir: &Path) -> Vec<ValidationIssue> {
    if vendor_dir.as_os_str().to_string_lossy().trim().is_empty() {
        return vec![ValidationIssue::error(
            ValidationErrorCategory::RequiredField,
            "vendor_dir",
            "The `vendor_dir` field exists, but has no value",
            Some("Set a value for `vendor_dir`. Ex. `vendor_dir: /srv/app/vendor`"),
        )];
    }

    if expand_tilde(vendor_dir).is_absolute() {
        Vec::new()
    } else {
        vec![ValidationIssue::error(
            ValidationErrorCategory::PathFormat,
            "vendor_dir",
            "The path at `vendor_dir` is not absolute",
            Some("Provide an absolute path, or one starting with `~`"),
        )]
    }
}

fn validate_rules(package_name: &str, patterns: &[String]) -> Vec<ValidationIssue> {
    let field = format!("deployment.{package_name}");
    let mut issues = Vec::new();

    if !PACKAGE_NAME.is_match(package_name) {
        issues.push(ValidationIssue::error(
            ValidationErrorCategory::InvalidValue,
            &field,
            &format!("'{package_name}' is not a valid package name"),
            Some("Package names look like `vendor/name`, in lowercase"),
        ));
    }

    if patterns.is_empty() {
        issues.push(ValidationIssue::warning(
            ValidationErrorCategory::RequiredField,
            &field,
            "No patterns listed, the package would be skipped",
            Some("List the paths to keep, relative to the package directory"),
        ));
    }

    for pattern in patterns {
        if let Some(issue) = validate_pattern(&field, pattern) {
            issues.push(issue);
        }
    }

    issues
}

fn validate_pattern(field: &str, pattern: &str) -> Option<ValidationIssue> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Some(ValidationIssue::error(
            ValidationErrorCategory::RequiredField,
            field,
            "A pattern is blank",
            Some("Remove the blank entry"),
        ));
    }

    let path = Path::new(trimmed);
    if path.has_root() {
        return Some(ValidationIssue::error(
            ValidationErrorCategory::PathFormat,
            field,
            &format!("Pattern '{trimmed}' is absolute"),
            Some("Patterns are relative to the package directory. Ex. `src/*.php`"),
        ));
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return Some(ValidationIssue::error(
            ValidationErrorCategory::PathFormat,
            field,
            &format!("Pattern '{trimmed}' leaves the package directory"),
            Some("Remove the `..` components"),
        ));
    }

    glob::Pattern::new(trimmed).err().map(|e| {
        ValidationIssue::error(
            ValidationErrorCategory::PatternSyntax,
            field,
            &format!("Pattern '{trimmed}' is not a valid glob: {}", e.msg),
            Some("Check for unbalanced `[` brackets"),
        )
    })
}
