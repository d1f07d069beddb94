//! Site configuration model.
//!
//! The configuration is a singleton: at most one record exists, and reads on an
//! empty store fall back to the hardcoded defaults below.

use serde::{Deserialize, Serialize};

/// Default values served before any configuration has been written.
pub mod defaults {
    pub const TITLE: &str = "UniUnity.space";
    pub const FAVICON: &str = "/favicon.ico";
    pub const BANNER_HEADING: &str = "Future-Proof Growth";
    pub const BANNER_SUBTEXT: &str = "Practical programs that compound over a career.";
    pub const SEO_TITLE: &str = "UniUnity.space — Future-Proof Growth";
    pub const SEO_DESCRIPTION: &str =
        "Courses, cohorts, and career tooling for lifelong learners.";
    pub const ADMIN_USERNAME: &str = "admin";
}

/// Hero banner shown on the homepage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub heading: String,
    pub subtext: String,
}

/// Site-wide SEO metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
}

/// Optional promotional block on the homepage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HomepageAd {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The singleton site configuration.
///
/// Credentials are never stored here; the admin password hash lives on the
/// canonical credential record and is rotated through the config endpoint only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub title: String,
    pub favicon: String,
    pub banner: Banner,
    pub seo: SeoMeta,
    pub homepage_ad: HomepageAd,
    pub admin_username: String,
    pub updated_at: String,
    /// Version counter for conditional writes.
    #[serde(default)]
    pub version: i64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: defaults::TITLE.to_string(),
            favicon: defaults::FAVICON.to_string(),
            banner: Banner {
                heading: defaults::BANNER_HEADING.to_string(),
                subtext: defaults::BANNER_SUBTEXT.to_string(),
            },
            seo: SeoMeta {
                title: defaults::SEO_TITLE.to_string(),
                description: defaults::SEO_DESCRIPTION.to_string(),
            },
            homepage_ad: HomepageAd::default(),
            admin_username: defaults::ADMIN_USERNAME.to_string(),
            updated_at: String::new(),
            version: 0,
        }
    }
}

/// Request body for updating the configuration.
///
/// Supplied top-level keys replace prior values wholesale (nested objects are
/// not deep-merged); omitted keys are retained. A new admin password requires
/// `current_password` whenever a credential already exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_ad: Option<HomepageAd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    /// Expected version for optimistic concurrency control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_shape() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "UniUnity.space");
        assert_eq!(config.banner.heading, "Future-Proof Growth");
        assert!(!config.banner.subtext.is_empty());
        assert!(!config.seo.title.is_empty());
        assert!(config.homepage_ad.text.is_none());
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.version, 0);
    }
}
