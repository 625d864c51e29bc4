//! Robots.txt policy
//!
//! Allow/deny decisions are delegated to the robotstxt crate. Crawl-delay is
//! not part of that crate's matcher, so it is read here with a small
//! group-aware scan.

use robotstxt::DefaultMatcher;

/// A site's robots policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RobotsPolicy {
    /// No usable robots.txt: everything is allowed
    #[default]
    AllowAll,

    /// Raw robots.txt body, evaluated on demand
    Rules(String),
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    ///
    /// An empty body is the same as having no robots.txt at all.
    pub fn from_content(content: &str) -> Self {
        if content.trim().is_empty() {
            Self::AllowAll
        } else {
            Self::Rules(content.to_string())
        }
    }

    /// Creates the permissive fallback policy
    pub fn allow_all() -> Self {
        Self::AllowAll
    }

    /// Returns true when this is the permissive fallback
    pub fn is_permissive(&self) -> bool {
        matches!(self, Self::AllowAll)
    }

    /// Checks if a URL is allowed for the given product token
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The product token robots groups are matched against
    /// * `url` - Absolute URL (or path) to check
    pub fn can_fetch(&self, user_agent: &str, url: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Rules(body) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, user_agent, url)
            }
        }
    }

    /// Gets the crawl delay in seconds for a user agent
    ///
    /// A group naming the agent wins over the `*` group. Unparsable values
    /// are ignored.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let body = match self {
            Self::AllowAll => return None,
            Self::Rules(body) => body,
        };

        let agent = user_agent.to_lowercase();
        let mut group: Vec<String> = Vec::new();
        let mut group_open = false;
        let mut for_agent: Option<f64> = None;
        let mut for_wildcard: Option<f64> = None;

        for line in body.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                // Consecutive user-agent lines share one group
                if !group_open {
                    group.clear();
                    group_open = true;
                }
                group.push(value.to_lowercase());
                continue;
            }
            group_open = false;

            if key != "crawl-delay" {
                continue;
            }
            let Ok(delay) = value.parse::<f64>() else {
                continue;
            };
            if !delay.is_finite() || delay < 0.0 {
                continue;
            }

            if group
                .iter()
                .any(|ua| !ua.is_empty() && ua != "*" && agent.contains(ua.as_str()))
            {
                for_agent.get_or_insert(delay);
            } else if group.iter().any(|ua| ua == "*") {
                for_wildcard.get_or_insert(delay);
            }
        }

        for_agent.or(for_wildcard)
    }
}
