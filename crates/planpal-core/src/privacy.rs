//! Static privacy policy.

use std::fmt::Write as _;

use chrono::NaiveDate;

/// A numbered section of the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacySection {
    /// Section heading, without its number.
    pub heading: &'static str,
    /// Introductory paragraph.
    pub body: &'static str,
    /// Bullet points following the paragraph.
    pub bullets: &'static [&'static str],
}

/// The privacy policy page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyPolicy {
    /// Page title.
    pub title: &'static str,
    /// When the policy last changed.
    pub last_updated: NaiveDate,
    /// Ordered sections.
    pub sections: &'static [PrivacySection],
}

const SECTIONS: &[PrivacySection] = &[
    PrivacySection {
        heading: "Introduction",
        body: "Welcome to PlanPal (\"we\", \"us\" or \"our\"). This policy explains how we \
               collect, use and share information when you use our AI-powered calendar \
               assistant.",
        bullets: &[],
    },
    PrivacySection {
        heading: "Information We Collect",
        body: "We collect only what the assistant needs to work:",
        bullets: &[
            "Google Account Information: your name and email address, to personalize your experience.",
            "Google Calendar Data: read and write access to your primary Google Calendar, to view, \
             create, modify and delete events based on your commands.",
            "Authentication Tokens: an application token is stored on your device to interact with \
             your calendar on your behalf. It is not stored on our servers.",
        ],
    },
    PrivacySection {
        heading: "How We Use Your Information",
        body: "Your data is used exclusively to provide PlanPal's features, such as processing your \
               commands, checking for scheduling conflicts and personalizing the interface.",
        bullets: &[],
    },
    PrivacySection {
        heading: "How We Share Your Information",
        body: "We do not sell your personal data. Information is only shared with essential \
               third-party services:",
        bullets: &[
            "Google LLC: all calendar interactions are processed through Google's own API, adhering \
             to the Google API Services User Data Policy.",
            "Mistral AI: your natural language commands are sent to the Mistral AI API to be \
             understood and processed.",
        ],
    },
    PrivacySection {
        heading: "Data Security",
        body: "Your authentication token is stored on your device with owner-only permissions. All \
               communication between the app and our servers is encrypted using HTTPS.",
        bullets: &[],
    },
    PrivacySection {
        heading: "Your Rights and Choices",
        body: "You can revoke PlanPal's access to your Google Account at any time from the Google \
               Account permissions page: https://myaccount.google.com/permissions",
        bullets: &[],
    },
    PrivacySection {
        heading: "Contact Us",
        body: "If you have any questions, please contact us at prakhar.srivastava0509@gmail.com.",
        bullets: &[],
    },
];

impl PrivacyPolicy {
    /// Returns the current policy.
    pub fn current() -> Self {
        Self {
            title: "Privacy Policy for PlanPal",
            last_updated: NaiveDate::from_ymd_opt(2025, 10, 3).unwrap_or_default(),
            sections: SECTIONS,
        }
    }

    /// Renders the policy as plain text.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(
            out,
            "Last Updated: {}",
            self.last_updated.format("%B %-d, %Y")
        );

        for (index, section) in self.sections.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}. {}", index + 1, section.heading);
            let _ = writeln!(out, "{}", section.body);
            for bullet in section.bullets {
                let _ = writeln!(out, "  - {}", bullet);
            }
        }

        out
    }
}

impl Default for PrivacyPolicy {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_header() {
        let text = PrivacyPolicy::current().render_text();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Privacy Policy for PlanPal"));
        assert_eq!(lines.next(), Some("Last Updated: October 3, 2025"));
    }

    #[test]
    fn sections_are_numbered_in_order() {
        let text = PrivacyPolicy::current().render_text();
        assert!(text.contains("1. Introduction"));
        assert!(text.contains("4. How We Share Your Information"));
        assert!(text.contains("7. Contact Us"));
        let intro = text.find("1. Introduction").unwrap();
        let contact = text.find("7. Contact Us").unwrap();
        assert!(intro < contact);
    }

    #[test]
    fn bullets_are_indented() {
        let text = PrivacyPolicy::current().render_text();
        assert!(text.contains("\n  - Google LLC:"));
    }
}
