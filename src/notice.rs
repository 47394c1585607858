//! Copyright notice printed at startup.

/// Width of the banner line framing the notice.
pub const BANNER_WIDTH: usize = 96;

/// Project and ownership details for the startup notice.
///
/// ```
/// use licencing_middleware::CopyrightNotice;
///
/// let notice = CopyrightNotice::new(
///     "2023",
///     "Company Inc. Headquarter on the moon",
///     "Company Inc.",
///     "Example Project",
///     "Frontend App",
///     "v1.0.0",
/// );
/// assert!(notice.notice().contains("🔑 Example Project | v1.0.0 | Frontend App"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyrightNotice {
    /// Copyright year.
    pub year: String,
    /// Full copyright holder line. Not rendered; the notice names `copyrighter`.
    pub copyright: String,
    /// Short name of the copyright owner, used in the © line and the legal text.
    pub copyrighter: String,
    /// Project name.
    pub project_name: String,
    /// Sub-project name; omitted from the heading when empty.
    pub sub_project_name: String,
    /// Version string.
    pub version: String,
    /// Release note; the block is omitted when empty.
    pub release_note: String,
}

impl CopyrightNotice {
    /// Build a notice without release notes.
    pub fn new(
        year: impl Into<String>,
        copyright: impl Into<String>,
        copyrighter: impl Into<String>,
        project_name: impl Into<String>,
        sub_project_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            year: year.into(),
            copyright: copyright.into(),
            copyrighter: copyrighter.into(),
            project_name: project_name.into(),
            sub_project_name: sub_project_name.into(),
            version: version.into(),
            release_note: String::new(),
        }
    }

    /// Attach a release note.
    pub fn with_release_note(mut self, release_note: impl Into<String>) -> Self {
        self.release_note = release_note.into();
        self
    }

    /// Rendered notice text.
    ///
    /// An empty sub-project drops the ` | <sub>` suffix from the heading,
    /// leaving no trailing space.
    pub fn notice(&self) -> String {
        let banner = "-".repeat(BANNER_WIDTH);
        let owner = &self.copyrighter;
        let heading = if self.sub_project_name.is_empty() {
            format!("{} | {}", self.project_name, self.version)
        } else {
            format!(
                "{} | {} | {}",
                self.project_name, self.version, self.sub_project_name
            )
        };
        let release_notes = if self.release_note.is_empty() {
            String::new()
        } else {
            format!("\nℹ️ Release Notes:\n{}\n\n{banner}\n", self.release_note)
        };

        format!(
            "{banner}
🔑 {heading}

© {year} {owner}, All rights reserved

This Software is protected by copyright law and international treaty provisions.
This Software is subject to the terms and conditions in licenses of
third parties and {owner} will use commercially reasonable efforts
to pass through licenses for Software sublicensed to Customer in providing
{owner}'s Services.

Customer has no right to inspect, possess, use, copy, or attempt to discover the source code
(or any portion thereof) used to create this Software, except to the extent that Customer is
expressly permitted to decompile the Software under applicable law and Customer notifies
{owner} of the intention to decompile this Software
and Customer's reason to do so.
{banner}
{release_notes}",
            year = self.year,
        )
    }

    /// Print the notice to stdout.
    pub fn print(&self) {
        println!("{}", self.notice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> CopyrightNotice {
        CopyrightNotice::new(
            "2023",
            "Company Inc. Headquarter on the moon",
            "Company Inc.",
            "Example Project",
            "Frontend App",
            "v1.0.0",
        )
    }

    #[test]
    fn test_heading_with_sub_project() {
        let text = notice().notice();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "-".repeat(BANNER_WIDTH));
        assert_eq!(lines[1], "🔑 Example Project | v1.0.0 | Frontend App");
        assert_eq!(lines[3], "© 2023 Company Inc., All rights reserved");
    }

    #[test]
    fn test_heading_without_sub_project() {
        let mut notice = notice();
        notice.sub_project_name.clear();
        let text = notice.notice();
        assert_eq!(text.lines().nth(1), Some("🔑 Example Project | v1.0.0"));
        assert!(!text.contains("v1.0.0 \n"));
    }

    #[test]
    fn test_ownership_line_names_copyrighter() {
        let notice = CopyrightNotice::new(
            "2024",
            "Acme Holdings, 1 Rocket Road",
            "Acme",
            "Launcher",
            "",
            "v2",
        );
        let text = notice.notice();
        assert!(text.contains("\n© 2024 Acme, All rights reserved\n"));
        assert!(!text.contains("Rocket Road"));
    }

    #[test]
    fn test_owner_named_in_legal_text() {
        let text = notice().notice();
        assert!(text.contains("third parties and Company Inc. will use"));
        assert!(text.contains("Company Inc.'s Services."));
        assert!(text.contains("Company Inc. of the intention to decompile"));
    }

    #[test]
    fn test_no_release_note_block_by_default() {
        let text = notice().notice();
        assert!(!text.contains("Release Notes"));
        assert_eq!(text.matches(&"-".repeat(BANNER_WIDTH)).count(), 2);
    }

    #[test]
    fn test_release_note_block() {
        let text = notice().with_release_note("Fixed the moon base.").notice();
        assert!(text.contains("ℹ️ Release Notes:\nFixed the moon base.\n"));
        assert_eq!(text.matches(&"-".repeat(BANNER_WIDTH)).count(), 3);
        assert!(text.ends_with(&format!("{}\n", "-".repeat(BANNER_WIDTH))));
    }
}
