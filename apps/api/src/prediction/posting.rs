use serde::Deserialize;

/// Phrases the logo flag was rendered as when the training corpus was built.
pub const LOGO_YES: &str = "company has logo yes";
pub const LOGO_NO: &str = "company has logo no";

/// A job posting as submitted for scoring.
#[derive(Debug, Clone, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub description: String,
    pub company_profile: String,
    pub requirements: String,
    pub benefits: String,
    pub location: String,
    /// `1` means the posting shows a company logo; any other value means it does not.
    pub has_company_logo: i64,
}

impl JobPosting {
    pub fn logo_phrase(&self) -> &'static str {
        if self.has_company_logo == 1 {
            LOGO_YES
        } else {
            LOGO_NO
        }
    }

    /// All fields joined in training order: title, location, company profile,
    /// description, requirements, benefits, logo phrase. Empty fields still
    /// contribute their separator.
    pub fn combined_text(&self) -> String {
        [
            self.title.as_str(),
            self.location.as_str(),
            self.company_profile.as_str(),
            self.description.as_str(),
            self.requirements.as_str(),
            self.benefits.as_str(),
            self.logo_phrase(),
        ]
        .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(logo: i64) -> JobPosting {
        JobPosting {
            title: "T".to_string(),
            description: "D".to_string(),
            company_profile: "C".to_string(),
            requirements: "R".to_string(),
            benefits: "B".to_string(),
            location: "L".to_string(),
            has_company_logo: logo,
        }
    }

    #[test]
    fn test_field_order() {
        assert_eq!(posting(1).combined_text(), "T L C D R B company has logo yes");
    }

    #[test]
    fn test_logo_flag_only_one_means_yes() {
        assert_eq!(posting(1).logo_phrase(), LOGO_YES);
        assert_eq!(posting(0).logo_phrase(), LOGO_NO);
        assert_eq!(posting(2).logo_phrase(), LOGO_NO);
        assert_eq!(posting(-1).logo_phrase(), LOGO_NO);
    }

    #[test]
    fn test_empty_fields_keep_separators() {
        let p = JobPosting {
            title: "Remote Data Entry".to_string(),
            description: String::new(),
            company_profile: String::new(),
            requirements: String::new(),
            benefits: String::new(),
            location: "Remote".to_string(),
            has_company_logo: 0,
        };
        assert_eq!(
            p.combined_text(),
            "Remote Data Entry Remote     company has logo no"
        );
    }

    #[test]
    fn test_deserializes_request_body() {
        let p: JobPosting = serde_json::from_str(
            r#"{"title": "a", "description": "b", "company_profile": "c",
                "requirements": "d", "benefits": "e", "location": "f", "has_company_logo": 1}"#,
        )
        .unwrap();
        assert_eq!(p.company_profile, "c");
        assert_eq!(p.logo_phrase(), LOGO_YES);
    }
}
