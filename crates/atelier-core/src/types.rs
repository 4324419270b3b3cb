use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Contract implemented by every admin-managed record type.
///
/// The façade is generic over this trait: it supplies the REST collection
/// path, the tag used in logs, the fields a create payload must carry, and
/// the fixed set of fields the list-page search looks at.
pub trait AdminRecord: Clone + Serialize + DeserializeOwned {
    /// REST collection path relative to the API base URL, e.g. `members`.
    const PATH: &'static str;
    /// Short resource tag used for logging.
    const NAME: &'static str;
    /// Fields a create payload must contain before any network call.
    const REQUIRED_FIELDS: &'static [&'static str];

    /// Server-assigned immutable identifier.
    fn record_id(&self) -> u64;

    /// Field values the client-side substring search matches against.
    fn search_text(&self) -> Vec<&str>;
}

fn str_opt(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// Authenticated session material persisted between launches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Bearer token attached to every outgoing request.
    pub token: String,
    /// Email the session was established for.
    pub user_email: String,
}

/// Login form input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Body of a successful or failed `/login` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LoginOutcome {
    /// Whether the backend accepted the credentials.
    #[serde(default)]
    pub success: bool,
    /// Bearer token issued on success.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Optional server-side message (e.g. "invalid credentials").
    #[serde(default)]
    pub message: Option<String>,
}

/// Team member shown on the about page and managed in the back office.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Member {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub projects_involved: Option<String>,
    /// Profile image URL served by the backend.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
}

impl AdminRecord for Member {
    const PATH: &'static str = "members";
    const NAME: &'static str = "members";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "email"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.name.as_str()),
            str_opt(&self.email),
            str_opt(&self.department),
            str_opt(&self.position),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Portfolio project entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Project {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub key_results: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AdminRecord for Project {
    const PATH: &'static str = "projects";
    const NAME: &'static str = "projects";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title", "description", "category"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            str_opt(&self.category),
            str_opt(&self.client),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Service offering shown on the services page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Service {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AdminRecord for Service {
    const PATH: &'static str = "services";
    const NAME: &'static str = "services";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title", "description"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [Some(self.title.as_str()), str_opt(&self.description)]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// News/blog article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NewsItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Display-ready estimate like `"4 min"`.
    #[serde(default)]
    pub read_time: Option<String>,
    /// Whether the article is pinned to the featured slot.
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl AdminRecord for NewsItem {
    const PATH: &'static str = "news";
    const NAME: &'static str = "news";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            str_opt(&self.category),
            str_opt(&self.author),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Frequently asked question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Faq {
    pub id: u64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AdminRecord for Faq {
    const PATH: &'static str = "faqs";
    const NAME: &'static str = "faqs";
    const REQUIRED_FIELDS: &'static [&'static str] = &["question", "answer"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.question.as_str(), self.answer.as_str()]
    }
}

/// Client testimonial quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Testimonial {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Quote body.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AdminRecord for Testimonial {
    const PATH: &'static str = "testimonials";
    const NAME: &'static str = "testimonials";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "text"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.name.as_str()),
            str_opt(&self.role),
            str_opt(&self.text),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Gallery image entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GalleryItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl AdminRecord for GalleryItem {
    const PATH: &'static str = "galleries";
    const NAME: &'static str = "galleries";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [Some(self.title.as_str()), str_opt(&self.description)]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Open job position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Career {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Employment type, e.g. `Full-time`.
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub benefits: Option<String>,
}

impl AdminRecord for Career {
    const PATH: &'static str = "careers";
    const NAME: &'static str = "careers";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title", "description", "requirements"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            str_opt(&self.department),
            str_opt(&self.location),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Inbound contact-form submission.
///
/// `company_name` is spelled `Company_name` on the wire; the rename keeps the
/// Rust side conventional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ContactMessage {
    pub id: u64,
    pub name: String,
    #[serde(rename = "Company_name", default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Services the prospect asked about.
    #[serde(default)]
    pub services: Option<String>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub project_details: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AdminRecord for ContactMessage {
    const PATH: &'static str = "contacts";
    const NAME: &'static str = "contacts";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "email"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.name.as_str()),
            str_opt(&self.company_name),
            str_opt(&self.email),
            str_opt(&self.services),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Site-wide settings record (single row, but served as a collection).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SiteSettings {
    pub id: u64,
    pub company_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    /// Lifetime visit counter maintained by the backend.
    #[serde(default)]
    pub visits: Option<u64>,
}

impl AdminRecord for SiteSettings {
    const PATH: &'static str = "settings";
    const NAME: &'static str = "settings";
    const REQUIRED_FIELDS: &'static [&'static str] = &["company_name", "email"];

    fn record_id(&self) -> u64 {
        self.id
    }

    fn search_text(&self) -> Vec<&str> {
        [Some(self.company_name.as_str()), str_opt(&self.email)]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_wire_name_round_trips() {
        let raw = serde_json::json!({
            "id": 4,
            "name": "Dana",
            "Company_name": "Acme GmbH",
            "email": "dana@acme.example",
            "budget": 25_000
        });

        let contact: ContactMessage =
            serde_json::from_value(raw).expect("contact should deserialize");
        assert_eq!(contact.company_name.as_deref(), Some("Acme GmbH"));

        let back = serde_json::to_value(&contact).expect("contact should serialize");
        assert_eq!(back["Company_name"], "Acme GmbH");
    }

    #[test]
    fn records_tolerate_sparse_rows() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Lee"
        }))
        .expect("sparse member row should deserialize");
        assert_eq!(member.record_id(), 1);
        assert_eq!(member.search_text(), vec!["Lee"]);
    }

    #[test]
    fn search_text_skips_empty_optionals() {
        let faq = Faq {
            id: 9,
            question: "How long does a project take?".to_owned(),
            answer: "Depends on scope.".to_owned(),
            created_at: None,
        };
        assert_eq!(
            faq.search_text(),
            vec!["How long does a project take?", "Depends on scope."]
        );

        let career = Career {
            id: 2,
            title: "Rust Engineer".to_owned(),
            department: Some(String::new()),
            ..Career::default()
        };
        assert_eq!(career.search_text(), vec!["Rust Engineer"]);
    }
}
