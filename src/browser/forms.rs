// Login form discovery
//
// Finds the <form> holding the credential fields and collects what a browser
// would submit alongside them: hidden inputs (CSRF tokens, state) and the
// named submit control. Regex over markup, same tolerance as the extractor.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref FORM_PATTERN: Regex = Regex::new(r"(?is)<form\b([^>]*)>(.*?)(?:</form\s*>|$)").unwrap();
    static ref CONTROL_PATTERN: Regex = Regex::new(r"(?is)<(input|button|select|textarea)\b([^>]*)>").unwrap();
    static ref ATTR_PATTERN: Regex = Regex::new(
        r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#
    ).unwrap();
}

/// A form control as it appears in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub tag: String,
    pub attrs: HashMap<String, String>,
}

impl FormControl {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|s| s.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name").filter(|n| !n.is_empty())
    }

    fn input_type(&self) -> String {
        match self.tag.as_str() {
            "button" => self.attr("type").unwrap_or("submit").to_ascii_lowercase(),
            "input" => self.attr("type").unwrap_or("text").to_ascii_lowercase(),
            other => other.to_string(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.tag == "input" && self.input_type() == "hidden"
    }

    pub fn is_submit(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "button")
            && matches!(self.input_type().as_str(), "submit" | "image")
    }
}

/// A parsed <form>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Raw `action` attribute; `None` means the form posts to its own page.
    pub action: Option<String>,
    /// Lower-cased `method`, `get` when absent.
    pub method: String,
    pub controls: Vec<FormControl>,
}

impl LoginForm {
    pub fn has_field(&self, name: &str) -> bool {
        self.controls.iter().any(|c| c.name() == Some(name))
    }

    pub fn is_post(&self) -> bool {
        self.method == "post"
    }

    /// Name/value pairs to submit: hidden inputs, then the credentials, then
    /// the submit control whose id is `submit_id` if it carries a name.
    pub fn submission(&self, credentials: &[(String, String)], submit_id: &str) -> Vec<(String, String)> {
        let credential_names: Vec<&str> = credentials.iter().map(|(n, _)| n.as_str()).collect();
        let mut fields: Vec<(String, String)> = self
            .controls
            .iter()
            .filter(|c| c.is_hidden())
            .filter_map(|c| {
                let name = c.name()?;
                if credential_names.contains(&name) {
                    return None;
                }
                Some((name.to_string(), c.attr("value").unwrap_or("").to_string()))
            })
            .collect();

        fields.extend(credentials.iter().cloned());

        if let Some(submit) = self
            .controls
            .iter()
            .find(|c| c.is_submit() && c.attr("id") == Some(submit_id))
        {
            if let Some(name) = submit.name() {
                fields.push((name.to_string(), submit.attr("value").unwrap_or("").to_string()));
            }
        }
        fields
    }
}

/// All forms in the markup, in document order.
pub fn parse_forms(markup: &str) -> Vec<LoginForm> {
    FORM_PATTERN
        .captures_iter(markup)
        .map(|cap| {
            let attrs = parse_attrs(cap.get(1).map_or("", |m| m.as_str()));
            let body = cap.get(2).map_or("", |m| m.as_str());
            LoginForm {
                action: attrs.get("action").cloned().filter(|a| !a.trim().is_empty()),
                method: attrs
                    .get("method")
                    .map(|m| m.to_ascii_lowercase())
                    .unwrap_or_else(|| "get".to_string()),
                controls: parse_controls(body),
            }
        })
        .collect()
}

/// First form that contains every field in `field_names`.
pub fn find_login_form(markup: &str, field_names: &[&str]) -> Option<LoginForm> {
    parse_forms(markup)
        .into_iter()
        .find(|form| field_names.iter().all(|f| form.has_field(f)))
}

/// Fields from `field_names` that no form on the page carries.
pub fn missing_fields<'a>(markup: &str, field_names: &[&'a str]) -> Vec<&'a str> {
    let forms = parse_forms(markup);
    field_names
        .iter()
        .filter(|f| !forms.iter().any(|form| form.has_field(f)))
        .copied()
        .collect()
}

fn parse_controls(body: &str) -> Vec<FormControl> {
    CONTROL_PATTERN
        .captures_iter(body)
        .map(|cap| FormControl {
            tag: cap[1].to_ascii_lowercase(),
            attrs: parse_attrs(cap.get(2).map_or("", |m| m.as_str())),
        })
        .collect()
}

fn parse_attrs(raw: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for cap in ATTR_PATTERN.captures_iter(raw) {
        let name = cap[1].to_ascii_lowercase();
        let value = cap
            .get(2)
            .or_else(|| cap.get(3))
            .or_else(|| cap.get(4))
            .map_or("", |m| m.as_str());
        // first occurrence wins, as in HTML
        attrs.entry(name).or_insert_with(|| value.to_string());
    }
    attrs
}
