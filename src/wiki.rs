//! Pages, revisions and the bits of site configuration needed to turn a page
//! into a display title and a URL.

// Reference:
// - https://www.mediawiki.org/wiki/Manual:Namespace#Built-in_namespaces
// - https://www.mediawiki.org/wiki/Manual:$wgArticlePath
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const NS_MEDIA: i32 = -2;
pub const NS_SPECIAL: i32 = -1;
pub const NS_MAIN: i32 = 0;
pub const NS_TALK: i32 = 1;
pub const NS_USER: i32 = 2;
pub const NS_USER_TALK: i32 = 3;
pub const NS_PROJECT: i32 = 4;
pub const NS_PROJECT_TALK: i32 = 5;
pub const NS_FILE: i32 = 6;
pub const NS_FILE_TALK: i32 = 7;
pub const NS_MEDIAWIKI: i32 = 8;
pub const NS_MEDIAWIKI_TALK: i32 = 9;
pub const NS_TEMPLATE: i32 = 10;
pub const NS_TEMPLATE_TALK: i32 = 11;
pub const NS_HELP: i32 = 12;
pub const NS_HELP_TALK: i32 = 13;
pub const NS_CATEGORY: i32 = 14;
pub const NS_CATEGORY_TALK: i32 = 15;

// Canonical names, used when the site doesn't provide its own
pub const NAMESPACES: [(i32, &str); 18] = [
    (NS_MEDIA, "Media"),
    (NS_SPECIAL, "Special"),
    (NS_MAIN, ""),
    (NS_TALK, "Talk"),
    (NS_USER, "User"),
    (NS_USER_TALK, "User talk"),
    (NS_PROJECT, "Project"),
    (NS_PROJECT_TALK, "Project talk"),
    (NS_FILE, "File"),
    (NS_FILE_TALK, "File talk"),
    (NS_MEDIAWIKI, "MediaWiki"),
    (NS_MEDIAWIKI_TALK, "MediaWiki talk"),
    (NS_TEMPLATE, "Template"),
    (NS_TEMPLATE_TALK, "Template talk"),
    (NS_HELP, "Help"),
    (NS_HELP_TALK, "Help talk"),
    (NS_CATEGORY, "Category"),
    (NS_CATEGORY_TALK, "Category talk"),
];

// Symbolic names accepted by the namespace filter
pub const NAMESPACE_CONSTANTS: [(&str, i32); 19] = [
    ("NS_MEDIA", NS_MEDIA),
    ("NS_SPECIAL", NS_SPECIAL),
    ("NS_MAIN", NS_MAIN),
    ("NS_TALK", NS_TALK),
    ("NS_USER", NS_USER),
    ("NS_USER_TALK", NS_USER_TALK),
    ("NS_PROJECT", NS_PROJECT),
    ("NS_PROJECT_TALK", NS_PROJECT_TALK),
    ("NS_FILE", NS_FILE),
    ("NS_FILE_TALK", NS_FILE_TALK),
    ("NS_IMAGE", NS_FILE),
    ("NS_MEDIAWIKI", NS_MEDIAWIKI),
    ("NS_MEDIAWIKI_TALK", NS_MEDIAWIKI_TALK),
    ("NS_TEMPLATE", NS_TEMPLATE),
    ("NS_TEMPLATE_TALK", NS_TEMPLATE_TALK),
    ("NS_HELP", NS_HELP),
    ("NS_HELP_TALK", NS_HELP_TALK),
    ("NS_CATEGORY", NS_CATEGORY),
    ("NS_CATEGORY_TALK", NS_CATEGORY_TALK),
];

/// Resolve `NS_MAIN`-style constants or plain numbers to a namespace id.
pub fn namespace_id(name: &str) -> Option<i32> {
    let name = name.trim();
    NAMESPACE_CONSTANTS
        .iter()
        .find(|(constant, _)| constant.eq_ignore_ascii_case(name))
        .map(|(_, id)| *id)
        .or_else(|| name.parse().ok())
}

fn canonical_namespaces() -> BTreeMap<i32, String> {
    NAMESPACES
        .iter()
        .map(|(id, name)| (*id, name.to_string()))
        .collect()
}

/// A wiki page as delivered by the dump host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageHandle {
    pub namespace: i32,
    /// Title without the namespace prefix, in db key form (underscores)
    pub title: String,
    pub id: u64,
    pub is_redirect: bool,
}

impl PageHandle {
    pub fn new(namespace: i32, title: &str, id: u64, is_redirect: bool) -> Self {
        Self {
            namespace,
            title: Title::new(namespace, title).dbkey,
            id,
            is_redirect,
        }
    }

    pub fn title(&self) -> Title {
        Title::new(self.namespace, &self.title)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevisionRecord {
    pub id: u64,
    pub page_id: u64,
    pub text: String,
}

impl RevisionRecord {
    pub fn new(id: u64, page_id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            page_id,
            text: text.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Title {
    namespace: i32,
    dbkey: String,
}

impl Title {
    pub fn new(namespace: i32, text: &str) -> Self {
        Self {
            namespace,
            dbkey: text.trim().replace(' ', "_"),
        }
    }

    pub fn namespace(&self) -> i32 {
        self.namespace
    }

    pub fn dbkey(&self) -> &str {
        &self.dbkey
    }

    /// The title as readers see it, without the namespace
    pub fn text(&self) -> String {
        self.dbkey.replace('_', " ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteConfig {
    pub sitename: String,
    /// Scheme and host, e.g. `https://en.wikipedia.org`
    pub server: String,
    /// Path with a `$1` placeholder for the title, e.g. `/wiki/$1`
    pub article_path: String,
    #[serde(default = "canonical_namespaces")]
    pub namespaces: BTreeMap<i32, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sitename: "MediaWiki".to_string(),
            server: "http://localhost".to_string(),
            article_path: "/wiki/$1".to_string(),
            namespaces: canonical_namespaces(),
        }
    }
}

impl SiteConfig {
    /// Split a dump's `<base>` URL (the main page URL) into server and article path.
    pub fn from_base_url(sitename: &str, base: &str) -> Self {
        let (server, path) = split_server(base);
        let article_path = article_path_of(path);

        Self {
            sitename: sitename.to_string(),
            server: server.to_string(),
            article_path,
            namespaces: canonical_namespaces(),
        }
    }

    /// Replace server and article path using a base URL, keeping everything else.
    pub fn set_base_url(&mut self, base: &str) {
        let parsed = Self::from_base_url(&self.sitename, base);
        self.server = parsed.server;
        self.article_path = parsed.article_path;
    }

    pub fn namespace_name(&self, namespace: i32) -> Option<&str> {
        self.namespaces.get(&namespace).map(String::as_str).or_else(|| {
            NAMESPACES
                .iter()
                .find(|(id, _)| *id == namespace)
                .map(|(_, name)| *name)
        })
    }

    /// `Namespace:Title text`, or just the text for the main namespace.
    pub fn prefixed_text(&self, title: &Title) -> String {
        match self.namespace_name(title.namespace) {
            Some(name) if !name.is_empty() => format!("{}:{}", name, title.text()),
            _ => title.text(),
        }
    }

    pub fn prefixed_dbkey(&self, title: &Title) -> String {
        self.prefixed_text(title).replace(' ', "_")
    }

    pub fn full_url(&self, title: &Title) -> String {
        let path = self
            .article_path
            .replace("$1", &url_encode(&self.prefixed_dbkey(title)));
        format!("{}{}", self.server, path)
    }
}

fn split_server(url: &str) -> (&str, &str) {
    let host_start = url.find("://").map(|idx| idx + 3).unwrap_or(0);
    match url[host_start..].find('/') {
        Some(idx) => url.split_at(host_start + idx),
        None => (url, ""),
    }
}

// Swap the main page title in a base URL path for `$1`.
//
// `/w/index.php?title=Main_Page` keeps its query. Otherwise the title starts
// after the script (`/w/index.php/`) or after the first segment (`/wiki/`),
// since titles may contain slashes themselves.
fn article_path_of(path: &str) -> String {
    if let Some((script, query)) = path.split_once('?') {
        if !query.split('&').any(|param| param.starts_with("title=")) {
            return article_path_of(script);
        }
        let query = query
            .split('&')
            .map(|param| if param.starts_with("title=") { "title=$1" } else { param })
            .collect::<Vec<_>>()
            .join("&");
        return format!("{}?{}", script, query);
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let prefix_len = match segments.iter().position(|segment| segment.ends_with(".php")) {
        Some(idx) => idx + 1,
        None if segments.len() > 1 => 1,
        None => 0,
    };

    let mut article_path = String::from("/");
    for segment in &segments[..prefix_len] {
        article_path.push_str(segment);
        article_path.push('/');
    }
    article_path.push_str("$1");
    article_path
}

// Characters MediaWiki leaves readable in title URLs
const URL_UNESCAPES: [(&str, &str); 10] = [
    ("%3B", ";"),
    ("%40", "@"),
    ("%24", "$"),
    ("%21", "!"),
    ("%2A", "*"),
    ("%28", "("),
    ("%29", ")"),
    ("%2C", ","),
    ("%2F", "/"),
    ("%3A", ":"),
];

/// Percent-encode a title for use in a URL path.
pub fn url_encode(input: &str) -> String {
    URL_UNESCAPES
        .iter()
        .fold(urlencoding::encode(input).into_owned(), |acc, (from, to)| {
            acc.replace(from, to)
        })
}
