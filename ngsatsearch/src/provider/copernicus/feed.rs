//! Atom + OpenSearch feed parsing.

use roxmltree::{Document, Node};

use crate::error::{CatalogError, CatalogResult};
use crate::pagination::Page;
use crate::scene::SceneIdentifier;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const OPENSEARCH_NS: &str = "http://a9.com/-/spec/opensearch/1.1/";

/// One `<entry>` of a search feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FeedEntry {
    /// Text of the child element carrying `name="identifier"`.
    pub identifier: Option<String>,
    /// Text of the child element carrying `name="uuid"`.
    pub uuid: Option<String>,
    pub title: Option<String>,
    pub id: Option<String>,
    /// The entry's XML exactly as it appeared in the feed.
    pub raw: String,
}

impl FeedEntry {
    /// Public scene name, falling back to the entry title.
    pub fn scene_identifier(&self) -> CatalogResult<SceneIdentifier> {
        self.identifier
            .as_deref()
            .or(self.title.as_deref())
            .map(SceneIdentifier::from)
            .ok_or_else(|| CatalogError::InvalidMetadata("no identifier found in entry".into()))
    }

    /// Product UUID, falling back to the entry id.
    pub fn product_uuid(&self) -> CatalogResult<&str> {
        self.uuid
            .as_deref()
            .or(self.id.as_deref())
            .ok_or_else(|| CatalogError::InvalidMetadata("no uuid found in metadata".into()))
    }
}

/// Parsed search feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Feed {
    pub total: Option<usize>,
    pub entries: Vec<FeedEntry>,
}

impl Feed {
    pub fn parse(xml: &str) -> CatalogResult<Self> {
        let doc = Document::parse(xml)
            .map_err(|e| CatalogError::InvalidMetadata(format!("malformed search feed: {}", e)))?;
        let root = doc.root_element();

        let total = child(root, OPENSEARCH_NS, "totalResults")
            .and_then(|n| n.text())
            .and_then(|t| t.trim().parse().ok());

        let entries = root
            .children()
            .filter(|n| is_element(*n, ATOM_NS, "entry"))
            .map(|entry| parse_entry(xml, entry))
            .collect();

        Ok(Self { total, entries })
    }

    /// Converts the feed to a search page.
    ///
    /// A feed without a readable total is rejected: the service answers
    /// that way when the footprint is too complex.
    pub fn into_page(self) -> CatalogResult<Page> {
        let total = self.total.ok_or_else(|| {
            CatalogError::InvalidMetadata(
                "search feed carries no totalResults; narrow the area of interest".into(),
            )
        })?;
        let identifiers = self
            .entries
            .iter()
            .map(FeedEntry::scene_identifier)
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(Page { total, identifiers })
    }
}

fn parse_entry(xml: &str, entry: Node<'_, '_>) -> FeedEntry {
    let mut parsed = FeedEntry {
        raw: xml[entry.range()].to_string(),
        title: child_text(entry, ATOM_NS, "title"),
        id: child_text(entry, ATOM_NS, "id"),
        ..FeedEntry::default()
    };

    for node in entry.children().filter(Node::is_element) {
        let text = node.text().map(str::trim).filter(|t| !t.is_empty());
        match node.attribute("name") {
            Some("identifier") if parsed.identifier.is_none() => {
                parsed.identifier = text.map(String::from)
            }
            Some("uuid") if parsed.uuid.is_none() => parsed.uuid = text.map(String::from),
            _ => {}
        }
    }

    parsed
}

fn is_element(node: Node<'_, '_>, namespace: &str, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(namespace)
}

fn child<'a, 'input>(node: Node<'a, 'input>, namespace: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_element(*n, namespace, name))
}

fn child_text(node: Node<'_, '_>, namespace: &str, name: &str) -> Option<String> {
    child(node, namespace, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Renders a feed with one entry per identifier.
    pub(crate) fn feed_xml(total: usize, identifiers: &[String]) -> String {
        let entries: String = identifiers
            .iter()
            .enumerate()
            .map(|(i, id)| {
                format!(
                    "<entry><title>{id}</title><id>https://scihub/entry/{i}</id>\
                     <str name=\"identifier\">{id}</str>\
                     <str name=\"uuid\">uuid-{id}</str></entry>",
                    id = id,
                    i = i
                )
            })
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <feed xmlns=\"http://www.w3.org/2005/Atom\" \
                   xmlns:opensearch=\"http://a9.com/-/spec/opensearch/1.1/\">\
             <opensearch:totalResults>{}</opensearch:totalResults>{}</feed>",
            total, entries
        )
    }

    #[test]
    fn test_parse_total_and_identifiers() {
        let xml = feed_xml(2, &["S2A_ONE".to_string(), "S2A_TWO".to_string()]);
        let page = Feed::parse(&xml).unwrap().into_page().unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(
            page.identifiers,
            vec![SceneIdentifier::from("S2A_ONE"), SceneIdentifier::from("S2A_TWO")]
        );
    }

    #[test]
    fn test_identifier_falls_back_to_title() {
        let xml = "<feed xmlns=\"http://www.w3.org/2005/Atom\" \
                   xmlns:opensearch=\"http://a9.com/-/spec/opensearch/1.1/\">\
                   <opensearch:totalResults>1</opensearch:totalResults>\
                   <entry><title>S1A_TITLE</title><id>abc-123</id></entry></feed>";
        let feed = Feed::parse(xml).unwrap();
        let entry = &feed.entries[0];

        assert_eq!(entry.scene_identifier().unwrap().as_str(), "S1A_TITLE");
        assert_eq!(entry.product_uuid().unwrap(), "abc-123");
    }

    #[test]
    fn test_entry_without_uuid_or_id() {
        let entry = FeedEntry {
            title: Some("S1A_TITLE".into()),
            ..FeedEntry::default()
        };
        let err = entry.product_uuid().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidMetadata(_)));
    }

    #[test]
    fn test_missing_total_is_invalid_metadata() {
        let xml = "<feed xmlns=\"http://www.w3.org/2005/Atom\"></feed>";
        let err = Feed::parse(xml).unwrap().into_page().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidMetadata(_)));
    }

    #[test]
    fn test_malformed_xml_is_invalid_metadata() {
        let err = Feed::parse("<html><body>Too many points").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidMetadata(_)));
    }

    #[test]
    fn test_raw_entry_is_preserved() {
        let xml = feed_xml(1, &["S3A_X".to_string()]);
        let feed = Feed::parse(&xml).unwrap();
        assert!(feed.entries[0].raw.starts_with("<entry>"));
        assert!(feed.entries[0].raw.ends_with("</entry>"));
        assert_eq!(feed.entries[0].uuid.as_deref(), Some("uuid-S3A_X"));
    }
}
