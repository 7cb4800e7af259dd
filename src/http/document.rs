use scraper::Html;

/// Body of one fetched page (or one fragment of an envelope).
///
/// Kept as text so it can be cached and moved across await points; extractors
/// parse it on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: String,
    pub body: String,
}

impl Document {
    pub fn new(source: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            body: body.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }
}
