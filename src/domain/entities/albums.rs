use url::Url;

/// A named remote collection that media entries are posted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub description: String,
    pub feed_endpoint: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlbum {
    pub name: String,
    pub description: String,
}
