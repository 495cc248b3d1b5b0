use std::error::Error as StdError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumServiceErrorKind {
    /// The request never produced a usable response.
    Transport,
    /// The service answered, either with a non-success status or with a body
    /// that could not be used.
    Service { status: u16 },
}

/// Failure raised by an album-service client. Carried inside `anyhow::Error`
/// and recovered by downcasting.
#[derive(Debug)]
pub struct AlbumServiceError {
    kind: AlbumServiceErrorKind,
    message: String,
    source: Option<anyhow::Error>,
}

impl AlbumServiceError {
    pub fn transport(message: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(Self {
            kind: AlbumServiceErrorKind::Transport,
            message: message.into(),
            source: None,
        })
    }

    pub fn transport_with_source(message: impl Into<String>, source: anyhow::Error) -> anyhow::Error {
        anyhow::Error::new(Self {
            kind: AlbumServiceErrorKind::Transport,
            message: message.into(),
            source: Some(source),
        })
    }

    pub fn service(status: u16, message: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(Self {
            kind: AlbumServiceErrorKind::Service { status },
            message: message.into(),
            source: None,
        })
    }

    /// Finds the album-service failure anywhere in an error chain.
    pub fn find(err: &anyhow::Error) -> Option<&AlbumServiceError> {
        err.chain().find_map(|cause| cause.downcast_ref::<AlbumServiceError>())
    }

    pub fn kind(&self) -> AlbumServiceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            AlbumServiceErrorKind::Service { status } => Some(status),
            AlbumServiceErrorKind::Transport => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind == AlbumServiceErrorKind::Transport
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

impl std::fmt::Display for AlbumServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for AlbumServiceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|err| err.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn find_sees_through_context() {
        let err = Err::<(), _>(AlbumServiceError::service(403, "forbidden"))
            .context("failed to list albums")
            .unwrap_err();

        let found = AlbumServiceError::find(&err).expect("album service error in chain");
        assert_eq!(found.status(), Some(403));
        assert!(found.is_forbidden());
        assert!(!found.is_transport());
    }

    #[test]
    fn transport_errors_have_no_status() {
        let err = AlbumServiceError::transport("connection refused");
        let found = AlbumServiceError::find(&err).unwrap();

        assert!(found.is_transport());
        assert_eq!(found.status(), None);
        assert!(!found.is_forbidden());
    }

    #[test]
    fn server_errors_are_not_forbidden() {
        let err = AlbumServiceError::service(500, "boom");
        assert!(!AlbumServiceError::find(&err).unwrap().is_forbidden());
    }

    #[test]
    fn plain_errors_are_not_album_service_errors() {
        let err = anyhow::anyhow!("disk full");
        assert!(AlbumServiceError::find(&err).is_none());
    }
}
