/// Owner identity plus the token every album-service call is authorized with.
#[derive(Clone, PartialEq, Eq)]
pub struct AlbumAccount {
    pub owner: String,
    pub auth_token: String,
}

impl AlbumAccount {
    pub fn new(owner: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            auth_token: auth_token.into(),
        }
    }
}

// Tokens must never reach the logs.
impl std::fmt::Debug for AlbumAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumAccount")
            .field("owner", &self.owner)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}
