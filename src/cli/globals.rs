use secrecy::SecretString;

#[derive(Clone)]
pub struct GlobalArgs {
    pub auth_secret: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(auth_secret: SecretString) -> Self {
        Self { auth_secret }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("auth_secret", &"***")
            .finish()
    }
}
