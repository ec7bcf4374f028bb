/// Source of the script languages advertised to new sessions.
///
/// Order is meaningful: clients see the languages in the order returned.
pub trait EngineLanguages: Send + Sync {
    fn languages(&self) -> Vec<String>;
}

/// Fixed language list, typically loaded from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticEngines {
    languages: Vec<String>,
}

impl StaticEngines {
    /// Languages are reported in the order given.
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
        }
    }
}

impl EngineLanguages for StaticEngines {
    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }
}
