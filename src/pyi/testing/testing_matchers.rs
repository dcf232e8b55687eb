//! Expectations on rendered stub values

/// What one field of a stub node should look like once rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubMatch {
    /// A definition, parameter or field name, compared exactly
    Name(String),
    /// A type rendered in stub syntax, e.g. `Dict[str, int]`
    Type(String),
    /// A fragment of a rendered signature such as `f(x: int) -> str`
    InSignature(String),
}

impl StubMatch {
    /// Panic with a message naming `context` when `rendered` does not match
    pub fn check(&self, rendered: &str, context: &str) {
        match self {
            StubMatch::Name(name) => assert!(
                rendered == name,
                "{}: expected name `{}`, found `{}`",
                context,
                name,
                rendered
            ),
            StubMatch::Type(ty) => assert!(
                rendered == ty,
                "{}: expected type `{}`, but it renders as `{}`",
                context,
                ty,
                rendered
            ),
            StubMatch::InSignature(fragment) => assert!(
                rendered.contains(fragment.as_str()),
                "{}: signature `{}` has no `{}`",
                context,
                rendered,
                fragment
            ),
        }
    }
}
