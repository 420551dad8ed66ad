/// Whether a node performs real remote work or hands out cheap placeholders.
///
/// Fixed when a node is constructed and inherited by the nodes it creates.
/// A shallow directory listing walks through [`Lazy`](Self::Lazy) children so
/// that enumerating one level never resolves every descendant's content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Materialization {
    /// Resolve identifiers, fetch page lists, download bytes.
    #[default]
    Eager,
    /// No network access; placeholder content only.
    Lazy,
}
impl Materialization {
    pub fn is_eager(self) -> bool {
        self == Self::Eager
    }
}
