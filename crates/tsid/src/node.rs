/// A source of node identifiers outside the generator's own configuration.
///
/// Deployments typically assign node ids through an external channel
/// (environment variables, process properties, an orchestrator). The
/// generator never reads those channels itself; it only consumes the
/// `Option<u64>` a source resolves. The builder consults a source after an
/// explicit node id and before falling back to a random draw.
///
/// Closures returning `Option<u64>` implement this trait directly:
///
/// ```
/// use tsid::NodeIdSource;
///
/// let source = || Some(7u64);
/// assert_eq!(source.node_id(), Some(7));
/// ```
pub trait NodeIdSource {
    /// Returns the node id this source resolves, if any.
    fn node_id(&self) -> Option<u64>;
}

impl<F> NodeIdSource for F
where
    F: Fn() -> Option<u64>,
{
    fn node_id(&self) -> Option<u64> {
        self()
    }
}
